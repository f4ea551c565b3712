//! Concrete machine targets. A target is never sniffed from the host;
//! callers pick one explicitly and pass it down.

use std::{path::Path, process::Command};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Target {
    #[default]
    #[value(name = "x86-64-linux-gnu")]
    X86_64LinuxGnu,
    #[value(name = "x86-64-windows")]
    X86_64Windows,
}

impl Target {
    /// Label the flattened program is entered through.
    pub fn entry_symbol(self) -> &'static str {
        "main"
    }

    /// Instructions appended after the flattened stream so control never
    /// runs off the end of the program.
    pub fn exit_sequence(self) -> &'static [&'static str] {
        match self {
            Target::X86_64LinuxGnu => &["mov rax, 60", "xor rdi, rdi", "syscall"],
            Target::X86_64Windows => &["xor rax, rax", "ret"],
        }
    }

    pub fn object_format(self) -> &'static str {
        match self {
            Target::X86_64LinuxGnu => "elf64",
            Target::X86_64Windows => "win64",
        }
    }

    pub fn executable_suffix(self) -> &'static str {
        match self {
            Target::X86_64LinuxGnu => "",
            Target::X86_64Windows => "exe",
        }
    }

    pub fn create_assembler_command(self, assembly_file: &Path, object_file: &Path) -> Command {
        let mut command = Command::new("nasm");
        command
            .arg("-f")
            .arg(self.object_format())
            .arg(assembly_file)
            .arg("-o")
            .arg(object_file);
        command
    }

    pub fn create_linker_command(self, objects: &[&Path], output: &Path) -> Command {
        match self {
            Target::X86_64LinuxGnu => {
                let mut command = Command::new("cc");
                command.args(objects).arg("-o").arg(output);
                command
            }
            Target::X86_64Windows => {
                let mut command = Command::new("link");
                command
                    .args(objects)
                    .arg(format!("/OUT:{}", output.display()))
                    .arg("/SUBSYSTEM:CONSOLE");
                command
            }
        }
    }
}
