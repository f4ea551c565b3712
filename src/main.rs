use std::{
    path::{Path, PathBuf},
    process::Command,
};

use clap::{CommandFactory, Parser, error::ErrorKind};
use colored::Colorize;

use crate::{backend::targets::Target, driver::CompileOptions, middle::ir::pretty_print};

mod backend;
mod driver;
mod error;
mod frontend;
mod index;
mod middle;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Strict source file to compile
    source_file: PathBuf,

    /// Where to place the executable; the intermediate artifacts share
    /// its stem
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Machine target the emitter and the tool invocations assume
    #[arg(short, long, value_enum, default_value = "x86-64-linux-gnu")]
    target: Target,

    /// Extra object linked into the executable, typically the runtime
    #[arg(long)]
    runtime: Option<PathBuf>,

    /// Print the lowered module to stdout
    #[arg(long)]
    emit_ir: bool,

    /// Stop after writing the assembly artifact; skip nasm and the linker
    #[arg(long)]
    asm_only: bool,
}

fn main() {
    let args = Args::parse();

    if !args.source_file.exists() {
        Args::command()
            .error(
                ErrorKind::InvalidValue,
                format!(
                    "Source file '{}' does not exist!",
                    args.source_file.display()
                ),
            )
            .exit()
    }

    if !args.source_file.is_file() {
        Args::command()
            .error(
                ErrorKind::InvalidValue,
                format!(
                    "Input path '{}' is not a file!",
                    args.source_file.display()
                ),
            )
            .exit()
    }

    let target = args.target;
    let output = args
        .output
        .unwrap_or_else(|| args.source_file.with_extension(target.executable_suffix()));

    let artifacts =
        match driver::compile_file(&args.source_file, &output, CompileOptions { target }) {
            Ok(artifacts) => artifacts,
            Err(error) => {
                eprintln!("{} {error}", "error:".red().bold());
                std::process::exit(1);
            }
        };

    if args.emit_ir {
        print!("{}", pretty_print::pretty_print_module(&artifacts.module));
    }

    println!("Generated {}", artifacts.ir_file.display());
    println!("Generated {}", artifacts.stream_file.display());
    println!("Generated {}", artifacts.assembly_file.display());

    if args.asm_only {
        return;
    }

    // The object is a between-tools intermediate, not an artifact; it is
    // removed once the guard drops.
    let object_file = match mktemp::Temp::new_file() {
        Ok(file) => file,
        Err(error) => {
            eprintln!(
                "{} failed to create an object file: {error}",
                "error:".red().bold()
            );
            std::process::exit(1);
        }
    };
    let object_path: &Path = object_file.as_ref();

    run_tool(&mut target.create_assembler_command(&artifacts.assembly_file, object_path));

    let mut objects: Vec<&Path> = vec![object_path];
    if let Some(runtime) = &args.runtime {
        objects.push(runtime);
    }

    run_tool(&mut target.create_linker_command(&objects, &output));

    println!("Generated {}", output.display());
}

fn run_tool(command: &mut Command) {
    println!(">> {}", render_command(command));

    let status = match command.status() {
        Ok(status) => status,
        Err(error) => {
            eprintln!(
                "{} failed to run `{}`: {error}",
                "error:".red().bold(),
                command.get_program().to_string_lossy()
            );
            std::process::exit(1);
        }
    };

    if !status.success() {
        eprintln!(
            "{} `{}` exited with {status}",
            "error:".red().bold(),
            command.get_program().to_string_lossy()
        );
        std::process::exit(1);
    }
}

fn render_command(command: &Command) -> String {
    let mut rendered = command.get_program().to_string_lossy().into_owned();

    for argument in command.get_args() {
        rendered.push(' ');
        rendered.push_str(&argument.to_string_lossy());
    }

    rendered
}
