//! Emits NASM source from an opcode stream.
//!
//! The stream's functions are flattened under a single entry label; the
//! FUNC/BLOCK markers carry no code. Every remaining line is keyed back
//! into the catalog by its code column — the mnemonic text is never
//! consulted — and lines that key to nothing become `; unhandled:`
//! comments instead of failing the build.

use std::{fs, path::Path};

use crate::error::{CompileError, CompileResult};

use super::{catalog::OpcodeCatalog, targets::Target};

pub fn emit_program(stream: &str, catalog: &OpcodeCatalog, target: Target) -> String {
    let mut assembler = Assembler::new();

    assembler.push_line(format!(
        indoc::indoc! {"
            section .text
            global {entry}
            extern strict_print
            extern strict_input

            {entry}:"
        },
        entry = target.entry_symbol()
    ));

    for line in stream.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty()
            || trimmed.starts_with("FUNC")
            || trimmed.starts_with("BLOCK")
            || trimmed.starts_with("END FUNC")
        {
            continue;
        }

        let operation = match trimmed.split_once(';') {
            Some((operation, _)) => operation.trim(),
            None => trimmed,
        };

        match parse_code(operation).and_then(|code| catalog.lookup(code)) {
            Some(opcode) => assembler.emit(opcode.assembly()),
            None => assembler.comment(format!("unhandled: {operation}")),
        }
    }

    for instruction in target.exit_sequence() {
        assembler.emit(instruction);
    }

    assembler.into_output()
}

/// Re-reads a stream artifact from disk and writes the assembly next to
/// it. The on-disk stream is the contract between the two back ends.
pub fn emit_program_file(
    stream_path: &Path,
    assembly_path: &Path,
    catalog: &OpcodeCatalog,
    target: Target,
) -> CompileResult<()> {
    let stream =
        fs::read_to_string(stream_path).map_err(|source| CompileError::io(stream_path, source))?;

    let assembly = emit_program(&stream, catalog, target);
    fs::write(assembly_path, assembly).map_err(|source| CompileError::io(assembly_path, source))
}

/// Reads the leading code column as hex. `None` for lines that do not
/// start with a code, such as `??` markers.
fn parse_code(operation: &str) -> Option<u8> {
    let token = operation.split_whitespace().next()?;
    u8::from_str_radix(token, 16).ok()
}

struct Assembler {
    output: String,
}

impl Assembler {
    fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    fn into_output(self) -> String {
        self.output
    }

    fn push_line(&mut self, string: impl AsRef<str>) {
        self.output.push_str(string.as_ref());
        self.output.push('\n');
    }

    fn emit(&mut self, string: impl AsRef<str>) {
        self.output.push_str("    ");
        self.push_line(string);
    }

    fn comment(&mut self, comment: impl AsRef<str>) {
        self.emit(format!("; {}", comment.as_ref()));
    }
}
