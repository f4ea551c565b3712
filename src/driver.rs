//! Batch pipeline driver. One invocation takes one source file through
//! lowering, stream translation, and assembly emission, leaving each
//! stage's artifact on disk next to the requested output.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    backend::{catalog::OpcodeCatalog, emitter, targets::Target, translator},
    error::{CompileError, CompileResult},
    frontend::{SourceFile, SourceFileOrigin, parser::Parser},
    middle::ir::{self, ast_lowering, pretty_print},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub target: Target,
}

/// What one pipeline run leaves behind, all named after the output stem.
#[derive(Debug)]
pub struct Artifacts {
    pub module: ir::Module,
    pub ir_file: PathBuf,
    pub stream_file: PathBuf,
    pub assembly_file: PathBuf,
}

pub fn compile_file(
    source_path: &Path,
    output_stem: &Path,
    options: CompileOptions,
) -> CompileResult<Artifacts> {
    let contents =
        fs::read_to_string(source_path).map_err(|source| CompileError::io(source_path, source))?;
    let source_file = SourceFile {
        contents,
        origin: SourceFileOrigin::File(source_path.to_owned()),
    };

    let program = Parser::parse_program(&source_file);
    let module = ast_lowering::lower_program(&program)?;
    module.verify();

    let ir_file = output_stem.with_extension("ir");
    let listing = strip_ansi_escapes::strip_str(pretty_print::pretty_print_module(&module));
    fs::write(&ir_file, listing).map_err(|source| CompileError::io(&ir_file, source))?;

    let stream_file = output_stem.with_extension("dgm");
    let stream = translator::translate_module(&module);
    translator::write_stream_file(&stream_file, &stream)?;

    // The emitter re-reads the stream artifact rather than taking the
    // in-memory string; the file on disk is the contract between the two
    // back ends.
    let catalog = OpcodeCatalog::new();
    let assembly_file = output_stem.with_extension("s");
    emitter::emit_program_file(&stream_file, &assembly_file, &catalog, options.target)?;

    Ok(Artifacts {
        module,
        ir_file,
        stream_file,
        assembly_file,
    })
}
