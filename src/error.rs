use std::{io, path::PathBuf};

use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

/// Everything that can end a compilation early. Semantic errors are
/// fail-fast: the first one encountered aborts the unit, no recovery is
/// attempted. Unmapped opcodes are deliberately *not* represented here —
/// the translator and emitter degrade to markers/comments instead of
/// failing (see `backend`).
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("unknown symbol `{name}`")]
    UnknownSymbol { name: String },

    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("arity mismatch: `{name}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("duplicate function `{name}`")]
    DuplicateFunction { name: String },

    #[error("redeclaration of `{name}` in the same scope")]
    Redeclaration { name: String },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CompileError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
