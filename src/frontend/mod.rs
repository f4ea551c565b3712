use std::path::PathBuf;

use colored::Colorize;

use self::lexer::Span;

pub mod ast;
pub mod lexer;
pub mod parser;

#[derive(Debug)]
pub struct SourceFile {
    pub contents: String,
    pub origin: SourceFileOrigin,
}

impl SourceFile {
    pub fn in_memory(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            origin: SourceFileOrigin::Memory,
        }
    }

    pub fn value_of_span(&self, span: Span) -> &str {
        &self.contents[span.start..span.end]
    }

    /// Zero-based row of a byte position.
    pub fn row_for_position(&self, position: usize) -> usize {
        self.contents[..position.min(self.contents.len())]
            .bytes()
            .filter(|b| *b == b'\n')
            .count()
    }

    /// Zero-based column of a byte position within its line.
    pub fn column_for_position(&self, position: usize) -> usize {
        let position = position.min(self.contents.len());

        match self.contents[..position].rfind('\n') {
            Some(newline) => position - newline - 1,
            None => position,
        }
    }

    /// Renders the line containing `span` with a caret underline, for
    /// diagnostics.
    pub fn highlight_span(&self, span: Span) -> String {
        let row = self.row_for_position(span.start);
        let column = self.column_for_position(span.start);

        let line = self.contents.lines().nth(row).unwrap_or_default();
        let width = (span.end - span.start).clamp(1, line.len().saturating_sub(column).max(1));

        format!(
            "{line}\n{}{}",
            " ".repeat(column),
            "^".repeat(width).red().bold()
        )
    }
}

#[derive(Debug)]
pub enum SourceFileOrigin {
    Memory,
    File(PathBuf),
}

impl core::fmt::Display for SourceFileOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFileOrigin::Memory => f.write_str("<memory>"),
            SourceFileOrigin::File(path) => f.write_fmt(format_args!("{}", path.display())),
        }
    }
}
