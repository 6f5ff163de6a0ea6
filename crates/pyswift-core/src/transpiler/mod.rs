//! Best-effort Python to Swift transpilation
//!
//! The pipeline is `lower` (indentation-tracking line parser producing the
//! [`ir::Stmt`] tree) followed by codegen. Translation is line-directed: only
//! a fixed subset of constructs is recognized and everything else falls
//! through to expression rewriting. It never fails; malformed input only
//! lowers the quality of the output and may add warnings.

pub mod codegen;
pub mod ir;
mod lower;
pub mod rewrite;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use codegen::ToSwift;
pub use rewrite::{map_type, rewrite_expression};

/// First characters of every translation
pub const HEADER_MARKER: &str = "// Generated by pyswift";

/// Something the transpiler had to guess about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationWarning {
    pub line: usize,
    pub message: String,
}

impl TranslationWarning {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for TranslationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Swift source produced by [`Transpiler::transpile`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslatedCode {
    pub text: String,
    pub warnings: Vec<TranslationWarning>,
}

impl TranslatedCode {
    pub fn has_header(&self) -> bool {
        self.text.starts_with(HEADER_MARKER)
    }
}

#[derive(Debug, Clone)]
pub struct Transpiler {
    indent_width: usize,
}

impl Default for Transpiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Transpiler {
    pub fn new() -> Self {
        Self { indent_width: 4 }
    }

    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width.max(1);
        self
    }

    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    pub fn transpile(&self, source: &str) -> TranslatedCode {
        self.transpile_at(source, Utc::now())
    }

    /// Transpile with a fixed header timestamp
    pub fn transpile_at(&self, source: &str, generated_at: DateTime<Utc>) -> TranslatedCode {
        let (nodes, warnings) = lower::lower(source, self.indent_width);

        let mut emitter = codegen::SwiftEmitter::new(self.indent_width);
        emitter.emit_block(&nodes, 0);

        let mut text = header(generated_at);
        text.push_str(&emitter.finish());

        debug!(
            statements = nodes.len(),
            warnings = warnings.len(),
            "transpiled source"
        );
        TranslatedCode { text, warnings }
    }
}

fn header(generated_at: DateTime<Utc>) -> String {
    format!(
        "{HEADER_MARKER} {} on {}\n// Best-effort translation from Python; review before use.\n\nimport Foundation\n\n",
        crate::VERSION,
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}
