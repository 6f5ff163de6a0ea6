//! # PySwift Core
//!
//! Core implementation of the Python to Swift transpilation pipeline, including:
//! - Structural analysis (dependencies, outline, interpreter-backed AST)
//! - Line-directed transpilation through a small statement IR
//! - XCTest skeleton synthesis from the translated output
//! - An orchestrator that drives each script through its status state machine
//!
//! This crate provides the foundational components that can be used to build
//! various front ends (CLI, REPL, editor integration, etc.)

#![warn(clippy::all)]

pub mod analyzer;
pub mod ast;
pub mod export;
pub mod orchestrator;
pub mod synthesizer;
pub mod transpiler;

mod text;

use std::path::PathBuf;

// Re-export commonly used types
pub use analyzer::{
    AstError, AstProvider, HeuristicAstProvider, InterpreterAstProvider, OutlineItem,
    StructuralAnalyzer, StructuralOutline,
};
pub use ast::AstNode;
pub use export::{swift_type_name, ExportSummary, Exporter};
pub use orchestrator::{ConversionStatus, Orchestrator, ScriptId, ScriptRecord, StatusEvent};
pub use synthesizer::{TestKind, TestSpec, TestSuite, TestSynthesizer};
pub use transpiler::{TranslatedCode, TranslationWarning, Transpiler};

/// PySwift version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for PySwift components
///
/// Honors `RUST_LOG`; defaults to `pyswift_core=info`. Safe to call more than
/// once, later calls are no-ops.
pub fn init_tracing() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "pyswift_core=info".parse() {
        filter = filter.add_directive(directive);
    }
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Which AST provider the pipeline consults during analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AstBackend {
    /// Spawn the external Python interpreter and let it parse the source
    #[default]
    Interpreter,
    /// Build the tree in-process from the structural scans
    Heuristic,
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Python executable used as the AST oracle
    pub interpreter: PathBuf,
    /// AST acquisition strategy
    pub ast_backend: AstBackend,
    /// Indentation unit, both for reading Python blocks and writing Swift
    pub indent_width: usize,
    /// Capacity of the status event broadcast channel
    pub event_capacity: usize,
    /// Show translation warnings and status history in front ends
    pub debug: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            interpreter: "/usr/bin/python3".into(),
            ast_backend: AstBackend::Interpreter,
            indent_width: 4,
            event_capacity: 256,
            debug: false,
        }
    }
}

impl PipelineConfig {
    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.indent_width == 0 {
            return Err(PipelineError::Config("indent width must be at least 1".into()));
        }
        if self.event_capacity == 0 {
            return Err(PipelineError::Config("event capacity must be at least 1".into()));
        }
        Ok(())
    }
}

/// Error types for pipeline operations
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// AST acquisition failed
    #[error("Parse error: {0}")]
    Parse(#[from] AstError),

    /// The origin handle could not be read as UTF-8 text
    #[error("Failed to read {}: {source}", path.display())]
    OriginRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No record with this id is owned by the orchestrator
    #[error("Script not found: {0}")]
    ScriptNotFound(ScriptId),

    /// The record has not finished the pipeline
    #[error("Script {id} cannot be exported while {status}")]
    NotExportable { id: ScriptId, status: ConversionStatus },

    /// Writing exported files failed
    #[error("Failed to export to {}: {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_indent_rejected() {
        let config = PipelineConfig {
            indent_width: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = PipelineConfig {
            event_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
