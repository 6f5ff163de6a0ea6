use async_trait::async_trait;
use thiserror::Error;

use super::StructuralAnalyzer;
use crate::ast::AstNode;

/// AST acquisition failures
#[derive(Error, Debug)]
pub enum AstError {
    /// The interpreter ran and rejected the source
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    #[error("Failed to spawn interpreter {interpreter}: {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Interpreter exited with {status}: {stderr}")]
    InterpreterFailed { status: String, stderr: String },

    #[error("Malformed interpreter output: {reason}")]
    MalformedOutput { reason: String },
}

impl AstError {
    /// Whether the source itself was rejected, as opposed to the tooling failing
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}

/// Capability that turns source text into an [`AstNode`] tree
///
/// The orchestrator only sees this trait, so the subprocess oracle can be
/// replaced by an embedded parser without touching the pipeline.
#[async_trait]
pub trait AstProvider: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Parse `source`; the root is always a `Module` node on success
    async fn parse(&self, source: &str) -> Result<AstNode, AstError>;
}

/// In-process provider built on the analyzer's line scans
///
/// Top-level imports, functions and classes only; never fails.
#[derive(Debug, Clone, Default)]
pub struct HeuristicAstProvider {
    analyzer: StructuralAnalyzer,
}

impl HeuristicAstProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AstProvider for HeuristicAstProvider {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn parse(&self, source: &str) -> Result<AstNode, AstError> {
        Ok(self.analyzer.heuristic_ast(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_heuristic_provider_never_fails() {
        let provider = HeuristicAstProvider::new();
        let ast = provider.parse("def broken(:\n").await.unwrap();
        assert!(ast.is_module());
        assert_eq!(ast.function_names(), vec!["broken"]);
    }

    #[test]
    fn test_syntax_error_classification() {
        let err = AstError::Syntax {
            message: "invalid syntax (line 1)".into(),
        };
        assert!(err.is_syntax());
        assert!(err.to_string().contains("invalid syntax"));

        let err = AstError::MalformedOutput {
            reason: "empty output".into(),
        };
        assert!(!err.is_syntax());
    }
}
