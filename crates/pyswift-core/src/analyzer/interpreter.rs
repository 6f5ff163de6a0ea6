//! Subprocess AST oracle
//!
//! The source grammar is not reimplemented here. A Python interpreter is
//! spawned, fed a small boilerplate script on stdin that embeds the source as
//! a string literal, and asked to print its own `ast` module's view of the
//! text as JSON. Three outcomes are distinguished after exit: an explicit
//! `{"error": ...}` object, undecodable output, or a module tree.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use super::provider::{AstError, AstProvider};
use crate::ast::AstNode;

const SOURCE_PLACEHOLDER: &str = "__PYSWIFT_SOURCE__";

const BOILERPLATE: &str = r#"import ast
import json
import sys

SOURCE = __PYSWIFT_SOURCE__
TOP_LEVEL = (ast.Import, ast.ImportFrom, ast.FunctionDef, ast.AsyncFunctionDef, ast.ClassDef)


def convert(node):
    kind = type(node).__name__
    if isinstance(node, ast.Import):
        return {"type": kind, "line": node.lineno, "names": [a.name for a in node.names]}
    if isinstance(node, ast.ImportFrom):
        return {
            "type": kind,
            "line": node.lineno,
            "module": node.module or "",
            "level": node.level,
            "names": [a.name for a in node.names],
        }
    if isinstance(node, (ast.FunctionDef, ast.AsyncFunctionDef)):
        return {
            "type": kind,
            "name": node.name,
            "line": node.lineno,
            "args": [a.arg for a in node.args.args],
            "children": [convert(c) for c in node.body],
        }
    if isinstance(node, ast.ClassDef):
        return {
            "type": kind,
            "name": node.name,
            "line": node.lineno,
            "bases": [getattr(b, "id", type(b).__name__) for b in node.bases],
            "children": [convert(c) for c in node.body],
        }
    return {"type": kind}


try:
    tree = ast.parse(SOURCE)
except SyntaxError as exc:
    print(json.dumps({"error": "%s (line %s)" % (exc.msg, exc.lineno)}))
    sys.exit(0)

print(json.dumps({"type": "Module", "children": [convert(n) for n in tree.body if isinstance(n, TOP_LEVEL)]}))
"#;

/// [`AstProvider`] backed by an external Python interpreter
#[derive(Debug, Clone)]
pub struct InterpreterAstProvider {
    executable: PathBuf,
}

impl InterpreterAstProvider {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// The script written to the interpreter's stdin for `source`
    pub fn script_for(source: &str) -> String {
        // A JSON string literal is also a valid Python string literal
        let literal = serde_json::to_string(source).unwrap_or_else(|_| "\"\"".to_string());
        BOILERPLATE.replace(SOURCE_PLACEHOLDER, &literal)
    }
}

#[async_trait]
impl AstProvider for InterpreterAstProvider {
    fn name(&self) -> &'static str {
        "interpreter"
    }

    async fn parse(&self, source: &str) -> Result<AstNode, AstError> {
        let interpreter = self.executable().display().to_string();
        let spawn_error = |source| AstError::Spawn {
            interpreter: interpreter.clone(),
            source,
        };

        debug!(interpreter = %interpreter, bytes = source.len(), "spawning AST interpreter");
        let mut child = Command::new(self.executable())
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false)
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(Self::script_for(source).as_bytes())
                .await
                .map_err(spawn_error)?;
            // Dropping stdin signals EOF so the interpreter starts executing
        }

        let output = child.wait_with_output().await.map_err(spawn_error)?;
        debug!(interpreter = %interpreter, status = %output.status, "AST interpreter exited");

        match decode_output(&output.stdout) {
            Ok(node) if output.status.success() => Ok(node),
            Err(err @ AstError::Syntax { .. }) => Err(err),
            Ok(_) | Err(_) if !output.status.success() => Err(AstError::InterpreterFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }),
            result => result,
        }
    }
}

/// Classify the interpreter's standard output
pub(crate) fn decode_output(stdout: &[u8]) -> Result<AstNode, AstError> {
    let text = std::str::from_utf8(stdout).map_err(|e| AstError::MalformedOutput {
        reason: format!("output is not UTF-8: {e}"),
    })?;
    let text = text.trim();
    if text.is_empty() {
        return Err(AstError::MalformedOutput {
            reason: "empty output".into(),
        });
    }

    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| AstError::MalformedOutput {
        reason: format!("invalid JSON: {e}"),
    })?;

    if let Some(error) = value.get("error") {
        let message = error
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(AstError::Syntax { message });
    }

    let node: AstNode = serde_json::from_value(value).map_err(|e| AstError::MalformedOutput {
        reason: format!("unexpected tree shape: {e}"),
    })?;
    if !node.is_module() {
        return Err(AstError::MalformedOutput {
            reason: format!("root node is {}, expected Module", node.kind),
        });
    }
    Ok(node)
}
