//! Structural analysis of Python sources
//!
//! Three independent views of one source text:
//! - a dependency set from line-anchored import patterns
//! - a heuristic outline of functions, classes and assignments
//! - an [`AstNode`] tree obtained through an [`AstProvider`]
//!
//! None of them mutate the input, and only AST acquisition can fail.

mod interpreter;
mod provider;

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ast::{kinds, AstNode};
use crate::text::split_assignment;

pub use interpreter::InterpreterAstProvider;
pub use provider::{AstError, AstProvider, HeuristicAstProvider};

static IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*import\s+(.+?)\s*(?:#.*)?$").expect("valid import regex"));
static FROM_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*from\s+([A-Za-z_][\w.]*)\s+import\b").expect("valid from-import regex")
});
/// `from` imports including relative ones: leading dots, module, imported names
static FROM_NODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^from\s+(\.*)\s*([A-Za-z_][\w.]*)?\s+import\s+(.+?)\s*(?:#.*)?$")
        .expect("valid from-node regex")
});

/// Operator characters left on the target of an augmented assignment
const AUGMENTED_OPERATORS: &[char] = &['+', '-', '*', '/', '%', '@', '&', '|', '^'];

/// A named item found by the outline scan, with its 1-based line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineItem {
    pub name: String,
    pub line: usize,
}

impl OutlineItem {
    fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }
}

/// Shallow inventory of a source text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralOutline {
    pub functions: Vec<OutlineItem>,
    pub types: Vec<OutlineItem>,
    pub variables: Vec<OutlineItem>,
}

impl StructuralOutline {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.types.is_empty() && self.variables.is_empty()
    }
}

/// Dependency and outline extraction
#[derive(Debug, Clone, Default)]
pub struct StructuralAnalyzer;

impl StructuralAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Module names referenced by `import X` and `from X import Y` lines
    ///
    /// Only the leading package segment is kept (`import a.b.c` yields `a`).
    /// Relative imports (`from . import x`) name no package and are skipped.
    pub fn extract_dependencies(&self, text: &str) -> BTreeSet<String> {
        let mut deps = BTreeSet::new();

        for line in text.lines() {
            if let Some(caps) = FROM_IMPORT_RE.captures(line) {
                if let Some(root) = leading_segment(&caps[1]) {
                    deps.insert(root.to_string());
                }
            } else if let Some(caps) = IMPORT_RE.captures(line) {
                // import a.b as c, d
                for target in caps[1].split(',') {
                    let module = target.split_whitespace().next().unwrap_or_default();
                    if let Some(root) = leading_segment(module) {
                        deps.insert(root.to_string());
                    }
                }
            }
        }

        deps
    }

    /// Single forward scan classifying lines as functions, classes or assignments
    pub fn analyze_structure(&self, text: &str) -> StructuralOutline {
        let mut outline = StructuralOutline::default();

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = function_name(line) {
                outline.functions.push(OutlineItem::new(name, line_no));
            } else if let Some(name) = class_name(line) {
                outline.types.push(OutlineItem::new(name, line_no));
            } else if let Some((lhs, _)) = split_assignment(line) {
                // `x += 1` splits as `x +`
                let lhs = lhs.trim_end_matches(AUGMENTED_OPERATORS).trim_end();
                if !lhs.is_empty() {
                    outline.variables.push(OutlineItem::new(lhs, line_no));
                }
            }
        }

        outline
    }

    /// Build a module tree from the import and outline scans, without a parser
    pub fn heuristic_ast(&self, text: &str) -> AstNode {
        let mut children = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let indented = raw.starts_with(char::is_whitespace);
            let line = raw.trim();

            if indented {
                continue;
            }
            if let Some(caps) = FROM_NODE_RE.captures(line) {
                let module = caps.get(2).map_or("", |m| m.as_str());
                let names: Vec<serde_json::Value> = caps[3]
                    .trim_matches(|c| c == '(' || c == ')')
                    .split(',')
                    .filter_map(|t| t.split_whitespace().next())
                    .map(|t| serde_json::Value::String(t.to_string()))
                    .collect();
                children.push(
                    AstNode::new(kinds::IMPORT_FROM)
                        .with_line(line_no)
                        .with_attribute("module", serde_json::Value::String(module.to_string()))
                        .with_attribute("level", serde_json::Value::from(caps[1].len()))
                        .with_attribute("names", serde_json::Value::Array(names)),
                );
            } else if let Some(caps) = IMPORT_RE.captures(line) {
                let names: Vec<serde_json::Value> = caps[1]
                    .split(',')
                    .filter_map(|t| t.split_whitespace().next())
                    .map(|t| serde_json::Value::String(t.to_string()))
                    .collect();
                children.push(
                    AstNode::new(kinds::IMPORT)
                        .with_line(line_no)
                        .with_attribute("names", serde_json::Value::Array(names)),
                );
            } else if let Some(name) = function_name(line) {
                children.push(AstNode::new(kinds::FUNCTION_DEF).with_name(name).with_line(line_no));
            } else if let Some(name) = class_name(line) {
                children.push(AstNode::new(kinds::CLASS_DEF).with_name(name).with_line(line_no));
            }
        }

        AstNode::module(children)
    }
}

fn leading_segment(module: &str) -> Option<&str> {
    let root = module.split('.').next()?;
    if root.is_empty() {
        None
    } else {
        Some(root)
    }
}

fn function_name(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix("def ")
        .or_else(|| line.strip_prefix("async def "))?;
    let name = rest.split('(').next()?.trim();
    (!name.is_empty()).then_some(name)
}

fn class_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("class ")?;
    let name = rest.split(['(', ':']).next()?.trim();
    (!name.is_empty()).then_some(name)
}
