// Interpreter-reported syntax tree for Python sources
// Only imports, functions and classes are expanded; every other statement
// collapses to a bare kind tag.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod kinds {
    pub const MODULE: &str = "Module";
    pub const IMPORT: &str = "Import";
    pub const IMPORT_FROM: &str = "ImportFrom";
    pub const FUNCTION_DEF: &str = "FunctionDef";
    pub const ASYNC_FUNCTION_DEF: &str = "AsyncFunctionDef";
    pub const CLASS_DEF: &str = "ClassDef";

    /// Kinds allowed as direct children of the module root
    pub const TOP_LEVEL: &[&str] = &[IMPORT, IMPORT_FROM, FUNCTION_DEF, ASYNC_FUNCTION_DEF, CLASS_DEF];
}

/// A node of the acquired syntax tree
///
/// Deserializes directly from the interpreter's JSON: `type` is the node kind
/// and any key other than `name`, `line` and `children` lands in
/// [`AstNode::attributes`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl AstNode {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            line: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn module(children: Vec<AstNode>) -> Self {
        Self {
            children,
            ..Self::new(kinds::MODULE)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn is_module(&self) -> bool {
        self.kind == kinds::MODULE
    }

    pub fn is_function(&self) -> bool {
        self.kind == kinds::FUNCTION_DEF || self.kind == kinds::ASYNC_FUNCTION_DEF
    }

    pub fn is_class(&self) -> bool {
        self.kind == kinds::CLASS_DEF
    }

    pub fn is_import(&self) -> bool {
        self.kind == kinds::IMPORT || self.kind == kinds::IMPORT_FROM
    }

    /// Pre-order traversal starting at this node
    pub fn walk(&self) -> AstWalk<'_> {
        AstWalk { stack: vec![self] }
    }

    /// All nodes of the given kind, in document order
    pub fn find_all(&self, kind: &str) -> Vec<&AstNode> {
        self.walk().filter(|node| node.kind == kind).collect()
    }

    /// Names of every function definition in the tree, nested ones included
    pub fn function_names(&self) -> Vec<&str> {
        self.walk()
            .filter(|node| node.is_function())
            .filter_map(|node| node.name.as_deref())
            .collect()
    }

    pub fn class_names(&self) -> Vec<&str> {
        self.walk()
            .filter(|node| node.is_class())
            .filter_map(|node| node.name.as_deref())
            .collect()
    }

    /// Number of nodes in the tree, root included
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Indented one-node-per-line rendering used by front ends
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.outline_into(&mut out, 0);
        out
    }

    fn outline_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.kind);
        if let Some(name) = &self.name {
            out.push(' ');
            out.push_str(name);
        }
        if let Some(line) = self.line {
            out.push_str(&format!(" (line {line})"));
        }
        out.push('\n');
        for child in &self.children {
            child.outline_into(out, depth + 1);
        }
    }
}

/// Iterator returned by [`AstNode::walk`]
pub struct AstWalk<'a> {
    stack: Vec<&'a AstNode>,
}

impl<'a> Iterator for AstWalk<'a> {
    type Item = &'a AstNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
