// Statement IR produced by lowering and consumed by codegen
// Expressions stay as raw Python text until codegen rewrites them.

/// A function parameter as written in the Python header
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub annotation: Option<String>,
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Blank,
    Comment(String),
    Docstring(Vec<String>),
    Import(String),
    FunctionDef {
        name: String,
        params: Vec<Param>,
        returns: Option<String>,
        body: Vec<Node>,
    },
    ClassDef {
        name: String,
        body: Vec<Node>,
    },
    If {
        condition: String,
        body: Vec<Node>,
    },
    Elif {
        condition: String,
        body: Vec<Node>,
    },
    Else {
        body: Vec<Node>,
    },
    For {
        target: String,
        iterable: String,
        body: Vec<Node>,
    },
    While {
        condition: String,
        body: Vec<Node>,
    },
    /// A block header the transpiler does not translate (`try:`, `with ...:`)
    Unsupported {
        header: String,
        body: Vec<Node>,
    },
    Return(Option<String>),
    Assign {
        target: String,
        annotation: Option<String>,
        value: String,
    },
    Print(String),
    Pass,
    Raw(String),
}

impl Stmt {
    /// Whether this statement owns an indented body
    pub fn opens_block(&self) -> bool {
        self.body().is_some()
    }

    pub fn body(&self) -> Option<&Vec<Node>> {
        match self {
            Stmt::FunctionDef { body, .. }
            | Stmt::ClassDef { body, .. }
            | Stmt::If { body, .. }
            | Stmt::Elif { body, .. }
            | Stmt::Else { body }
            | Stmt::For { body, .. }
            | Stmt::While { body, .. }
            | Stmt::Unsupported { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn body_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Stmt::FunctionDef { body, .. }
            | Stmt::ClassDef { body, .. }
            | Stmt::If { body, .. }
            | Stmt::Elif { body, .. }
            | Stmt::Else { body }
            | Stmt::For { body, .. }
            | Stmt::While { body, .. }
            | Stmt::Unsupported { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// A statement tagged with its 1-based source line
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub line: usize,
    pub stmt: Stmt,
}

impl Node {
    pub fn new(line: usize, stmt: Stmt) -> Self {
        Self { line, stmt }
    }
}
