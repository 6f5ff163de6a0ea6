// Swift code generation from the statement IR
// One output line per recognized statement, plus closing braces for blocks.

use super::ir::{Node, Param, Stmt};
use super::rewrite::{map_type, rewrite_expression, rewrite_iterable};

/// Types that render as a Swift fragment
pub trait ToSwift {
    fn to_swift(&self) -> String;
}

impl ToSwift for Param {
    fn to_swift(&self) -> String {
        if let Some(rest) = self.name.strip_prefix("**") {
            return format!("{rest}: [String: Any]");
        }
        if let Some(rest) = self.name.strip_prefix('*') {
            return format!("_ {rest}: Any...");
        }

        let mut out = self.name.clone();
        if let Some(annotation) = &self.annotation {
            out.push_str(": ");
            out.push_str(&map_type(annotation));
        }
        if let Some(default) = &self.default {
            out.push_str(" = ");
            out.push_str(&rewrite_expression(default));
        }
        out
    }
}

/// Swift return clause for an optional Python annotation; empty for `None`
pub(crate) fn return_clause(returns: Option<&str>) -> String {
    match returns.map(map_type) {
        Some(ty) if ty != "Void" => format!(" -> {ty}"),
        _ => String::new(),
    }
}

pub(crate) struct SwiftEmitter {
    indent_width: usize,
    out: String,
}

impl SwiftEmitter {
    pub(crate) fn new(indent_width: usize) -> Self {
        Self {
            indent_width,
            out: String::new(),
        }
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }

    pub(crate) fn emit_block(&mut self, nodes: &[Node], depth: usize) {
        for node in nodes {
            self.emit_node(node, depth);
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        if !text.is_empty() {
            self.out.push_str(&" ".repeat(depth * self.indent_width));
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn braced(&mut self, depth: usize, header: String, body: &[Node]) {
        self.line(depth, &format!("{header} {{"));
        self.emit_block(body, depth + 1);
        self.line(depth, "}");
    }

    fn emit_node(&mut self, node: &Node, depth: usize) {
        match &node.stmt {
            Stmt::Blank => self.line(depth, ""),
            Stmt::Comment(text) => self.line(depth, &format!("//{text}")),
            Stmt::Docstring(lines) => {
                for text in lines {
                    let text = if text.is_empty() {
                        "///".to_string()
                    } else {
                        format!("/// {text}")
                    };
                    self.line(depth, &text);
                }
            }
            Stmt::Import(text) => {
                self.line(depth, &format!("// {text}  (no automatic Swift equivalent; port manually)"))
            }
            Stmt::FunctionDef {
                name,
                params,
                returns,
                body,
            } => {
                let params = params.iter().map(ToSwift::to_swift).collect::<Vec<_>>().join(", ");
                let header = format!("func {name}({params}){}", return_clause(returns.as_deref()));
                self.braced(depth, header, body);
            }
            Stmt::ClassDef { name, body } => self.braced(depth, format!("class {name}"), body),
            Stmt::If { condition, body } => {
                self.braced(depth, format!("if {}", rewrite_expression(condition)), body)
            }
            Stmt::Elif { condition, body } => {
                self.braced(depth, format!("else if {}", rewrite_expression(condition)), body)
            }
            Stmt::Else { body } => self.braced(depth, "else".to_string(), body),
            Stmt::For {
                target,
                iterable,
                body,
            } => self.braced(
                depth,
                format!("for {} in {}", target.trim(), rewrite_iterable(iterable)),
                body,
            ),
            Stmt::While { condition, body } => {
                self.braced(depth, format!("while {}", rewrite_expression(condition)), body)
            }
            Stmt::Unsupported { header, body } => {
                self.line(depth, &format!("// unsupported: {header}"));
                self.emit_block(body, depth + 1);
            }
            Stmt::Return(Some(value)) => {
                self.line(depth, &format!("return {}", rewrite_expression(value)))
            }
            Stmt::Return(None) => self.line(depth, "return"),
            Stmt::Assign {
                target,
                annotation,
                value,
            } => {
                let ty = annotation
                    .as_deref()
                    .map(|a| format!(": {}", map_type(a)))
                    .unwrap_or_default();
                let target = if target.contains(',') {
                    format!("({target})")
                } else {
                    target.clone()
                };
                self.line(depth, &format!("let {target}{ty} = {}", rewrite_expression(value)));
            }
            Stmt::Print(args) => self.line(depth, &format!("print({})", rewrite_expression(args))),
            Stmt::Pass => self.line(depth, "// pass"),
            Stmt::Raw(text) => self.line(depth, &rewrite_expression(text)),
        }
    }
}
