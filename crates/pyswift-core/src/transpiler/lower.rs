//! Lowering: Python text to the statement IR
//!
//! Physical lines are first folded into logical lines (open brackets, trailing
//! backslashes and triple-quoted docstrings), each logical line is classified
//! into one [`Stmt`], and an indentation stack nests bodies under their block
//! headers.
//!
//! Indentation must be a multiple of the configured unit. Anything else is
//! rounded down to the enclosing level and reported as a warning; a line
//! indented deeper than its block allows is attached to the innermost open
//! block, also with a warning.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ir::{Node, Param, Stmt};
use super::TranslationWarning;
use crate::text::{indent_width, split_assignment, split_top_level};

static IMPORT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:import\s+\S|from\s+\S+\s+import\s)").expect("valid import regex"));
static DEF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\((.*)\)\s*(?:->\s*(.+?))?\s*:\s*(?:#.*)?$")
        .expect("valid def regex")
});
static CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^class\s+([A-Za-z_]\w*)\s*(?:\(.*\))?\s*:\s*(?:#.*)?$").expect("valid class regex")
});
static IF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^if\s+(.+?)\s*:\s*(?:#.*)?$").expect("valid if regex"));
static ELIF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^elif\s+(.+?)\s*:\s*(?:#.*)?$").expect("valid elif regex"));
static ELSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^else\s*:\s*(?:#.*)?$").expect("valid else regex"));
static FOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:async\s+)?for\s+(.+?)\s+in\s+(.+?)\s*:\s*(?:#.*)?$").expect("valid for regex")
});
static WHILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^while\s+(.+?)\s*:\s*(?:#.*)?$").expect("valid while regex"));
static UNSUPPORTED_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:try|except|finally|with|async\s+with|match|case)\b.*:\s*(?:#.*)?$")
        .expect("valid block regex")
});
static RETURN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^return(?:\s+(.*))?$").expect("valid return regex"));
static TARGET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][\w.]*(?:\[[^\]]*\])?(?:\s*,\s*[A-Za-z_][\w.]*)*)\s*(?::\s*(.+))?$")
        .expect("valid target regex")
});
static PRINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^print\((.*)\)\s*$").expect("valid print regex"));

/// A classified logical line; `indent` is `None` for lines that never
/// affect block structure (blanks and comments)
struct Classified {
    line: usize,
    indent: Option<usize>,
    stmt: Stmt,
}

struct Frame {
    child_level: usize,
    opener: Option<Node>,
    body: Vec<Node>,
}

/// Lower `source` into a statement tree
pub(crate) fn lower(source: &str, unit: usize) -> (Vec<Node>, Vec<TranslationWarning>) {
    let unit = unit.max(1);
    let mut warnings = Vec::new();
    let mut stack = vec![Frame {
        child_level: 0,
        opener: None,
        body: Vec::new(),
    }];

    for item in logical_lines(source, unit) {
        let node = Node::new(item.line, item.stmt);
        let Some(width) = item.indent else {
            push_node(&mut stack, node);
            continue;
        };

        let level = width / unit;
        if width % unit != 0 {
            warnings.push(TranslationWarning::new(
                item.line,
                format!("indentation of {width} columns is not a multiple of {unit}; treated as level {level}"),
            ));
        }

        while stack.len() > 1 && level < current_level(&stack) {
            close_frame(&mut stack, &mut warnings);
        }

        let expected = current_level(&stack);
        if level > expected {
            warnings.push(TranslationWarning::new(
                item.line,
                "unexpected indentation; attached to the enclosing block",
            ));
        }

        if node.stmt.opens_block() {
            stack.push(Frame {
                child_level: expected + 1,
                opener: Some(node),
                body: Vec::new(),
            });
        } else {
            push_node(&mut stack, node);
        }
    }

    while stack.len() > 1 {
        close_frame(&mut stack, &mut warnings);
    }

    let root = stack.pop().map(|frame| frame.body).unwrap_or_default();
    (root, warnings)
}

fn current_level(stack: &[Frame]) -> usize {
    stack.last().map(|frame| frame.child_level).unwrap_or(0)
}

fn push_node(stack: &mut [Frame], node: Node) {
    if let Some(frame) = stack.last_mut() {
        frame.body.push(node);
    }
}

fn close_frame(stack: &mut Vec<Frame>, warnings: &mut Vec<TranslationWarning>) {
    let Some(mut frame) = stack.pop() else {
        return;
    };
    let Some(mut opener) = frame.opener.take() else {
        return;
    };

    // Blank lines before a dedent belong after the closing brace
    let mut trailing = Vec::new();
    while matches!(frame.body.last(), Some(Node { stmt: Stmt::Blank, .. })) {
        trailing.extend(frame.body.pop());
    }
    trailing.reverse();

    if frame.body.is_empty() {
        warnings.push(TranslationWarning::new(opener.line, "block has no body"));
    }
    if let Some(body) = opener.stmt.body_mut() {
        *body = frame.body;
    }

    push_node(stack, opener);
    for node in trailing {
        push_node(stack, node);
    }
}

fn logical_lines(source: &str, unit: usize) -> Vec<Classified> {
    let lines: Vec<&str> = source.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let raw = lines[i];
        let line = i + 1;
        let trimmed = raw.trim();
        let indent = indent_width(raw, unit);
        i += 1;

        if trimmed.is_empty() {
            out.push(Classified {
                line,
                indent: None,
                stmt: Stmt::Blank,
            });
            continue;
        }
        if let Some(comment) = trimmed.strip_prefix('#') {
            out.push(Classified {
                line,
                indent: None,
                stmt: Stmt::Comment(comment.to_string()),
            });
            continue;
        }

        if let Some(delimiter) = docstring_delimiter(trimmed) {
            let mut content = Vec::new();
            let first = &trimmed[3..];
            if let Some(end) = first.find(delimiter) {
                content.push(first[..end].trim().to_string());
            } else {
                if !first.trim().is_empty() {
                    content.push(first.trim().to_string());
                }
                while i < lines.len() {
                    let next = lines[i].trim();
                    i += 1;
                    if let Some(end) = next.find(delimiter) {
                        if !next[..end].trim().is_empty() {
                            content.push(next[..end].trim().to_string());
                        }
                        break;
                    }
                    content.push(next.to_string());
                }
            }
            out.push(Classified {
                line,
                indent: Some(indent),
                stmt: Stmt::Docstring(content),
            });
            continue;
        }

        // Fold bracket and backslash continuations into one logical line
        let mut text = trimmed.to_string();
        let mut depth = bracket_delta(trimmed);
        while (depth > 0 || text.ends_with('\\')) && i < lines.len() {
            if text.ends_with('\\') {
                text.pop();
            }
            let next = lines[i].trim();
            i += 1;
            text = format!("{} {}", text.trim_end(), next);
            depth += bracket_delta(next);
        }

        out.push(Classified {
            line,
            indent: Some(indent),
            stmt: classify(&text),
        });
    }

    out
}

fn docstring_delimiter(trimmed: &str) -> Option<&'static str> {
    if trimmed.starts_with("\"\"\"") {
        Some("\"\"\"")
    } else if trimmed.starts_with("'''") {
        Some("'''")
    } else {
        None
    }
}

/// Net bracket nesting change of a line, ignoring strings and comments
fn bracket_delta(line: &str) -> i32 {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in line.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '#' => break,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth
}

/// Classify one logical line; first match wins
fn classify(text: &str) -> Stmt {
    if IMPORT_RE.is_match(text) {
        return Stmt::Import(text.to_string());
    }
    if let Some(caps) = DEF_RE.captures(text) {
        return Stmt::FunctionDef {
            name: caps[1].to_string(),
            params: parse_params(&caps[2]),
            returns: caps.get(3).map(|m| m.as_str().trim().to_string()),
            body: Vec::new(),
        };
    }
    if let Some(caps) = CLASS_RE.captures(text) {
        return Stmt::ClassDef {
            name: caps[1].to_string(),
            body: Vec::new(),
        };
    }
    if let Some(caps) = IF_RE.captures(text) {
        return Stmt::If {
            condition: caps[1].to_string(),
            body: Vec::new(),
        };
    }
    if let Some(caps) = ELIF_RE.captures(text) {
        return Stmt::Elif {
            condition: caps[1].to_string(),
            body: Vec::new(),
        };
    }
    if ELSE_RE.is_match(text) {
        return Stmt::Else { body: Vec::new() };
    }
    if let Some(caps) = FOR_RE.captures(text) {
        return Stmt::For {
            target: caps[1].to_string(),
            iterable: caps[2].to_string(),
            body: Vec::new(),
        };
    }
    if let Some(caps) = WHILE_RE.captures(text) {
        return Stmt::While {
            condition: caps[1].to_string(),
            body: Vec::new(),
        };
    }
    if UNSUPPORTED_BLOCK_RE.is_match(text) {
        return Stmt::Unsupported {
            header: text.to_string(),
            body: Vec::new(),
        };
    }
    if let Some(caps) = RETURN_RE.captures(text) {
        return Stmt::Return(caps.get(1).map(|m| m.as_str().to_string()));
    }
    if let Some(stmt) = classify_assignment(text) {
        return stmt;
    }
    if let Some(caps) = PRINT_RE.captures(text) {
        return Stmt::Print(caps[1].to_string());
    }
    if text == "pass" {
        return Stmt::Pass;
    }
    Stmt::Raw(text.to_string())
}

fn classify_assignment(text: &str) -> Option<Stmt> {
    let (lhs, rhs) = split_assignment(text)?;
    // Augmented assignment (`x += 1`) is left to the raw path
    if lhs.ends_with(|c: char| "+-*/%&|^<>@".contains(c)) || rhs.is_empty() {
        return None;
    }
    let caps = TARGET_RE.captures(lhs)?;
    Some(Stmt::Assign {
        target: caps[1].to_string(),
        annotation: caps.get(2).map(|m| m.as_str().trim().to_string()),
        value: rhs.to_string(),
    })
}

fn parse_params(list: &str) -> Vec<Param> {
    let mut params: Vec<Param> = split_top_level(list).iter().map(|p| parse_param(p)).collect();
    if matches!(params.first(), Some(p) if (p.name == "self" || p.name == "cls") && p.annotation.is_none()) {
        params.remove(0);
    }
    params
}

fn parse_param(text: &str) -> Param {
    let (head, default) = match split_assignment(text) {
        Some((head, default)) => (head, Some(default.to_string())),
        None => (text.trim(), None),
    };
    match head.split_once(':') {
        Some((name, annotation)) => Param {
            name: name.trim().to_string(),
            annotation: Some(annotation.trim().to_string()),
            default,
        },
        None => Param {
            name: head.to_string(),
            annotation: None,
            default,
        },
    }
}
