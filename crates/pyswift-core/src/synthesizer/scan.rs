// Declaration scanning over generated Swift text

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::{indent_width, split_top_level};

static FUNC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*func\s+([A-Za-z_]\w*)\s*\(").expect("valid func regex"));
static RETURN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:->\s*([^{]+?))?\s*\{").expect("valid return regex"));
static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(?:final\s+)?(?:class|struct)\s+([A-Za-z_]\w*)\b").expect("valid type regex")
});

/// One parameter of a Swift function header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwiftParam {
    /// Argument label used at the call site; `None` for `_` or variadics
    pub label: Option<String>,
    pub name: String,
    pub ty: Option<String>,
}

/// A `func` declaration found in Swift text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<SwiftParam>,
    pub return_type: Option<String>,
    /// Enclosing class or struct, when the function is a method
    pub owner: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations {
    pub functions: Vec<FunctionSignature>,
    pub types: Vec<String>,
}

/// Collect function and type declarations in document order
pub fn scan_declarations(swift: &str) -> Declarations {
    let mut decls = Declarations::default();
    // (indent, name) of type declarations still in scope
    let mut scopes: Vec<(usize, String)> = Vec::new();

    for (idx, raw) in swift.lines().enumerate() {
        let trimmed = raw.trim_start();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let indent = indent_width(raw, 1);
        while scopes.last().is_some_and(|(scope, _)| indent <= *scope) {
            scopes.pop();
        }

        if let Some(caps) = TYPE_RE.captures(raw) {
            let name = caps[2].to_string();
            scopes.push((indent, name.clone()));
            decls.types.push(name);
            continue;
        }

        if let Some(caps) = FUNC_RE.captures(raw) {
            let open = caps.get(0).map_or(0, |m| m.end());
            let Some(close) = matching_paren(raw, open) else {
                continue;
            };
            let Some(tail) = RETURN_RE.captures(&raw[close + 1..]) else {
                continue;
            };
            let return_type = tail
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .filter(|ty| !ty.is_empty() && ty != "Void");
            decls.functions.push(FunctionSignature {
                name: caps[1].to_string(),
                params: parse_params(&raw[open..close]),
                return_type,
                owner: scopes.last().map(|(_, name)| name.clone()),
                line: idx + 1,
            });
        }
    }

    decls
}

/// Byte offset of the `)` closing a parameter list that starts at `start`
///
/// Nested brackets and string literals are skipped.
fn matching_paren(line: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (offset, ch) in line[start..].char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' if depth == 0 => return Some(start + offset),
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    None
}

fn parse_params(list: &str) -> Vec<SwiftParam> {
    split_top_level(list)
        .iter()
        .filter_map(|param| parse_param(param))
        .collect()
}

fn parse_param(param: &str) -> Option<SwiftParam> {
    let declaration = param.split_once('=').map_or(param, |(head, _)| head).trim();
    let (names, ty) = match declaration.split_once(':') {
        Some((names, ty)) => (names.trim(), Some(ty.trim().to_string())),
        None => (declaration, None),
    };

    let mut words = names.split_whitespace();
    let first = words.next()?.to_string();
    let (label, name) = match words.next() {
        Some(second) if first == "_" => (None, second.to_string()),
        Some(second) => (Some(first), second.to_string()),
        None => (Some(first.clone()), first),
    };

    let variadic = ty.as_deref().is_some_and(|ty| ty.ends_with("..."));
    Some(SwiftParam {
        label: if variadic { None } else { label },
        name,
        ty: ty.filter(|ty| !ty.is_empty()),
    })
}
