//! Expression and type rewriting
//!
//! Expression rewriting is literal token substitution. It has no notion of
//! string literals or precedence, so `"None"` inside a string becomes `"nil"`
//! as well.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text::split_top_level;

struct Substitution {
    pattern: Regex,
    replacement: &'static str,
}

static SUBSTITUTIONS: Lazy<Vec<Substitution>> = Lazy::new(|| {
    [
        (r"\bis\s+not\b", "!="),
        (r"\bis\b", "=="),
        (r"\bNone\b", "nil"),
        (r"\bTrue\b", "true"),
        (r"\bFalse\b", "false"),
        (r"\band\b", "&&"),
        (r"\bor\b", "||"),
        (r"\bnot\b\s*", "!"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| Substitution {
        pattern: Regex::new(pattern).expect("valid substitution regex"),
        replacement,
    })
    .collect()
});

static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^range\((.*)\)$").expect("valid range regex"));

/// Apply the fixed token substitutions to an expression
pub fn rewrite_expression(expr: &str) -> String {
    let mut out = expr.trim().to_string();
    for sub in SUBSTITUTIONS.iter() {
        out = sub.pattern.replace_all(&out, sub.replacement).into_owned();
    }
    out
}

/// Rewrite a `for` iterable; `range(..)` calls become Swift ranges
pub fn rewrite_iterable(expr: &str) -> String {
    let trimmed = expr.trim();
    if let Some(caps) = RANGE_RE.captures(trimmed) {
        let args = split_top_level(&caps[1]);
        match args.as_slice() {
            [end] => return format!("0..<{}", rewrite_expression(end)),
            [start, end] => {
                return format!("{}..<{}", rewrite_expression(start), rewrite_expression(end))
            }
            _ => {}
        }
    }
    rewrite_expression(trimmed)
}

/// Map a Python annotation to a Swift type
///
/// Unrecognized names map to `Any`.
pub fn map_type(annotation: &str) -> String {
    let annotation = annotation.trim().trim_matches(|c| c == '"' || c == '\'');

    if let Some((base, inner)) = generic_parts(annotation) {
        let args: Vec<String> = split_top_level(inner).iter().map(|a| map_type(a)).collect();
        return match (base, args.as_slice()) {
            ("List" | "list" | "Sequence" | "Iterable", [elem]) => format!("[{elem}]"),
            ("Set" | "set", [elem]) => format!("Set<{elem}>"),
            ("Dict" | "dict" | "Mapping", [key, value]) => format!("[{key}: {value}]"),
            ("Optional", [inner]) => format!("{inner}?"),
            ("Tuple" | "tuple", elems) if !elems.is_empty() => format!("({})", elems.join(", ")),
            _ => "Any".to_string(),
        };
    }

    match annotation {
        "int" => "Int",
        "float" => "Double",
        "str" => "String",
        "bool" => "Bool",
        "bytes" => "Data",
        "list" | "List" => "[Any]",
        "dict" | "Dict" => "[String: Any]",
        "tuple" | "Tuple" => "(Any, Any)",
        "set" | "Set" => "Set<AnyHashable>",
        "None" => "Void",
        _ => "Any",
    }
    .to_string()
}

fn generic_parts(annotation: &str) -> Option<(&str, &str)> {
    let open = annotation.find('[')?;
    let inner = annotation.get(open + 1..)?.strip_suffix(']')?;
    let base = annotation[..open].trim();
    let base = base.rsplit('.').next().unwrap_or(base);
    Some((base, inner))
}
