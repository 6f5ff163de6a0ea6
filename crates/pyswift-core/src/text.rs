//! Small lexical helpers shared by the analyzer and the transpiler.

/// Byte offset of the first assignment `=` outside string literals
///
/// Comparison operators (`==`, `!=`, `<=`, `>=`) and the `=>`-free Python
/// grammar mean an `=` only counts when neither neighbour is `=` and the
/// previous character is not `!`, `<` or `>`.
pub(crate) fn assignment_offset(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'#' => return None,
            b'=' => {
                let prev = if i > 0 { bytes[i - 1] } else { b' ' };
                let next = bytes.get(i + 1).copied().unwrap_or(b' ');
                if next == b'=' || matches!(prev, b'=' | b'!' | b'<' | b'>') {
                    continue;
                }
                return Some(i);
            }
            _ => {}
        }
    }
    None
}

/// Split `lhs = rhs` on the first assignment `=`, both sides trimmed
pub(crate) fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let offset = assignment_offset(line)?;
    Some((line[..offset].trim(), line[offset + 1..].trim()))
}

/// Width of the leading whitespace, a tab counting as `tab_width` columns
pub(crate) fn indent_width(line: &str, tab_width: usize) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}

/// Split on commas that are not nested inside brackets or quotes
pub(crate) fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for ch in text.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
                current.push(ch);
            }
            None => match ch {
                '"' | '\'' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' | ']' | '}' => {
                    depth -= 1;
                    current.push(ch);
                }
                ',' if depth == 0 => {
                    parts.push(current.trim().to_string());
                    current.clear();
                }
                _ => current.push(ch),
            },
        }
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}
