//! CQL masking helpers.
//!
//! Text terms may carry the masking characters `*` (any run of characters)
//! and `?` (exactly one character). A backslash escapes the next character,
//! so `\*` is a literal asterisk.

/// Check whether a term contains an unescaped masking character.
pub fn has_wildcards(term: &str) -> bool {
    let mut chars = term.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '*' | '?' => return true,
            _ => {}
        }
    }
    false
}

/// Strip backslash escapes, yielding the literal text of a term.
pub fn unescape(term: &str) -> String {
    let mut result = String::with_capacity(term.len());
    let mut chars = term.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next) => result.push(next),
                None => result.push('\\'),
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Convert a masked CQL term into a SQL `LIKE` pattern using `\` as the
/// escape character.
pub fn to_like(term: &str) -> String {
    let mut result = String::with_capacity(term.len() + 4);
    let mut chars = term.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => result.push('%'),
            '?' => result.push('_'),
            '%' | '_' => {
                result.push('\\');
                result.push(c);
            }
            '\\' => match chars.next() {
                Some(next @ ('%' | '_' | '\\')) => {
                    result.push('\\');
                    result.push(next);
                }
                Some(next) => result.push(next),
                None => result.push_str("\\\\"),
            },
            _ => result.push(c),
        }
    }
    result
}
