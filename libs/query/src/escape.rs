//! Query value escaping for the Solr standard query parser.
//!
//! Reserved syntax characters are escaped with `\`:
//! `\ + - ! ( ) : ^ [ ] " { } ~ * ? | & ; /` and any whitespace.
//!
//! Literal criteria values additionally keep `*` unescaped (so callers can
//! pass their own wildcards) and are wrapped in double quotes once they
//! contain a space.

const RESERVED: &[char] = &[
    '\\', '+', '-', '!', '(', ')', ':', '^', '[', ']', '"', '{', '}', '~', '*', '?', '|', '&',
    ';', '/',
];

const WILDCARD: char = '*';

fn needs_escape(c: char) -> bool {
    RESERVED.contains(&c) || c.is_whitespace()
}

/// Escape every reserved character, including `*`.
pub fn escape_query_chars(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    for c in input.chars() {
        if needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a literal criteria value exactly once.
///
/// Wildcards survive; values containing whitespace are quoted.
pub fn escape_criteria_value(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    for c in input.chars() {
        if c != WILDCARD && needs_escape(c) {
            out.push('\\');
        }
        out.push(c);
    }
    quote_whitespace(out)
}

fn quote_whitespace(value: String) -> String {
    if value.contains(' ') {
        format!("\"{}\"", value)
    } else {
        value
    }
}

/// `true` when the value contains whitespace; wildcard builders reject those.
pub(crate) fn contains_whitespace(value: &str) -> bool {
    value.chars().any(char::is_whitespace)
}
