//! Query expression normalization
//!
//! Two expressions compare equal when they contain the same tokens. Runs of
//! whitespace and `#` comments are dropped, except that a single space is
//! kept between two word characters so `a or b` never collapses into
//! `aorb`. String literals are copied verbatim.

/// Characters that can be part of an identifier, keyword, or number.
fn is_word(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ':' | '.')
}

/// Normalize a query expression for comparison.
pub fn normalize_expr(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut chars = expr.chars();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        match c {
            '#' => {
                // comment runs to end of line
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
                pending_space = true;
            }
            c if c.is_whitespace() => pending_space = true,
            '"' | '\'' | '`' => {
                pending_space = false;
                out.push(c);
                let mut escaped = false;
                for next in chars.by_ref() {
                    out.push(next);
                    if escaped {
                        escaped = false;
                    } else if next == '\\' && c != '`' {
                        escaped = true;
                    } else if next == c {
                        break;
                    }
                }
            }
            c => {
                if pending_space && out.chars().last().is_some_and(is_word) && is_word(c) {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
            }
        }
    }

    out
}
