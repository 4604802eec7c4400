//! Text normalization and tokenization.
//!
//! # Pipeline
//! 1. Lowercase the input.
//! 2. Replace everything except letters, digits, whitespace and apostrophes with a space.
//!    Combining marks survive when they follow a letter, so decomposed text
//!    ("cafe\u{301}") keeps its accents.
//! 3. Split on whitespace runs.
//! 4. Trim apostrophes from both ends of each token.
//! 5. Drop tokens of one character or less, and purely numeric tokens.

/// Tokenize raw text into an ordered sequence of normalized tokens.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut cleaned = String::with_capacity(raw.len());
    let mut after_letter = false;
    for c in raw.to_lowercase().chars() {
        if is_combining_mark(c) {
            cleaned.push(if after_letter { c } else { ' ' });
            continue;
        }
        after_letter = c.is_alphanumeric();
        cleaned.push(if keep_char(c) { c } else { ' ' });
    }

    cleaned
        .split_whitespace()
        .map(|token| token.trim_matches('\''))
        .filter(|token| token.chars().count() > 1)
        .filter(|token| !is_numeric(token))
        .map(str::to_string)
        .collect()
}

fn keep_char(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace() || c == '\''
}

/// Combining diacritical mark blocks.
fn is_combining_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE20}'..='\u{FE2F}'
    )
}

fn is_numeric(token: &str) -> bool {
    token.chars().all(char::is_numeric)
}
