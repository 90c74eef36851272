//! Splits message text into command and argument tokens.
//!
//! Tokens are whitespace separated, except that `"quoted text"` and
//! `key="quoted text"` are kept together. Double quotes are removed from the
//! emitted tokens. There is no escaping: a literal `"` can't appear inside an
//! argument.

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\S*="[^"]+"|"[^"]+"|\S+"#).expect("token pattern must compile")
});

/// The leading token of a text, as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token text including any quotes.
    pub raw: &'a str,
    /// Byte offset just past the token.
    pub end: usize,
}

/// Split `text` into tokens, starting at byte offset `from`.
///
/// An offset past the end of `text` or inside a multi-byte character yields
/// no tokens.
pub fn tokenize(text: &str, from: usize) -> Vec<String> {
    let Some(rest) = text.get(from..) else {
        return Vec::new();
    };
    TOKEN_PATTERN
        .find_iter(rest)
        .map(|m| m.as_str().replace('"', ""))
        .collect()
}

/// The first token of `text`, if `text` starts with one.
///
/// Leading whitespace means there is no first token, the same as empty text.
pub fn first_token(text: &str) -> Option<Token<'_>> {
    let m = TOKEN_PATTERN.find(text)?;
    if m.start() != 0 {
        return None;
    }
    Some(Token {
        raw: m.as_str(),
        end: m.end(),
    })
}
