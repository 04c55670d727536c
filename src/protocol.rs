//! Protocol validation for URL-bearing attribute values.
//!
//! The check deliberately avoids a URL parser: it must see the value the
//! way a lenient HTML consumer would, after the control characters
//! attackers embed inside scheme names (`jav\tascript:`) are removed.

use std::borrow::Cow;

/// One entry in an allowed-protocols list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protocol {
    /// An explicit scheme name, stored lowercase.
    Scheme(String),
    /// URLs with no scheme component are allowed.
    Relative,
}

/// Decides whether an attribute value's URL scheme is permitted.
///
/// Pure function: strips embedded C0/C1 control characters, trims leading
/// spaces, then scans for the first of `:`, `/`, `?`, `#`. A `:` strictly
/// before any of the others marks the substring before it as the candidate
/// scheme, compared case-insensitively against the allowlist; otherwise the
/// value is relative and allowed only if the list carries
/// [`Protocol::Relative`].
pub fn allowed_protocol(allowed: &[Protocol], value: &str) -> bool {
    let cleaned = strip_control_characters(value);
    let cleaned = cleaned.trim_start_matches(' ');

    match extract_scheme(cleaned) {
        Some(scheme) => allowed
            .iter()
            .any(|p| matches!(p, Protocol::Scheme(s) if *s == scheme)),
        None => allowed.contains(&Protocol::Relative),
    }
}

/// The candidate scheme (lowercased), or `None` when the value is relative.
fn extract_scheme(value: &str) -> Option<String> {
    for (i, c) in value.char_indices() {
        match c {
            ':' => return Some(value[..i].to_ascii_lowercase()),
            '/' | '?' | '#' => return None,
            _ => {}
        }
    }
    None
}

/// Removes ASCII C0 controls (including tab, newline, carriage return, and
/// NUL), DEL, and the C1 control block.
fn strip_control_characters(value: &str) -> Cow<'_, str> {
    if value.chars().any(is_control) {
        Cow::Owned(value.chars().filter(|&c| !is_control(c)).collect())
    } else {
        Cow::Borrowed(value)
    }
}

fn is_control(c: char) -> bool {
    c.is_ascii_control() || ('\u{7F}'..='\u{9F}').contains(&c)
}
