//! Escaping for text that came back from the comparison service.
//!
//! Both escapers are single-pass and not idempotent: feeding an escaped
//! string back in escapes it again. Call each exactly once per raw string.

/// Characters that mark a segment as mathematical notation.
pub const MATH_MARKERS: [char; 8] = ['\\', '$', '[', ']', '{', '}', '_', '^'];

/// Characters that [`escape_math`] prefixes with a backslash.
pub const MATH_SPECIALS: [char; 8] = ['_', '^', '%', '&', '$', '{', '}', '#'];

/// Escape text for embedding in HTML element content or attribute values.
///
/// `&` is handled in the same pass as the other characters, so entities
/// produced for `<`, `>`, `"` and `'` are never escaped a second time.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text for embedding between math delimiters.
///
/// A special character already preceded by a backslash in the input is left
/// alone. The check looks at the input, so a backslash inserted for one
/// character never counts as escaping the next.
pub fn escape_math(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;
    for ch in text.chars() {
        if MATH_SPECIALS.contains(&ch) && prev != Some('\\') {
            out.push('\\');
        }
        out.push(ch);
        prev = Some(ch);
    }
    out
}

/// Drop control characters other than `\t` before text reaches a terminal,
/// so escape sequences in service data cannot drive it.
pub fn strip_control(text: &str) -> String {
    text.chars().filter(|&c| c == '\t' || !c.is_control()).collect()
}

/// True when the segment should be typeset as math rather than shown as text.
pub fn is_math_segment(text: &str) -> bool {
    text.contains(&MATH_MARKERS[..])
}
