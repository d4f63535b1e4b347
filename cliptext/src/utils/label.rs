//! Menu label formatting.

/// Maximum number of characters shown for a history entry in the menu.
pub const LABEL_WIDTH: usize = 50;

/// Truncates `text` to at most `width` characters.
///
/// Truncation counts Unicode scalar values, so multi-byte characters are
/// never split.
///
/// # Examples
///
/// ```
/// use cliptext::utils::label::truncate_label;
///
/// assert_eq!(truncate_label("short", 50), "short");
/// assert_eq!(truncate_label("abcdef", 3), "abc");
/// assert_eq!(truncate_label("日本語テキスト", 3), "日本語");
/// ```
#[must_use]
pub fn truncate_label(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
