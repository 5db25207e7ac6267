use std::borrow::Cow;

/// Escape a plain-text string for safe interpolation into HTML markup.
///
/// Used for captions, alt text, and placeholder strings. CMS-authored HTML
/// fragments (`textHtml`, `arabicContent`) are trusted and are never passed
/// through here.
///
/// Returns `Cow::Borrowed` when the input contains nothing to escape, which
/// is the common case for captions.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    let needs_escaping = text
        .chars()
        .any(|c| matches!(c, '&' | '<' | '>' | '"' | '\''));
    if !needs_escaping {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
