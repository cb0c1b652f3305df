//! HTML utility functions.
//!
//! - `escape()` - HTML entity escaping for text content
//! - `escape_inline_script()` - keep script text from closing its `<script>` tag

use std::borrow::Cow;

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters in text content.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Make JavaScript safe to inline between `<script>` and `</script>`.
///
/// `<\/script` means the same as `</script` inside JS strings, regexes and
/// comments, but the HTML parser no longer sees an end tag.
pub fn escape_inline_script(js: &str) -> Cow<'_, str> {
    const END_TAG: &str = "</script";

    if !js.to_ascii_lowercase().contains(END_TAG) {
        return Cow::Borrowed(js);
    }

    let lower = js.to_ascii_lowercase();
    let mut result = String::with_capacity(js.len() + 8);
    let mut last = 0;
    for (start, _) in lower.match_indices(END_TAG) {
        result.push_str(&js[last..start]);
        result.push_str("<\\/");
        last = start + 2;
    }
    result.push_str(&js[last..]);
    Cow::Owned(result)
}

// =============================================================================
// Tests
// =============================================================================
