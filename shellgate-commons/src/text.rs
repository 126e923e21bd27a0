//! Character-based clipping for command output and log tails.
//!
//! Limits count Unicode scalar values, so multi-byte output is never split
//! in the middle of a character.

use std::borrow::Cow;

/// Appended to captured output that exceeded its limit.
pub const OUTPUT_TRUNCATION_MARKER: &str = "\n... [output truncated]";

/// Prepended to a log tail that dropped earlier content.
pub const TAIL_TRUNCATION_MARKER: &str = "... [earlier output truncated]\n";

/// Keep the first `max_chars` characters of `text`, appending
/// [`OUTPUT_TRUNCATION_MARKER`] when anything was dropped.
///
/// Text exactly at the limit is returned untouched.
pub fn truncate_head(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => {
            let mut clipped = String::with_capacity(cut + OUTPUT_TRUNCATION_MARKER.len());
            clipped.push_str(&text[..cut]);
            clipped.push_str(OUTPUT_TRUNCATION_MARKER);
            Cow::Owned(clipped)
        }
    }
}

/// Keep the last `max_chars` characters of `text`, prefixing
/// [`TAIL_TRUNCATION_MARKER`] when anything was dropped.
pub fn truncate_tail(text: &str, max_chars: usize) -> Cow<'_, str> {
    let total = text.chars().count();
    if total <= max_chars {
        return Cow::Borrowed(text);
    }

    let skip = total - max_chars;
    let cut = text
        .char_indices()
        .nth(skip)
        .map_or(text.len(), |(index, _)| index);
    let mut clipped = String::with_capacity(TAIL_TRUNCATION_MARKER.len() + text.len() - cut);
    clipped.push_str(TAIL_TRUNCATION_MARKER);
    clipped.push_str(&text[cut..]);
    Cow::Owned(clipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn head_at_limit_is_untouched() {
        let text = "x".repeat(4000);
        assert_eq!(truncate_head(&text, 4000), Cow::Borrowed(text.as_str()));
    }

    #[test]
    fn head_over_limit_gets_marker() {
        let text = "x".repeat(4001);
        let clipped = truncate_head(&text, 4000);
        assert!(clipped.ends_with(OUTPUT_TRUNCATION_MARKER));
        assert_eq!(clipped.chars().filter(|c| *c == 'x').count(), 4000);
    }

    #[test]
    fn head_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(truncate_head(&text, 10), Cow::Borrowed(text.as_str()));
        assert_eq!(truncate_head(&text, 3), format!("ééé{OUTPUT_TRUNCATION_MARKER}"));
    }

    #[test]
    fn tail_keeps_last_characters() {
        assert_eq!(truncate_tail("abcdef", 3), format!("{TAIL_TRUNCATION_MARKER}def"));
        assert_eq!(truncate_tail("abc", 3), "abc");
    }
}
