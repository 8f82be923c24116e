//! Client-side message bounds.
//!
//! Incoming messages are cut to `max_msg_length` characters before they are
//! forwarded.  The morse server enforces its own, larger limit; the cut here
//! keeps one long message from monopolising the light.
//!
//! Lengths are counted in Unicode scalar values (`char`s), so a cut never
//! lands inside a multi-byte character.


/// Result of [`truncate_message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation<'a> {
    /// The kept prefix of the message.
    pub text: &'a str,
    /// Characters in the original message.
    pub original_chars: usize,
    /// Characters in `text`.
    pub kept_chars: usize,
}

impl Truncation<'_> {
    /// Whether anything was cut off.
    pub fn was_truncated(&self) -> bool {
        self.kept_chars < self.original_chars
    }
}

/// Keeps at most `max_chars` characters of `message`.
///
/// # Examples
///
/// ```rust
/// use huemorse_core::truncate_message;
///
/// let cut = truncate_message("SOS SOS", 3);
/// assert_eq!(cut.text, "SOS");
/// assert!(cut.was_truncated());
/// ```
pub fn truncate_message(message: &str, max_chars: usize) -> Truncation<'_> {
    let original_chars = message.chars().count();
    if original_chars <= max_chars {
        return Truncation {
            text: message,
            original_chars,
            kept_chars: original_chars,
        };
    }

    // `nth(max_chars)` is the first character that does not fit; its byte
    // offset is the cut point.
    let cut = message
        .char_indices()
        .nth(max_chars)
        .map_or(message.len(), |(idx, _)| idx);

    Truncation {
        text: &message[..cut],
        original_chars,
        kept_chars: max_chars,
    }
}

/// Flattens `text` into a single wire line.
///
/// The server reads exactly one line per connection, so embedded line breaks
/// become spaces.  Each break character maps to one space, leaving the
/// character count unchanged.
pub fn to_wire_line(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_is_untouched() {
        // Arrange / Act
        let cut = truncate_message("... --- ...", 10000);

        // Assert
        assert_eq!(cut.text, "... --- ...");
        assert!(!cut.was_truncated());
        assert_eq!(cut.kept_chars, 11);
    }

    #[test]
    fn test_message_exactly_at_limit_is_untouched() {
        let cut = truncate_message("abcd", 4);
        assert_eq!(cut.text, "abcd");
        assert!(!cut.was_truncated());
    }

    #[test]
    fn test_long_message_is_cut_to_limit() {
        let cut = truncate_message("abcdef", 4);

        assert_eq!(cut.text, "abcd");
        assert_eq!(cut.original_chars, 6);
        assert_eq!(cut.kept_chars, 4);
        assert!(cut.was_truncated());
    }

    #[test]
    fn test_cut_respects_multibyte_characters() {
        // Arrange: each 'ä' is two bytes in UTF-8
        let message = "ääää";

        // Act
        let cut = truncate_message(message, 3);

        // Assert: three characters, six bytes, no panic on a split scalar
        assert_eq!(cut.text, "äää");
        assert_eq!(cut.text.len(), 6);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let cut = truncate_message("x", 0);
        assert_eq!(cut.text, "");
        assert!(cut.was_truncated());
    }

    #[test]
    fn test_wire_line_replaces_line_breaks() {
        assert_eq!(to_wire_line("... ---\r\n..."), "... ---  ...");
        assert_eq!(to_wire_line("a\nb"), "a b");
    }

    #[test]
    fn test_wire_line_keeps_character_count() {
        let text = "line one\nline two\r\nthree";
        assert_eq!(to_wire_line(text).chars().count(), text.chars().count());
    }
}
