//! Whitespace collapse and the printable-ASCII gate.
//!
//! These two run before any pattern-based cleanup. Collapsing first means
//! the gate never sees tabs or newlines, only single spaces.
//!
//! Whitespace here is the ASCII set: space, `\t`, `\n`, vertical tab,
//! form feed and `\r`. Non-ASCII spaces such as U+00A0 are left in place
//! and the gate rejects them.

#[inline(always)]
const fn is_ascii_ws(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

#[inline(always)]
const fn is_printable_byte(b: u8) -> bool {
    matches!(b, 0x20..=0x7E)
}

/// Replaces every maximal run of ASCII whitespace with a single space.
///
/// Reuses the buffer's capacity and clears it before writing. Leading and
/// trailing runs become one space each; nothing is trimmed.
///
/// # Examples
///
/// ```
/// use geosift_core::analyzer::normalizer::collapse_whitespace_into;
///
/// let mut buf = String::new();
/// collapse_whitespace_into("a \t\n b", &mut buf);
/// assert_eq!(buf, "a b");
/// ```
#[inline]
pub fn collapse_whitespace_into(input: &str, out: &mut String) {
    out.clear();
    out.reserve(input.len());

    let mut prev_space = false;
    for ch in input.chars() {
        if is_ascii_ws(ch) {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
}

/// Collapses whitespace runs and returns a new String.
#[inline]
pub fn collapse_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    collapse_whitespace_into(input, &mut out);
    out
}

/// Returns `true` when every byte is printable US-ASCII (0x20..=0x7E).
///
/// A single byte outside the range fails the whole string. Any non-ASCII
/// character fails too, since its UTF-8 bytes are all above 0x7F.
#[inline]
pub fn is_printable_ascii(text: &str) -> bool {
    text.bytes().all(is_printable_byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collapse(input: &str) -> String {
        collapse_whitespace(input)
    }

    #[test]
    fn runs_become_single_space() {
        assert_eq!(collapse("hello   world"), "hello world");
        assert_eq!(collapse("hello\t\nworld"), "hello world");
        assert_eq!(collapse("hello \r\n world"), "hello world");
    }

    #[test]
    fn vertical_tab_and_form_feed_are_whitespace() {
        assert_eq!(collapse("a\x0Bb\x0Cc"), "a b c");
    }

    #[test]
    fn edges_collapse_but_are_kept() {
        assert_eq!(collapse("   hello"), " hello");
        assert_eq!(collapse("hello \n "), "hello ");
        assert_eq!(collapse(" \t\n\r "), " ");
    }

    #[test]
    fn empty_input() {
        assert_eq!(collapse(""), "");
    }

    #[test]
    fn non_ascii_space_is_not_collapsed() {
        assert_eq!(collapse("a\u{00A0}\u{00A0}b"), "a\u{00A0}\u{00A0}b");
    }

    #[test]
    fn idempotent() {
        let samples = ["hello world", "foo \t  bar", "  x\n\ny  ", "Café ☕ \r\n today"];

        for s in samples {
            let once = collapse(s);
            let twice = collapse(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn no_double_spaces() {
        let out = collapse("a  b   c\t\t d\n\n\ne");
        assert!(!out.contains("  "));
    }

    #[test]
    fn collapse_into_reuses_capacity() {
        let mut buf = String::with_capacity(64);
        let cap = buf.capacity();

        collapse_whitespace_into("one  two", &mut buf);
        assert_eq!(buf, "one two");
        collapse_whitespace_into("three", &mut buf);
        assert_eq!(buf, "three");
        assert_eq!(buf.capacity(), cap);
    }

    #[test]
    fn printable_range_bounds() {
        assert!(is_printable_ascii(" ~"));
        assert!(is_printable_ascii("Hello, World! 123 &amp; @you"));
        assert!(is_printable_ascii(""));
        assert!(!is_printable_ascii("\x1F"));
        assert!(!is_printable_ascii("\x7F"));
    }

    #[test]
    fn single_bad_char_fails_whole_string() {
        assert!(!is_printable_ascii("all good until here\u{0}"));
        assert!(!is_printable_ascii("Café"));
        assert!(!is_printable_ascii("coffee ☕"));
        assert!(!is_printable_ascii("\u{2028}"));
    }

    #[test]
    fn tabs_fail_until_collapsed() {
        let raw = "tab\there";
        assert!(!is_printable_ascii(raw));
        assert!(is_printable_ascii(&collapse(raw)));
    }
}
