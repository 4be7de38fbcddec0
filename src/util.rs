//! Shared utility functions

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncate `s` to at most `max_width` terminal columns, ending in "…" when cut.
///
/// Width is measured in display columns, so wide characters (CJK, emoji)
/// count as two and a string is never split inside a character.
///
/// ```text
/// truncate_display("qwen/qwen3-coder", 8)  == "qwen/qw…"
/// truncate_display("日本語", 4)             == "日…"
/// ```
pub fn truncate_display(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    // Reserve one column for the ellipsis
    let budget = max_width - 1;
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_shorter_than_max() {
        assert_eq!(truncate_display("hello", 10), "hello");
        assert_eq!(truncate_display("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_ascii_adds_ellipsis() {
        assert_eq!(truncate_display("qwen/qwen3-coder", 8), "qwen/qw…");
    }

    #[test]
    fn test_truncate_respects_wide_chars() {
        // Each character is two columns wide
        assert_eq!(truncate_display("日本語", 4), "日…");
        assert_eq!(truncate_display("日本語", 5), "日本…");
        assert!(truncate_display("日本語", 5).width() <= 5);
    }

    #[test]
    fn test_truncate_to_zero_and_one() {
        assert_eq!(truncate_display("hello", 0), "");
        assert_eq!(truncate_display("hello", 1), "…");
    }
}
