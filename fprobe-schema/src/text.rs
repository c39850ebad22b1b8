//! Text bounding helpers for explanations and report cells.

/// Suffix appended when text is cut.
const ELLIPSIS: &str = "...";

/// Collapse line breaks into single spaces and trim the ends.
pub fn single_line(text: &str) -> String {
    text.split(|c: char| c == '\r' || c == '\n')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate `text` to at most `max_chars` Unicode scalar values.
///
/// When cut, the result ends with `...` and still fits in `max_chars`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= ELLIPSIS.len() {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - ELLIPSIS.len()).collect();
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_collapses_breaks() {
        assert_eq!(single_line("a\nb\r\nc"), "a b c");
        assert_eq!(single_line("  padded \n\n"), "padded");
        assert_eq!(single_line(""), "");
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate_chars("short", 80), "short");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }

    #[test]
    fn test_truncate_long_text_has_ellipsis() {
        let out = truncate_chars("abcdefghij", 8);
        assert_eq!(out, "abcde...");
        assert_eq!(out.chars().count(), 8);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(10);
        let out = truncate_chars(&text, 6);
        assert_eq!(out, "ééé...");
    }

    #[test]
    fn test_truncate_tiny_limit() {
        assert_eq!(truncate_chars("abcdef", 2), "ab");
        assert_eq!(truncate_chars("abcdef", 0), "");
    }
}
