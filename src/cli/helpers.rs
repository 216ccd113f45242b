//! Shared helper functions for CLI commands

use crate::core::identity::RecordId;

/// Format a RecordId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix
/// so list output stays aligned.
pub fn format_short_id(id: &RecordId) -> String {
    format_short_id_str(&id.to_string())
}

/// Same behavior as format_short_id but for an already-rendered id
pub fn format_short_id_str(id: &str) -> String {
    if id.len() > 16 {
        format!("{}...", &id[..13])
    } else {
        id.to_string()
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

/// Escape a string for CSV output (RFC 4180)
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::RecordPrefix;

    #[test]
    fn test_format_short_id() {
        let id = RecordId::new(RecordPrefix::Doc);
        let formatted = format_short_id(&id);
        // DOC- (4) + ULID (26) = 30 chars, so it truncates
        assert!(formatted.len() <= 16);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_format_short_id_str() {
        assert_eq!(format_short_id_str("QP-7.5-01"), "QP-7.5-01");
        assert_eq!(
            format_short_id_str("DOC-01J123456789ABCDEF123456"),
            "DOC-01J123456..."
        );
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }
}
