//! crates/scribe-server/src/utils/mod.rs
//! Shared utility functions used across the codebase

/// Truncate a string to max length with ellipsis.
///
/// If the string is longer than `max_len`, it will be truncated at a char
/// boundary and "..." will be appended.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// First line of a string, trimmed.
pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        assert_eq!(truncate("héllo", 2), "h...");
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("fix: the bug\n\ndetails"), "fix: the bug");
        assert_eq!(first_line(""), "");
    }
}
