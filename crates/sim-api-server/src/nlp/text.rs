use once_cell::sync::Lazy;
use regex::Regex;

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x08\x0b\x0c\x0e-\x1f]").expect("control regex"));
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\f]+").expect("ws regex"));

/// Strip control characters and collapse horizontal whitespace runs.
/// Newlines survive: the chunker treats them as cut boundaries.
pub fn clean_text(text: &str) -> String {
    let no_controls = CONTROL_CHARS.replace_all(text, "");
    let collapsed = WHITESPACE_RUNS.replace_all(&no_controls, " ");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_control_characters() {
        assert_eq!(clean_text("a\x00b\x07c"), "abc");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(clean_text("a   b\t\tc"), "a b c");
    }

    #[test]
    fn test_preserves_newlines() {
        assert_eq!(clean_text("line one\nline two"), "line one\nline two");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(clean_text("  padded  "), "padded");
    }
}
