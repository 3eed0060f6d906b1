//! Pure text cleanup and validity checks applied to raw engine output.

use regex::Regex;
use std::sync::OnceLock;

/// Minimum length for extracted text to count as meaningful.
const MIN_TEXT_LEN: usize = 20;

/// At least this share of characters must be alphanumeric.
const MIN_ALNUM_RATIO: f64 = 0.5;

fn allowlist_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"[^a-zA-Z0-9.,!?;:'"()@#$%&*+=\-_/\\\[\]{}|\s]"#)
            .expect("hardcoded allowlist pattern")
    })
}

fn basic_allowlist_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\s._-]").expect("hardcoded allowlist pattern"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("hardcoded whitespace pattern"))
}

/// Normalize raw OCR output: drop characters outside the allow-list
/// (letters, digits, common punctuation), collapse every whitespace run
/// (including newlines) to a single space, and trim. Idempotent.
pub fn clean_text(text: &str) -> String {
    let stripped = allowlist_re().replace_all(text, "");
    let collapsed = whitespace_re().replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Stricter variant used by the plain extract endpoints: keeps only
/// alphanumerics, whitespace, dots, underscores, and hyphens.
pub fn clean_text_basic(text: &str) -> String {
    let stripped = basic_allowlist_re().replace_all(text, "");
    let collapsed = whitespace_re().replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Semantic success test for a recognition attempt, independent of the
/// engine's own confidence score: long enough to be meaningful, and mostly
/// alphanumeric.
pub fn is_valid_text(text: &str) -> bool {
    let total = text.chars().count();
    if total < MIN_TEXT_LEN {
        return false;
    }
    let alnum = text.chars().filter(|c| c.is_ascii_alphanumeric()).count();
    alnum as f64 / total as f64 > MIN_ALNUM_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collapses_whitespace_and_newlines() {
        assert_eq!(
            clean_text("hello\n\n  world\t again"),
            "hello world again"
        );
    }

    #[test]
    fn strips_disallowed_characters() {
        assert_eq!(clean_text("caf\u{00e9} £price 42"), "caf price 42");
    }

    #[test]
    fn keeps_common_punctuation() {
        assert_eq!(
            clean_text("Total: $42.50 (incl. tax)!"),
            "Total: $42.50 (incl. tax)!"
        );
    }

    #[test]
    fn cleaning_is_idempotent() {
        let inputs = [
            "a \u{00a3} b",
            "  x\n\ny  ",
            "plain text",
            "symbols \u{2603} between\twords",
        ];
        for input in inputs {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn basic_cleaning_is_stricter() {
        assert_eq!(
            clean_text_basic("file_name-01.txt (draft)"),
            "file_name-01.txt draft"
        );
    }

    #[test]
    fn rejects_short_text() {
        assert!(!is_valid_text("too short"));
        assert!(!is_valid_text("exactly 19 chars ab"));
    }

    #[test]
    fn accepts_meaningful_text() {
        assert!(is_valid_text("This invoice totals 42 dollars"));
    }

    #[test]
    fn rejects_mostly_symbolic_text() {
        assert!(!is_valid_text("-- .. // \\ || {} [] () ,, !! ?? ;; ::"));
    }

    #[test]
    fn ratio_boundary_is_exclusive() {
        // 10 alphanumeric characters out of 20 is exactly half, which fails
        // the strict > 0.5 requirement.
        let half = "abcdefghij..........";
        assert_eq!(half.chars().count(), 20);
        assert!(!is_valid_text(half));

        let above = "abcdefghijk.........";
        assert!(is_valid_text(above));
    }
}
