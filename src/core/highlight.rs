// LogLens - core/highlight.rs
//
// Pattern highlighter: marks error/failure indicators in rendered block text.
// Core layer: pure logic over `StyledText`.
//
// Each match extends to the next foreign tag or the end of the line (`.`
// never crosses a newline). Marks are run flags, so applying the patterns
// again, or to markup that already carries error markers, never nests a
// second marker.

use crate::core::markup::{MarkKind, StyledText};
use regex::Regex;
use std::sync::OnceLock;

/// Error patterns in application order.
///
/// The four level/keyword patterns are case-insensitive; stack frames and
/// the symbol markers are case-sensitive.
pub const ERROR_PATTERNS: &[&str] = &[
    r"(?i)\[ERROR\].*",
    r"(?i)ERROR:.*",
    r"(?i)FAILED.*",
    r"(?i)Exception:.*",
    r"at .*?\.java:\d+\)",
    r"at .*?\.js:\d+:\d+\)",
    r"✗.*",
    r"❌.*",
];

fn error_regexes() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        ERROR_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("error_regexes: invalid regex"))
            .collect()
    })
}

/// Mark every error pattern match in `text`.
///
/// Returns true when any text became newly marked.
pub fn highlight_errors(text: &mut StyledText) -> bool {
    let mut changed = false;
    let mut matches = 0usize;
    for re in error_regexes() {
        let outcome = text.mark_matches(re, MarkKind::Error);
        matches += outcome.matches;
        changed |= outcome.newly_marked;
    }
    tracing::trace!(matches, changed, "Applied error patterns");
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::markup::SerializeOptions;

    fn highlight(markup: &str) -> String {
        let mut t = StyledText::parse(markup);
        highlight_errors(&mut t);
        t.to_markup(&SerializeOptions::default())
    }

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(error_regexes().len(), ERROR_PATTERNS.len());
    }

    #[test]
    fn test_bracket_tag_marks_to_end_of_line() {
        assert_eq!(
            highlight("[ERROR] build failed\nnext line"),
            "<span class=\"loglens-error\">[ERROR] build failed</span>\nnext line"
        );
    }

    #[test]
    fn test_level_prefix_is_case_insensitive() {
        assert_eq!(
            highlight("error: disk full"),
            "<span class=\"loglens-error\">error: disk full</span>"
        );
    }

    #[test]
    fn test_failed_and_exception() {
        let out = highlight("Tests FAILED\nNullPointerException: null\n");
        assert_eq!(out.matches("class=\"loglens-error\"").count(), 2);
    }

    #[test]
    fn test_stack_frames_are_case_sensitive() {
        let java = highlight("    at com.acme.Main.run(Main.java:42)");
        assert!(java.contains("<span class=\"loglens-error\">at com.acme.Main.run(Main.java:42)</span>"));
        let js = highlight("    at Object.<anonymous> (index.js:10:5)".replace('<', "&lt;").as_str());
        assert!(js.contains("loglens-error"), "js frame should match: {js}");
        let upper = highlight("    AT com.acme.Main.run(Main.java:42)");
        assert!(!upper.contains("loglens-error"));
    }

    #[test]
    fn test_match_stops_at_foreign_tag() {
        assert_eq!(
            highlight("FAILED step<span class=\"ts\">12:00</span>"),
            "<span class=\"loglens-error\">FAILED step</span><span class=\"ts\">12:00</span>"
        );
    }

    #[test]
    fn test_reapplication_never_double_wraps() {
        let once = highlight("[ERROR] a\nERROR: b\nFAILED c\nException: d\n");
        let twice = highlight(&once);
        assert_eq!(once, twice);
        assert!(!twice.contains("<span class=\"loglens-error\"><span class=\"loglens-error\">"));
    }

    #[test]
    fn test_reapplication_reports_unchanged() {
        let mut t = StyledText::parse("FAILED once");
        assert!(highlight_errors(&mut t));
        assert!(!highlight_errors(&mut t));
    }

    #[test]
    fn test_clean_text_is_untouched() {
        let mut t = StyledText::parse("Compiling loglens v1.0.0\nFinished\n");
        assert!(!highlight_errors(&mut t));
    }

    #[test]
    fn test_symbol_markers() {
        let out = highlight("❌ lint\n✗ typecheck\n✓ fmt");
        assert_eq!(out.matches("loglens-error").count(), 2);
    }
}
