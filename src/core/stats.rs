// LogLens - core/stats.rs
//
// Per-block line / error / warning counts shown in the controls bar.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Summary counts over a block's plain text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BlockStats {
    /// Newline-delimited lines; a trailing newline does not start a new line.
    pub lines: usize,
    /// Lines containing ERROR, FAILED or Exception (any case).
    pub errors: usize,
    /// Lines containing WARN (any case).
    pub warnings: usize,
}

fn error_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)ERROR|FAILED|Exception").expect("error_word: invalid regex"))
}

fn warn_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)WARN").expect("warn_word: invalid regex"))
}

impl BlockStats {
    /// Count lines, error lines and warning lines in `text`.
    pub fn compute(text: &str) -> Self {
        let mut stats = Self::default();
        for line in text.lines() {
            stats.lines += 1;
            if error_word().is_match(line) {
                stats.errors += 1;
            }
            if warn_word().is_match(line) {
                stats.warnings += 1;
            }
        }
        stats
    }
}

impl std::fmt::Display for BlockStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} lines • {} errors • {} warnings",
            self.lines, self.errors, self.warnings
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_block() {
        let stats = BlockStats::compute("[ERROR] build failed\n[WARN] retry\nok\n");
        assert_eq!(
            stats,
            BlockStats {
                lines: 3,
                errors: 1,
                warnings: 1
            }
        );
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(BlockStats::compute(""), BlockStats::default());
    }

    #[test]
    fn test_no_trailing_newline() {
        assert_eq!(BlockStats::compute("a\nb").lines, 2);
    }

    #[test]
    fn test_case_insensitive_keywords() {
        let stats = BlockStats::compute("java.lang.exception thrown\nwarning: unused\nWarn again\n");
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.warnings, 2);
    }

    #[test]
    fn test_display_format() {
        let stats = BlockStats {
            lines: 10,
            errors: 2,
            warnings: 0,
        };
        assert_eq!(stats.to_string(), "10 lines • 2 errors • 0 warnings");
    }
}
