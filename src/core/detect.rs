// LogLens - core/detect.rs
//
// Log block discovery rules: per-platform structural selectors and the
// content heuristic used for generic `pre`/`code` elements.
// Core layer: selectors are plain data; the host resolves them.

use crate::core::model::Platform;
use regex::Regex;
use std::sync::OnceLock;

/// Structural selector understood by every host.
///
/// `Display` renders the equivalent CSS selector for hosts backed by a real
/// document query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// `.class`
    Class(&'static str),
    /// `tag`
    Tag(&'static str),
    /// `tag.class`
    TagClass(&'static str, &'static str),
    /// `tag[attr="value"]`
    TagAttr {
        tag: &'static str,
        attr: &'static str,
        value: &'static str,
    },
    /// `#id tag`
    DescendantOfId { id: &'static str, tag: &'static str },
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Class(class) => write!(f, ".{class}"),
            Selector::Tag(tag) => f.write_str(tag),
            Selector::TagClass(tag, class) => write!(f, "{tag}.{class}"),
            Selector::TagAttr { tag, attr, value } => write!(f, "{tag}[{attr}=\"{value}\"]"),
            Selector::DescendantOfId { id, tag } => write!(f, "#{id} {tag}"),
        }
    }
}

const GITHUB_SELECTORS: &[Selector] = &[
    Selector::Class("js-log-line"),
    Selector::Class("log-line"),
    Selector::TagAttr {
        tag: "pre",
        attr: "data-filterable-for",
        value: "job-logs-filter",
    },
    Selector::Class("job-logs"),
];

const GITLAB_SELECTORS: &[Selector] = &[
    Selector::Class("job-log"),
    Selector::Class("build-log"),
    Selector::Class("ci-log"),
    Selector::TagClass("pre", "build-trace"),
];

const JENKINS_SELECTORS: &[Selector] = &[
    Selector::DescendantOfId {
        id: "main-panel",
        tag: "pre",
    },
    Selector::Class("console-output"),
    Selector::TagClass("pre", "console"),
];

const GENERIC_SELECTORS: &[Selector] = &[Selector::Tag("pre"), Selector::Tag("code")];

/// Ordered selectors tried for a platform.
pub fn selectors_for(platform: Platform) -> &'static [Selector] {
    match platform {
        Platform::Github => GITHUB_SELECTORS,
        Platform::Gitlab => GITLAB_SELECTORS,
        Platform::Jenkins => JENKINS_SELECTORS,
        Platform::Generic => GENERIC_SELECTORS,
    }
}

/// Substrings that make a generic element look like log output.
const LOG_MARKERS: &[&str] = &["[ERROR]", "[WARN]", "ERROR:", "FAILED", "ansi", "\u{1b}["];

fn iso_date_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\A\d{4}-\d{2}-\d{2}").expect("iso_date_prefix: invalid regex"))
}

/// Content heuristic for generic `pre`/`code` elements.
///
/// The text must be longer than `min_chars` characters and contain a level
/// tag, a failure keyword, a raw escape sequence, or start with an ISO date.
pub fn looks_like_log(text: &str, min_chars: usize) -> bool {
    if text.chars().count() <= min_chars {
        return false;
    }
    LOG_MARKERS.iter().any(|m| text.contains(m)) || iso_date_prefix().is_match(text)
}
