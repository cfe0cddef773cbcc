// LogLens - core/search.rs
//
// Live in-block search. Queries are literal: every regex metacharacter is
// escaped before the matcher is built, and matching is case-insensitive.

use crate::core::markup::{MarkKind, StyledText};
use crate::util::error::SearchError;
use regex::{Regex, RegexBuilder};

/// Build the literal, case-insensitive matcher for `query`.
///
/// Returns `Ok(None)` when the query is blank (whitespace only).
pub fn query_regex(query: &str) -> Result<Option<Regex>, SearchError> {
    if query.trim().is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .map(Some)
        .map_err(|e| SearchError::InvalidPattern {
            query: query.to_string(),
            source: e,
        })
}

/// Replace any previous search marks with the matches of `query`.
///
/// Returns the number of matches. A blank query only clears.
pub fn apply_search(text: &mut StyledText, query: &str) -> Result<usize, SearchError> {
    text.clear_mark(MarkKind::Search);
    let Some(re) = query_regex(query)? else {
        return Ok(0);
    };
    let outcome = text.mark_matches(&re, MarkKind::Search);
    tracing::debug!(matches = outcome.matches, "Search applied");
    Ok(outcome.matches)
}

/// Remove all search marks and merge the runs they split.
pub fn clear_search(text: &mut StyledText) -> bool {
    text.clear_mark(MarkKind::Search)
}
