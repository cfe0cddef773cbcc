// LogLens - core/sgr.rs
//
// Escape-sequence renderer: turns terminal SGR sequences (`ESC[<codes>m`)
// embedded in block text into styled spans of the run model.
// Core layer: pure logic over `StyledText`.
//
// Balancing: open spans are tracked explicitly. A start sequence whose codes
// are all unrecognised opens nothing; a reset with nothing open is dropped;
// spans still open at the end of the block are closed by the serialiser.

use crate::core::markup::{Node, Run, SpanId, StyledText};
use regex::Regex;
use std::sync::OnceLock;

/// Style effect of one recognised SGR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleRule {
    /// Foreground colour as a CSS hex value.
    Colour(&'static str),
    Bold,
    Underline,
    /// Inverse video, approximated as white on black.
    Inverse,
}

impl StyleRule {
    /// CSS declaration(s) for this rule.
    pub fn css(&self) -> String {
        match self {
            StyleRule::Colour(hex) => format!("color: {hex}"),
            StyleRule::Bold => "font-weight: bold".to_string(),
            StyleRule::Underline => "text-decoration: underline".to_string(),
            StyleRule::Inverse => "background-color: #000; color: #fff".to_string(),
        }
    }
}

/// The 16 standard foreground colours.
const SGR_COLOURS: &[(u16, &str)] = &[
    (30, "#000000"),
    (31, "#ff0000"),
    (32, "#00ff00"),
    (33, "#ffff00"),
    (34, "#0000ff"),
    (35, "#ff00ff"),
    (36, "#00ffff"),
    (37, "#ffffff"),
    (90, "#555555"),
    (91, "#ff5555"),
    (92, "#55ff55"),
    (93, "#ffff55"),
    (94, "#5555ff"),
    (95, "#ff55ff"),
    (96, "#55ffff"),
    (97, "#ffffff"),
];

/// SGR reset parameter.
const SGR_RESET: u16 = 0;

/// Look up the rule for a single SGR code. Unrecognised codes map to `None`.
pub fn style_rule(code: u16) -> Option<StyleRule> {
    match code {
        1 => Some(StyleRule::Bold),
        4 => Some(StyleRule::Underline),
        7 => Some(StyleRule::Inverse),
        _ => SGR_COLOURS
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, hex)| StyleRule::Colour(hex)),
    }
}

/// CSS declaration list for a `;`-separated code list, or `None` when no code
/// is recognised. Reset codes contribute nothing.
pub fn style_for_codes(codes: &str) -> Option<String> {
    let decls: Vec<String> = codes
        .split(';')
        .filter_map(|c| c.parse::<u16>().ok())
        .filter(|&c| c != SGR_RESET)
        .filter_map(style_rule)
        .map(|rule| rule.css())
        .collect();
    if decls.is_empty() {
        None
    } else {
        Some(decls.join("; "))
    }
}

/// True when the code list contains a reset (`0`, or an empty list as in `ESC[m`).
fn has_reset(codes: &str) -> bool {
    codes.is_empty()
        || codes
            .split(';')
            .any(|c| c.parse::<u16>().ok() == Some(SGR_RESET))
}

fn sgr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\x1b\[([0-9;]*)m").expect("sgr_regex: invalid regex"))
}

/// Render every SGR sequence in `text` into styled spans.
///
/// Colour state carries across foreign tags. Returns true when at least one
/// escape sequence was consumed.
pub fn render_escapes(text: &mut StyledText) -> bool {
    let re = sgr_regex();
    if !text.runs().any(|r| re.is_match(&r.text)) {
        return false;
    }

    let nodes = text.take_nodes();
    let mut rebuilt: Vec<Node> = Vec::with_capacity(nodes.len());
    let mut open: Vec<SpanId> = Vec::new();
    let mut consumed = 0usize;

    for node in nodes {
        let run = match node {
            Node::Text(run) => run,
            tag => {
                rebuilt.push(tag);
                continue;
            }
        };

        let mut last = 0usize;
        for caps in re.captures_iter(&run.text) {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            push_piece(&mut rebuilt, &run, &run.text[last..whole.start], &open);
            last = whole.end;
            consumed += 1;

            let codes = caps.get(1).map_or("", |m| m.as_str());
            if has_reset(codes) {
                open.pop();
            }
            if let Some(css) = style_for_codes(codes) {
                open.push(text.push_style(css));
            }
        }
        push_piece(&mut rebuilt, &run, &run.text[last..], &open);
    }

    tracing::trace!(
        sequences = consumed,
        styles = text.style_count(),
        "Rendered SGR sequences"
    );
    text.replace_nodes(rebuilt);
    consumed > 0
}

fn push_piece(out: &mut Vec<Node>, source: &Run, piece: &str, open: &[SpanId]) {
    if piece.is_empty() {
        return;
    }
    let mut spans = source.spans.clone();
    spans.extend_from_slice(open);
    out.push(Node::Text(Run {
        text: piece.to_string(),
        spans,
        marks: source.marks,
    }));
}

// =============================================================================
// Unit tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::markup::SerializeOptions;

    fn render(markup: &str) -> String {
        let mut t = StyledText::parse(markup);
        render_escapes(&mut t);
        t.to_markup(&SerializeOptions::default())
    }

    #[test]
    fn test_known_codes_map_to_exact_declarations() {
        assert_eq!(style_for_codes("31").as_deref(), Some("color: #ff0000"));
        assert_eq!(style_for_codes("1").as_deref(), Some("font-weight: bold"));
        assert_eq!(
            style_for_codes("4").as_deref(),
            Some("text-decoration: underline")
        );
        assert_eq!(
            style_for_codes("7").as_deref(),
            Some("background-color: #000; color: #fff")
        );
        assert_eq!(
            style_for_codes("1;94").as_deref(),
            Some("font-weight: bold; color: #5555ff")
        );
    }

    #[test]
    fn test_unknown_codes_contribute_nothing() {
        assert_eq!(style_for_codes("99"), None);
        assert_eq!(style_for_codes("38;5;208"), None);
        assert_eq!(style_for_codes("99;32").as_deref(), Some("color: #00ff00"));
    }

    #[test]
    fn test_every_table_entry_is_unique() {
        let mut codes: Vec<u16> = SGR_COLOURS.iter().map(|(c, _)| *c).collect();
        codes.extend([1, 4, 7]);
        let len = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), len);
    }

    #[test]
    fn test_balanced_sequence_renders_one_span() {
        assert_eq!(
            render("\x1b[31mred\x1b[0m plain"),
            "<span class=\"loglens-ansi\" style=\"color: #ff0000\">red</span> plain"
        );
    }

    #[test]
    fn test_bare_reset_closes_span() {
        assert_eq!(
            render("\x1b[32mok\x1b[m tail"),
            "<span class=\"loglens-ansi\" style=\"color: #00ff00\">ok</span> tail"
        );
    }

    #[test]
    fn test_nested_sequences_are_well_formed() {
        let out = render("\x1b[1mbold \x1b[32mgreen\x1b[0m bold\x1b[0m end");
        assert_eq!(
            out,
            "<span class=\"loglens-ansi\" style=\"font-weight: bold\">bold \
             <span class=\"loglens-ansi\" style=\"color: #00ff00\">green</span> bold</span> end"
        );
        assert_eq!(out.matches("<span").count(), out.matches("</span>").count());
    }

    #[test]
    fn test_empty_style_start_opens_nothing_and_reset_is_dropped() {
        let out = render("\x1b[99mtext\x1b[0m more");
        assert_eq!(out, "text more");
    }

    #[test]
    fn test_unclosed_span_is_closed_at_end() {
        let out = render("\x1b[33mwarning never reset");
        assert_eq!(
            out,
            "<span class=\"loglens-ansi\" style=\"color: #ffff00\">warning never reset</span>"
        );
    }

    #[test]
    fn test_compound_reset_then_style() {
        let out = render("\x1b[31ma\x1b[0;32mb\x1b[0m");
        assert_eq!(
            out,
            "<span class=\"loglens-ansi\" style=\"color: #ff0000\">a</span>\
             <span class=\"loglens-ansi\" style=\"color: #00ff00\">b</span>"
        );
    }

    #[test]
    fn test_style_carries_across_foreign_tag() {
        let out = render("\x1b[36mone<br>two\x1b[0m");
        assert_eq!(
            out,
            "<span class=\"loglens-ansi\" style=\"color: #00ffff\">one</span><br>\
             <span class=\"loglens-ansi\" style=\"color: #00ffff\">two</span>"
        );
    }

    #[test]
    fn test_entity_encoded_escape_is_rendered() {
        let out = render("&#27;[32mok&#27;[0m");
        assert_eq!(
            out,
            "<span class=\"loglens-ansi\" style=\"color: #00ff00\">ok</span>"
        );
    }

    #[test]
    fn test_no_sequences_reports_unchanged() {
        let mut t = StyledText::parse("nothing to see");
        assert!(!render_escapes(&mut t));
        assert_eq!(t.plain_text(), "nothing to see");
    }

    #[test]
    fn test_rendering_is_stable_on_own_output() {
        let once = render("\x1b[35mmagenta\x1b[0m");
        assert_eq!(render(&once), once);
    }
}
