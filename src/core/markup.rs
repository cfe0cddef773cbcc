// LogLens - core/markup.rs
//
// Structured run model for log block content.
//
// A block's markup is parsed once into a sequence of nodes: foreign tags
// (passed through verbatim) and text runs. Each run carries its decoded
// plain text, the stack of SGR style spans it sits inside, and its marks
// (error, focused error, search match). Every transform works on runs;
// markup is produced only by `to_markup`.
//
// The parser recognises the elements the serialiser emits, so
// parse(to_markup(x)) preserves runs, styles and marks. Re-applying any
// transform to already-enhanced markup therefore never nests a second
// marker around the same text.
//
// Serialiser invariants:
//   - every element it opens is closed, in reverse order
//   - all of its own elements are closed before a foreign tag and reopened
//     after it, so foreign markup is never interleaved with ours

use crate::util::constants::{
    CLASS_ANSI, CLASS_ERROR, CLASS_ERROR_HIGHLIGHT, CLASS_FOLDED, CLASS_LINE, CLASS_SEARCH_MATCH,
};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Index of an SGR style in `StyledText::styles`.
pub type SpanId = usize;

// =============================================================================
// Runs and marks
// =============================================================================

/// Which mark a matcher applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkKind {
    Error,
    Search,
}

/// Marker flags carried by a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marks {
    /// Inside an error marker.
    pub error: bool,
    /// The error marker is the transient jump-to-error target.
    pub focused: bool,
    /// Inside a live search match.
    pub search: bool,
}

impl Marks {
    pub fn get(&self, kind: MarkKind) -> bool {
        match kind {
            MarkKind::Error => self.error,
            MarkKind::Search => self.search,
        }
    }

    pub fn set(&mut self, kind: MarkKind, value: bool) {
        match kind {
            MarkKind::Error => {
                self.error = value;
                if !value {
                    self.focused = false;
                }
            }
            MarkKind::Search => self.search = value,
        }
    }
}

/// A contiguous piece of text with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Decoded text (no entities, no tags).
    pub text: String,
    /// SGR spans enclosing the run, outermost first.
    pub spans: Vec<SpanId>,
    pub marks: Marks,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
            marks: Marks::default(),
        }
    }

    fn same_style(&self, other: &Run) -> bool {
        self.spans == other.spans && self.marks == other.marks
    }
}

/// One node of a parsed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Foreign markup tag (or comment), emitted verbatim.
    Tag(String),
    Text(Run),
}

/// Outcome of applying a matcher to a `StyledText`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkOutcome {
    /// Number of non-empty matches found.
    pub matches: usize,
    /// True when at least one piece of text was not already marked.
    pub newly_marked: bool,
}

/// Serialisation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Wrap each line in a `loglens-line` element.
    pub lines: bool,
    /// Add the folded class to every line element.
    pub folded: bool,
}

// =============================================================================
// StyledText
// =============================================================================

/// Parsed content of one log block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledText {
    nodes: Vec<Node>,
    /// CSS declaration lists of SGR spans, indexed by `SpanId`.
    styles: Vec<String>,
}

impl StyledText {
    /// Content consisting of a single unstyled run.
    pub fn from_plain(text: &str) -> Self {
        let mut out = Self::default();
        if !text.is_empty() {
            out.nodes.push(Node::Text(Run::plain(text)));
        }
        out
    }

    /// Parse block markup (the inner markup of a host node).
    pub fn parse(markup: &str) -> Self {
        let mut out = Self::default();
        let mut stack: Vec<OpenKind> = Vec::new();

        for token in tokenize(markup) {
            match token {
                Token::Text(raw) => {
                    let text = decode_entities(raw).into_owned();
                    let spans: Vec<SpanId> = stack
                        .iter()
                        .filter_map(|k| match k {
                            OpenKind::Sgr(id) => Some(*id),
                            _ => None,
                        })
                        .collect();
                    let mut marks = Marks::default();
                    for kind in &stack {
                        match kind {
                            OpenKind::Error { focused } => {
                                marks.error = true;
                                marks.focused |= *focused;
                            }
                            OpenKind::Search => marks.search = true,
                            _ => {}
                        }
                    }
                    out.push_run(Run { text, spans, marks });
                }
                Token::Tag(raw) => match classify_tag(raw) {
                    TagClass::OpenSpan(attrs) => {
                        let kind = match own_span_kind(&attrs) {
                            Some(OwnSpan::Line) => OpenKind::Line,
                            Some(OwnSpan::Ansi(css)) => OpenKind::Sgr(out.push_style(css)),
                            Some(OwnSpan::Error { focused }) => OpenKind::Error { focused },
                            Some(OwnSpan::Search) => OpenKind::Search,
                            None => {
                                out.nodes.push(Node::Tag(raw.to_string()));
                                OpenKind::Foreign
                            }
                        };
                        stack.push(kind);
                    }
                    TagClass::CloseSpan => match stack.pop() {
                        Some(OpenKind::Foreign) | None => out.nodes.push(Node::Tag(raw.to_string())),
                        Some(_) => {}
                    },
                    TagClass::Other => out.nodes.push(Node::Tag(raw.to_string())),
                },
            }
        }

        out
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// CSS declarations of an SGR span.
    pub fn style(&self, id: SpanId) -> Option<&str> {
        self.styles.get(id).map(String::as_str)
    }

    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Register a new SGR span and return its id.
    pub fn push_style(&mut self, css: impl Into<String>) -> SpanId {
        self.styles.push(css.into());
        self.styles.len() - 1
    }

    /// Iterate over text runs in document order.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Text(run) => Some(run),
            Node::Tag(_) => None,
        })
    }

    /// Replace the node list (used by transforms that rebuild runs).
    pub(crate) fn replace_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
        self.normalize();
    }

    pub(crate) fn take_nodes(&mut self) -> Vec<Node> {
        std::mem::take(&mut self.nodes)
    }

    /// Plain text as a host would report it for the block (text content).
    pub fn plain_text(&self) -> String {
        self.runs().map(|r| r.text.as_str()).collect()
    }

    /// True when any run carries the given mark.
    pub fn has_mark(&self, kind: MarkKind) -> bool {
        self.runs().any(|r| r.marks.get(kind))
    }

    /// Mark every non-empty match of `regex`.
    ///
    /// Matching runs over each maximal stretch of text between foreign tags,
    /// so a match may span several SGR runs but never a foreign tag.
    pub fn mark_matches(&mut self, regex: &Regex, kind: MarkKind) -> MarkOutcome {
        let mut outcome = MarkOutcome::default();
        let nodes = self.take_nodes();
        let mut rebuilt: Vec<Node> = Vec::with_capacity(nodes.len());
        let mut segment: Vec<Run> = Vec::new();

        for node in nodes {
            match node {
                Node::Text(run) => segment.push(run),
                Node::Tag(tag) => {
                    flush_segment(&mut segment, regex, kind, &mut outcome, &mut rebuilt);
                    rebuilt.push(Node::Tag(tag));
                }
            }
        }
        flush_segment(&mut segment, regex, kind, &mut outcome, &mut rebuilt);

        self.replace_nodes(rebuilt);
        outcome
    }

    /// Remove a mark from every run. Returns true when anything changed.
    pub fn clear_mark(&mut self, kind: MarkKind) -> bool {
        let mut changed = false;
        for node in &mut self.nodes {
            if let Node::Text(run) = node {
                if run.marks.get(kind) {
                    run.marks.set(kind, false);
                    changed = true;
                }
            }
        }
        if changed {
            self.normalize();
        }
        changed
    }

    /// Flag the first error-marked stretch as focused. Returns false when the
    /// block has no error marks.
    pub fn focus_first_error(&mut self) -> bool {
        self.clear_focus();
        let mut found = false;
        for node in &mut self.nodes {
            match node {
                Node::Text(run) if run.marks.error => {
                    run.marks.focused = true;
                    found = true;
                }
                _ if found => break,
                _ => {}
            }
        }
        found
    }

    /// Remove the focused flag from every run.
    pub fn clear_focus(&mut self) -> bool {
        let mut changed = false;
        for node in &mut self.nodes {
            if let Node::Text(run) = node {
                if run.marks.focused {
                    run.marks.focused = false;
                    changed = true;
                }
            }
        }
        if changed {
            self.normalize();
        }
        changed
    }

    /// Serialise back to markup.
    pub fn to_markup(&self, opts: &SerializeOptions) -> String {
        let mut out = String::new();
        let mut open: Vec<OpenElem> = Vec::new();
        let mut line = 0usize;

        for node in &self.nodes {
            match node {
                Node::Tag(tag) => {
                    close_to(&mut out, &mut open, 0);
                    out.push_str(tag);
                }
                Node::Text(run) => {
                    for piece in run.text.split_inclusive('\n') {
                        let wanted = self.wanted_elems(run, line, opts);
                        let common = open
                            .iter()
                            .zip(wanted.iter())
                            .take_while(|(a, b)| a == b)
                            .count();
                        close_to(&mut out, &mut open, common);
                        for elem in &wanted[common..] {
                            self.open_elem(&mut out, elem, opts);
                            open.push(*elem);
                        }
                        escape_text_into(&mut out, piece);
                        if piece.ends_with('\n') {
                            line += 1;
                        }
                    }
                }
            }
        }
        close_to(&mut out, &mut open, 0);
        out
    }

    fn wanted_elems(&self, run: &Run, line: usize, opts: &SerializeOptions) -> Vec<OpenElem> {
        let mut wanted = Vec::with_capacity(run.spans.len() + 3);
        if opts.lines {
            wanted.push(OpenElem::Line(line));
        }
        wanted.extend(run.spans.iter().map(|id| OpenElem::Sgr(*id)));
        if run.marks.error {
            wanted.push(OpenElem::Error {
                focused: run.marks.focused,
            });
        }
        if run.marks.search {
            wanted.push(OpenElem::Search);
        }
        wanted
    }

    fn open_elem(&self, out: &mut String, elem: &OpenElem, opts: &SerializeOptions) {
        match elem {
            OpenElem::Line(_) if opts.folded => {
                out.push_str(&format!("<span class=\"{CLASS_LINE} {CLASS_FOLDED}\">"));
            }
            OpenElem::Line(_) => out.push_str(&format!("<span class=\"{CLASS_LINE}\">")),
            OpenElem::Sgr(id) => {
                out.push_str(&format!("<span class=\"{CLASS_ANSI}\" style=\""));
                escape_attr_into(out, self.style(*id).unwrap_or_default());
                out.push_str("\">");
            }
            OpenElem::Error { focused: true } => out.push_str(&format!(
                "<span class=\"{CLASS_ERROR} {CLASS_ERROR_HIGHLIGHT}\">"
            )),
            OpenElem::Error { focused: false } => {
                out.push_str(&format!("<span class=\"{CLASS_ERROR}\">"));
            }
            OpenElem::Search => out.push_str(&format!("<span class=\"{CLASS_SEARCH_MATCH}\">")),
        }
    }

    /// Append a run, merging it into the previous run when the styling matches.
    fn push_run(&mut self, run: Run) {
        if run.text.is_empty() {
            return;
        }
        if let Some(Node::Text(prev)) = self.nodes.last_mut() {
            if prev.same_style(&run) {
                prev.text.push_str(&run.text);
                return;
            }
        }
        self.nodes.push(Node::Text(run));
    }

    /// Drop empty runs and merge adjacent runs with identical styling.
    fn normalize(&mut self) {
        let nodes = std::mem::take(&mut self.nodes);
        for node in nodes {
            match node {
                Node::Text(run) => self.push_run(run),
                tag => self.nodes.push(tag),
            }
        }
    }
}

/// Apply `regex` to the concatenated text of `segment`, split runs at match
/// boundaries and append the result to `out`.
fn flush_segment(
    segment: &mut Vec<Run>,
    regex: &Regex,
    kind: MarkKind,
    outcome: &mut MarkOutcome,
    out: &mut Vec<Node>,
) {
    if segment.is_empty() {
        return;
    }
    let joined: String = segment.iter().map(|r| r.text.as_str()).collect();
    let ranges: Vec<(usize, usize)> = regex
        .find_iter(&joined)
        .filter(|m| !m.as_str().is_empty())
        .map(|m| (m.start(), m.end()))
        .collect();
    outcome.matches += ranges.len();

    let mut base = 0usize;
    for run in segment.drain(..) {
        let len = run.text.len();
        let end = base + len;
        if ranges.iter().all(|&(s, e)| e <= base || s >= end) {
            base = end;
            out.push(Node::Text(run));
            continue;
        }

        let mut cuts: Vec<usize> = vec![0, len];
        for &(s, e) in &ranges {
            if s > base && s < end {
                cuts.push(s - base);
            }
            if e > base && e < end {
                cuts.push(e - base);
            }
        }
        cuts.sort_unstable();
        cuts.dedup();

        for pair in cuts.windows(2) {
            let (ps, pe) = (base + pair[0], base + pair[1]);
            let mut piece = Run {
                text: run.text[pair[0]..pair[1]].to_string(),
                spans: run.spans.clone(),
                marks: run.marks,
            };
            let inside = ranges.iter().any(|&(s, e)| ps >= s && pe <= e);
            if inside && !piece.marks.get(kind) {
                piece.marks.set(kind, true);
                outcome.newly_marked = true;
            }
            out.push(Node::Text(piece));
        }
        base = end;
    }
}

// =============================================================================
// Serialiser state
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenElem {
    Line(usize),
    Sgr(SpanId),
    Error { focused: bool },
    Search,
}

fn close_to(out: &mut String, open: &mut Vec<OpenElem>, depth: usize) {
    while open.len() > depth {
        open.pop();
        out.push_str("</span>");
    }
}

// =============================================================================
// Tokenizer and tag classification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Text(&'a str),
    Tag(&'a str),
}

/// Split markup into text and tag tokens.
///
/// A `<` that does not start a tag, or a tag with no closing `>`, is text.
fn tokenize(markup: &str) -> Vec<Token<'_>> {
    let bytes = markup.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let end = if markup[i..].starts_with("<!--") {
            markup[i + 4..].find("-->").map(|j| i + 4 + j + 3)
        } else if bytes
            .get(i + 1)
            .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
        {
            find_tag_end(bytes, i + 1)
        } else {
            i += 1;
            continue;
        };

        let Some(end) = end else {
            break;
        };
        if text_start < i {
            tokens.push(Token::Text(&markup[text_start..i]));
        }
        tokens.push(Token::Tag(&markup[i..end]));
        i = end;
        text_start = end;
    }

    if text_start < markup.len() {
        tokens.push(Token::Text(&markup[text_start..]));
    }
    tokens
}

/// Byte offset just past the `>` closing a tag, honouring quoted attributes.
fn find_tag_end(bytes: &[u8], from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (offset, &b) in bytes[from..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if b == b'>' => return Some(from + offset + 1),
            None => {}
        }
    }
    None
}

enum TagClass {
    OpenSpan(Vec<(String, String)>),
    CloseSpan,
    Other,
}

fn classify_tag(raw: &str) -> TagClass {
    let inner = raw.trim_start_matches('<').trim_end_matches('>');
    let (closing, rest) = match inner.strip_prefix('/') {
        Some(r) => (true, r),
        None => (false, inner),
    };
    let name: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    if name != "span" {
        return TagClass::Other;
    }
    if closing {
        TagClass::CloseSpan
    } else if inner.trim_end().ends_with('/') {
        TagClass::Other
    } else {
        TagClass::OpenSpan(parse_attrs(&rest[name.len()..]))
    }
}

fn attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
            .expect("attr_regex: invalid regex")
    })
}

fn parse_attrs(s: &str) -> Vec<(String, String)> {
    attr_regex()
        .captures_iter(s)
        .map(|caps| {
            let name = caps[1].to_ascii_lowercase();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| decode_entities(m.as_str()).into_owned())
                .unwrap_or_default();
            (name, value)
        })
        .collect()
}

enum OwnSpan {
    Line,
    Ansi(String),
    Error { focused: bool },
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenKind {
    Line,
    Sgr(SpanId),
    Error { focused: bool },
    Search,
    Foreign,
}

/// Recognise the span elements emitted by `to_markup`.
fn own_span_kind(attrs: &[(String, String)]) -> Option<OwnSpan> {
    let class = attrs.iter().find(|(n, _)| n == "class").map(|(_, v)| v)?;
    let has = |c: &str| class.split_whitespace().any(|t| t == c);
    if has(CLASS_LINE) {
        Some(OwnSpan::Line)
    } else if has(CLASS_ANSI) {
        let css = attrs
            .iter()
            .find(|(n, _)| n == "style")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        Some(OwnSpan::Ansi(css))
    } else if has(CLASS_ERROR) {
        Some(OwnSpan::Error {
            focused: has(CLASS_ERROR_HIGHLIGHT),
        })
    } else if has(CLASS_SEARCH_MATCH) {
        Some(OwnSpan::Search)
    } else {
        None
    }
}

// =============================================================================
// Entities
// =============================================================================

/// Decode the character references that appear in serialised text nodes.
/// Unknown references are kept literally.
pub fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi > 0 && semi <= 10)
            .and_then(|semi| decode_reference(&after[..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => None,
    }
}

/// Escape text for inclusion in element content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_text_into(&mut out, s);
    out
}

fn escape_text_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Escape text for inclusion in a double-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_attr_into(&mut out, s);
    out
}

fn escape_attr_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

// =============================================================================
// Unit tests
// =============================================================================
