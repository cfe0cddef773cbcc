// LogLens - tests/e2e_enhance.rs
//
// End-to-end tests for the enhancement pipeline.
//
// A real log fixture is wrapped in the container shape a CI page uses,
// discovered and enhanced through `PageSession` against the in-memory
// document, then driven through its controls. The persistence path uses a
// real JSON store in a temp directory.

use loglens::app::host::{NodeId, PageHost};
use loglens::app::memory::MemoryDocument;
use loglens::app::messaging::{Background, Request, Response};
use loglens::app::page::PageSession;
use loglens::app::store::{ConfigStore, JsonFileStore};
use loglens::core::markup::escape_text;
use loglens::core::model::{Config, ControlAction, ElementSpec};
use loglens::platform::config::AppSettings;
use loglens::util::constants::{CLASS_ANSI, CLASS_ERROR, CLASS_PROCESSED, CLASS_SEARCH_MATCH};
use regex::Regex;
use std::path::PathBuf;
use std::time::{Duration, Instant};

// =============================================================================
// Helpers
// =============================================================================

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn gitlab_log() -> String {
    std::fs::read_to_string(fixture("gitlab_job.log")).unwrap()
}

/// A document with the log inside a GitLab `pre.build-trace`.
fn gitlab_page(log: &str) -> (MemoryDocument, NodeId) {
    let mut doc = MemoryDocument::new();
    let body = doc.append(None, ElementSpec::new("div").class("content"));
    let trace = doc.append(
        Some(body),
        ElementSpec::new("pre")
            .class("build-trace")
            .inner(escape_text(log)),
    );
    (doc, trace)
}

fn started(config: Config) -> (PageSession<MemoryDocument>, NodeId) {
    let (doc, trace) = gitlab_page(&gitlab_log());
    let mut session = PageSession::new(doc, config, false, &AppSettings::default());
    let report = session.start();
    assert_eq!(report.enhanced, vec![trace]);
    (session, trace)
}

fn strip_sgr(text: &str) -> String {
    Regex::new(r"\x1b\[[0-9;]*m")
        .unwrap()
        .replace_all(text, "")
        .into_owned()
}

// =============================================================================
// Enhancement
// =============================================================================

#[test]
fn e2e_fixture_is_enhanced_with_controls_and_stats() {
    let (session, trace) = started(Config::default());
    let doc = session.enhancer().host();

    let markup = doc.inner_markup(trace).unwrap();
    assert!(markup.contains(&format!(
        "<span class=\"{CLASS_ANSI}\" style=\"color: #00ff00; font-weight: bold\">"
    )));
    assert!(markup.contains(CLASS_ERROR));
    assert!(!markup.contains("\u{1b}[31m"), "SGR sequences are consumed");

    let bar = doc.previous_sibling(trace).unwrap();
    assert_eq!(session.enhancer().block(trace).unwrap().controls(), Some(bar));
    assert!(doc
        .inner_markup(bar)
        .unwrap()
        .contains("10 lines • 2 errors • 1 warnings"));
}

#[test]
fn e2e_enhancement_preserves_text() {
    let (session, trace) = started(Config::default());
    assert_eq!(
        session.enhancer().host().text_content(trace).unwrap(),
        strip_sgr(&gitlab_log())
    );
}

#[test]
fn e2e_enhanced_markup_is_stable_under_reapplication() {
    let (session, trace) = started(Config::default());
    let enhanced = session.enhancer().host().inner_markup(trace).unwrap();

    let mut doc = MemoryDocument::new();
    let copy = doc.append(None, ElementSpec::new("div").class("job-log").inner(enhanced.as_str()));
    let mut again = PageSession::new(doc, Config::default(), false, &AppSettings::default());
    let report = again.start();
    assert_eq!(report.candidates, 1);
    assert_eq!(report.unchanged, 1, "nothing left to render or highlight");
    assert_eq!(again.enhancer().host().inner_markup(copy).unwrap(), enhanced);
}

#[test]
fn e2e_repeated_scans_never_reenhance() {
    let (mut session, trace) = started(Config::default());
    let t0 = Instant::now();
    session
        .enhancer_mut()
        .host_mut()
        .append(None, ElementSpec::new("p").inner("unrelated"));
    session.on_content_changed(t0, 1);
    let report = session.tick(t0 + Duration::from_secs(1)).unwrap();
    assert_eq!(report.candidates, 0);
    assert!(session.enhancer().host().has_class(trace, CLASS_PROCESSED));
    assert_eq!(session.enhancer().enhanced_count(), 1);
}

// =============================================================================
// Controls
// =============================================================================

#[test]
fn e2e_search_jump_and_copy() {
    let (mut session, trace) = started(Config::default());
    let t0 = Instant::now();

    session.on_control(trace, ControlAction::Search, t0).unwrap();
    session
        .on_control(trace, ControlAction::SearchInput("CARGO".into()), t0)
        .unwrap();
    let block = session.enhancer().block(trace).unwrap();
    assert_eq!(block.search_matches(), Some(2));
    let search_box = block.search_box().unwrap();
    let doc = session.enhancer().host();
    assert_eq!(doc.inner_markup(trace).unwrap().matches(CLASS_SEARCH_MATCH).count(), 2);
    assert!(doc.inner_markup(search_box).unwrap().contains("2 matches"));

    session.on_control(trace, ControlAction::SearchClose, t0).unwrap();
    assert!(!session
        .enhancer()
        .host()
        .inner_markup(trace)
        .unwrap()
        .contains(CLASS_SEARCH_MATCH));

    session.on_control(trace, ControlAction::Jump, t0).unwrap();
    assert_eq!(session.enhancer().host().scrolls(), &[trace]);
    assert_eq!(session.next_deadline(), Some(t0 + Duration::from_secs(2)));

    session.on_control(trace, ControlAction::Copy, t0).unwrap();
    assert_eq!(
        session.enhancer().host().clipboard().map(str::to_string),
        Some(strip_sgr(&gitlab_log()))
    );

    session.tick(t0 + Duration::from_secs(2));
    let block = session.enhancer().block(trace).unwrap();
    assert!(!block.is_error_highlighted());
    assert_eq!(session.next_deadline(), None);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn e2e_stored_config_drives_enhancement() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let mut background = Background::new(JsonFileStore::new(&path));
    assert!(background.install().unwrap());
    background
        .handle(Request::SaveConfig {
            config: Config {
                ansi_colors: false,
                ..Config::default()
            },
        })
        .unwrap();
    assert_eq!(
        background.handle(Request::CheckProStatus).unwrap(),
        Response::ProStatus { is_pro: false }
    );

    let data = JsonFileStore::new(&path).load().unwrap();
    let (session, trace) = started(data.config_or_default());
    let markup = session.enhancer().host().inner_markup(trace).unwrap();
    assert!(!markup.contains(CLASS_ANSI));
    assert!(markup.contains(CLASS_ERROR));
    assert!(markup.contains("\u{1b}[31m"), "escapes stay when colours are off");
}
