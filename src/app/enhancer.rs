// LogLens - app/enhancer.rs
//
// Container enhancer: discovers log blocks through the host, renders their
// escape sequences and error markers, and owns the per-block controls state
// (search, fold, jump-to-error, copy, stats).
//
// Architecture:
//   - One `Enhancer` per page, constructed with an injected config snapshot
//     and host. No global state.
//   - Each block's content is parsed once into a `StyledText`; every later
//     action mutates that model and re-serialises it into the host node.
//   - Transient feedback (jump highlight, copy label) expires in `tick`,
//     driven by caller-supplied time.
//
// Nothing here is fatal to the page: a vanished node is skipped with a
// warning, a rejected clipboard write becomes a visible label.

use crate::app::host::{NodeId, PageHost};
use crate::core::detect::{looks_like_log, selectors_for};
use crate::core::highlight::highlight_errors;
use crate::core::markup::{SerializeOptions, StyledText};
use crate::core::model::{Config, ControlAction, Platform};
use crate::core::search::{apply_search, clear_search};
use crate::core::sgr::render_escapes;
use crate::core::stats::BlockStats;
use crate::ui::controls::{self, ControlsView};
use crate::util::constants::{
    CLASS_ERROR, CLASS_PROCESSED, COPY_FEEDBACK_MS, DEFAULT_GENERIC_MIN_CHARS, ERROR_HIGHLIGHT_MS,
    LABEL_COPIED, LABEL_COPY, LABEL_COPY_FAILED,
};
use crate::util::error::{HostError, Result};
use crate::util::logging::preview;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

// =============================================================================
// Block state
// =============================================================================

/// Enhancer-side state of one enhanced block.
#[derive(Debug, Clone)]
pub struct BlockState {
    platform: Platform,
    text: StyledText,
    /// Config snapshot in force when the block was enhanced.
    config: Config,
    stats: BlockStats,
    controls: Option<NodeId>,
    search_box: Option<NodeId>,
    search_query: String,
    search_matches: Option<usize>,
    folded: bool,
    copy_label: &'static str,
    copy_until: Option<Instant>,
    highlight_until: Option<Instant>,
}

impl BlockState {
    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn text(&self) -> &StyledText {
        &self.text
    }

    pub fn stats(&self) -> BlockStats {
        self.stats
    }

    pub fn controls(&self) -> Option<NodeId> {
        self.controls
    }

    pub fn search_box(&self) -> Option<NodeId> {
        self.search_box
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Match count of the current query; `None` while the query is blank.
    pub fn search_matches(&self) -> Option<usize> {
        self.search_matches
    }

    pub fn is_folded(&self) -> bool {
        self.folded
    }

    pub fn copy_label(&self) -> &'static str {
        self.copy_label
    }

    /// True while the jump-to-error highlight is showing.
    pub fn is_error_highlighted(&self) -> bool {
        self.highlight_until.is_some()
    }

    fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            lines: self.config.fold_enabled,
            folded: self.folded,
        }
    }

    fn view(&self) -> ControlsView<'_> {
        ControlsView {
            platform: self.platform,
            theme: self.config.theme,
            show_search: self.config.search_enabled,
            show_fold: self.config.fold_enabled,
            show_jump: self.config.jump_to_failure,
            folded: self.folded,
            copy_label: self.copy_label,
            stats: self.stats,
        }
    }
}

/// Outcome of one discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Unprocessed nodes accepted as log blocks (and now marked processed).
    pub candidates: usize,
    /// Blocks whose content changed and received controls.
    pub enhanced: Vec<NodeId>,
    /// Candidates with nothing to render or highlight.
    pub unchanged: usize,
    /// Candidates the host failed to update.
    pub failed: usize,
    /// Enhanced blocks whose node had left the document.
    pub dropped: usize,
}

// =============================================================================
// Enhancer
// =============================================================================

pub struct Enhancer<H: PageHost> {
    host: H,
    config: Config,
    is_pro: bool,
    generic_min_chars: usize,
    blocks: BTreeMap<NodeId, BlockState>,
}

impl<H: PageHost> Enhancer<H> {
    pub fn new(host: H, config: Config) -> Self {
        Self {
            host,
            config,
            is_pro: false,
            generic_min_chars: DEFAULT_GENERIC_MIN_CHARS,
            blocks: BTreeMap::new(),
        }
    }

    /// Override the minimum text length for generic `pre`/`code` detection.
    pub fn with_generic_min_chars(mut self, min_chars: usize) -> Self {
        self.generic_min_chars = min_chars;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the config snapshot. Already-enhanced blocks keep the
    /// snapshot they were enhanced with; new blocks use this one.
    pub fn update_config(&mut self, config: Config) {
        tracing::debug!(?config, "Config snapshot replaced");
        self.config = config;
    }

    pub fn set_pro(&mut self, is_pro: bool) {
        self.is_pro = is_pro;
    }

    /// Pro entitlement: the stored flag or the config mirror.
    pub fn is_pro(&self) -> bool {
        self.is_pro || self.config.pro_features
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn block(&self, node: NodeId) -> Option<&BlockState> {
        self.blocks.get(&node)
    }

    /// Enhanced blocks in node order.
    pub fn blocks(&self) -> impl Iterator<Item = (NodeId, &BlockState)> {
        self.blocks.iter().map(|(n, s)| (*n, s))
    }

    pub fn enhanced_count(&self) -> usize {
        self.blocks.len()
    }

    // -------------------------------------------------------------------------
    // Discovery
    // -------------------------------------------------------------------------

    /// Run one discovery pass over the host document.
    ///
    /// Every accepted candidate is marked processed before it is enhanced,
    /// so later passes never touch it again. State of blocks that left the
    /// document is dropped first.
    pub fn scan(&mut self) -> ScanReport {
        let mut report = ScanReport {
            dropped: self.prune_detached(),
            ..ScanReport::default()
        };

        for &platform in Platform::all() {
            for selector in selectors_for(platform) {
                for node in self.host.select(selector) {
                    if self.host.has_class(node, CLASS_PROCESSED) {
                        continue;
                    }
                    if platform == Platform::Generic {
                        let text = self.host.text_content(node).unwrap_or_default();
                        if !looks_like_log(&text, self.generic_min_chars) {
                            continue;
                        }
                    }

                    report.candidates += 1;
                    if let Err(e) = self.host.add_class(node, CLASS_PROCESSED) {
                        tracing::warn!(node = %node, error = %e, "Cannot mark block processed");
                        report.failed += 1;
                        continue;
                    }
                    tracing::trace!(node = %node, selector = %selector, "Candidate block");

                    match self.enhance_block(node, platform) {
                        Ok(true) => report.enhanced.push(node),
                        Ok(false) => report.unchanged += 1,
                        Err(e) => {
                            tracing::warn!(node = %node, error = %e, "Block enhancement failed");
                            report.failed += 1;
                        }
                    }
                }
            }
        }

        tracing::debug!(
            candidates = report.candidates,
            enhanced = report.enhanced.len(),
            unchanged = report.unchanged,
            failed = report.failed,
            dropped = report.dropped,
            "Discovery pass complete"
        );
        report
    }

    /// Transform one block and attach its controls.
    ///
    /// Returns `Ok(false)` when neither transform changed anything; no
    /// controls are attached in that case.
    pub fn enhance_block(&mut self, node: NodeId, platform: Platform) -> Result<bool> {
        let markup = self
            .host
            .inner_markup(node)
            .ok_or(HostError::NodeMissing { node: node.0 })?;
        let mut text = StyledText::parse(&markup);

        let mut changed = false;
        if self.config.ansi_colors {
            changed |= render_escapes(&mut text);
        }
        if self.config.error_highlighting {
            changed |= highlight_errors(&mut text);
        }
        if !changed {
            tracing::debug!(node = %node, platform = %platform, "Nothing to enhance");
            return Ok(false);
        }

        let plain = text.plain_text();
        tracing::debug!(node = %node, text = preview(&plain), "Enhancing block");

        let mut state = BlockState {
            platform,
            stats: BlockStats::compute(&plain),
            text,
            config: self.config.clone(),
            controls: None,
            search_box: None,
            search_query: String::new(),
            search_matches: None,
            folded: false,
            copy_label: LABEL_COPY,
            copy_until: None,
            highlight_until: None,
        };

        self.host
            .set_inner_markup(node, &state.text.to_markup(&state.serialize_options()))?;
        state.controls = Some(
            self.host
                .insert_before(node, controls::controls_bar(&state.view()))?,
        );

        tracing::info!(
            node = %node,
            platform = %platform,
            lines = state.stats.lines,
            errors = state.stats.errors,
            warnings = state.stats.warnings,
            "Log block enhanced"
        );
        self.blocks.insert(node, state);
        Ok(true)
    }

    // -------------------------------------------------------------------------
    // Controls
    // -------------------------------------------------------------------------

    /// Drop the state of enhanced blocks whose node the host no longer
    /// resolves, along with their controls bar and search box.
    ///
    /// Returns the number of blocks dropped.
    pub fn prune_detached(&mut self) -> usize {
        let detached: Vec<NodeId> = self
            .blocks
            .keys()
            .filter(|n| self.host.inner_markup(**n).is_none())
            .copied()
            .collect();
        for node in &detached {
            self.drop_block(*node);
        }
        detached.len()
    }

    fn drop_block(&mut self, node: NodeId) {
        if let Some(state) = self.blocks.remove(&node) {
            for element in [state.controls, state.search_box].into_iter().flatten() {
                self.host.remove(element);
            }
            tracing::debug!(node = %node, "Block left the document; state dropped");
        }
    }

    /// Handle a controls-bar or search-box action for an enhanced block.
    ///
    /// Fails with `HostError::NodeMissing` when the block is unknown or its
    /// node has left the document.
    pub fn handle_action(&mut self, node: NodeId, action: ControlAction, now: Instant) -> Result<()> {
        if self.blocks.contains_key(&node) && self.host.inner_markup(node).is_none() {
            self.drop_block(node);
        }
        let host = &mut self.host;
        let state = self
            .blocks
            .get_mut(&node)
            .ok_or(HostError::NodeMissing { node: node.0 })?;
        tracing::debug!(node = %node, ?action, "Control action");

        match action {
            ControlAction::Search => {
                if !state.config.search_enabled || state.search_box.is_some() {
                    return Ok(());
                }
                state.search_box =
                    Some(host.insert_after(node, controls::search_box(state.config.theme))?);
            }
            ControlAction::SearchInput(query) => {
                let count = apply_search(&mut state.text, &query)?;
                state.search_matches = (!query.trim().is_empty()).then_some(count);
                state.search_query = query;
                render_block(host, node, state)?;
                render_search_box(host, state)?;
            }
            ControlAction::SearchClose => {
                clear_search(&mut state.text);
                state.search_query.clear();
                state.search_matches = None;
                if let Some(search_box) = state.search_box.take() {
                    host.remove(search_box);
                }
                render_block(host, node, state)?;
            }
            ControlAction::Fold => {
                if !state.config.fold_enabled {
                    return Ok(());
                }
                state.folded = !state.folded;
                render_block(host, node, state)?;
                render_controls(host, state)?;
            }
            ControlAction::Jump => {
                if !state.config.jump_to_failure {
                    return Ok(());
                }
                if !state.text.focus_first_error() {
                    tracing::debug!(node = %node, "No error marker to jump to");
                    return Ok(());
                }
                render_block(host, node, state)?;
                host.scroll_into_view(node, CLASS_ERROR);
                state.highlight_until = Some(now + Duration::from_millis(ERROR_HIGHLIGHT_MS));
            }
            ControlAction::Copy => {
                let text = host
                    .text_content(node)
                    .ok_or(HostError::NodeMissing { node: node.0 })?;
                state.copy_label = match host.write_clipboard(&text) {
                    Ok(()) => LABEL_COPIED,
                    Err(e) => {
                        tracing::warn!(node = %node, error = %e, "Copy to clipboard failed");
                        LABEL_COPY_FAILED
                    }
                };
                state.copy_until = Some(now + Duration::from_millis(COPY_FEEDBACK_MS));
                render_controls(host, state)?;
            }
        }
        Ok(())
    }

    /// Expire transient feedback whose time has come.
    ///
    /// Returns the number of blocks that were re-rendered.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.prune_detached();
        let mut touched = 0;
        for (node, state) in self.blocks.iter_mut() {
            let mut dirty = false;
            if state.highlight_until.is_some_and(|t| now >= t) {
                state.highlight_until = None;
                state.text.clear_focus();
                if let Err(e) = render_block(&mut self.host, *node, state) {
                    tracing::warn!(node = %node, error = %e, "Cannot clear error highlight");
                }
                dirty = true;
            }
            if state.copy_until.is_some_and(|t| now >= t) {
                state.copy_until = None;
                state.copy_label = LABEL_COPY;
                if let Err(e) = render_controls(&mut self.host, state) {
                    tracing::warn!(node = %node, error = %e, "Cannot reset copy label");
                }
                dirty = true;
            }
            if dirty {
                touched += 1;
            }
        }
        touched
    }

    /// Earliest pending feedback expiry, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.blocks
            .values()
            .flat_map(|s| [s.highlight_until, s.copy_until])
            .flatten()
            .min()
    }

    /// Copy the plain text of every enhanced block, separated by a blank
    /// line. Pro only; returns `Ok(false)` without Pro.
    pub fn copy_all(&mut self) -> Result<bool> {
        if !self.is_pro() {
            tracing::info!("Copy all logs requires Pro");
            return Ok(false);
        }
        self.prune_detached();
        let texts: Vec<String> = self
            .blocks
            .keys()
            .filter_map(|node| self.host.text_content(*node))
            .collect();
        self.host.write_clipboard(&texts.join("\n\n"))?;
        tracing::info!(blocks = texts.len(), "Copied all logs");
        Ok(true)
    }
}

fn render_block<H: PageHost>(host: &mut H, node: NodeId, state: &BlockState) -> Result<()> {
    host.set_inner_markup(node, &state.text.to_markup(&state.serialize_options()))?;
    Ok(())
}

fn render_controls<H: PageHost>(host: &mut H, state: &BlockState) -> Result<()> {
    if let Some(bar) = state.controls {
        host.set_inner_markup(bar, &controls::controls_inner(&state.view()))?;
    }
    Ok(())
}

fn render_search_box<H: PageHost>(host: &mut H, state: &BlockState) -> Result<()> {
    if let Some(search_box) = state.search_box {
        host.set_inner_markup(
            search_box,
            &controls::search_box_inner(&state.search_query, state.search_matches),
        )?;
    }
    Ok(())
}
