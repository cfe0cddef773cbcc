// LogLens - app/page.rs
//
// Page-integration entry point. Owns one `Enhancer` for the page, turns
// content-changed events into debounced discovery passes, and dispatches
// notifications and control actions.

use crate::app::debounce::Debouncer;
use crate::app::enhancer::{Enhancer, ScanReport};
use crate::app::host::{NodeId, PageHost};
use crate::app::messaging::Notification;
use crate::core::model::{Config, ControlAction};
use crate::platform::config::AppSettings;
use crate::util::error::Result;
use std::time::{Duration, Instant};

pub struct PageSession<H: PageHost> {
    enhancer: Enhancer<H>,
    debouncer: Debouncer,
}

impl<H: PageHost> PageSession<H> {
    /// Build a session from the stored config snapshot and host settings.
    pub fn new(host: H, config: Config, is_pro: bool, settings: &AppSettings) -> Self {
        let mut enhancer =
            Enhancer::new(host, config).with_generic_min_chars(settings.generic_min_chars);
        enhancer.set_pro(is_pro);
        Self {
            enhancer,
            debouncer: Debouncer::new(
                Duration::from_millis(settings.rescan_debounce_ms),
                Duration::from_millis(settings.rescan_max_wait_ms),
            ),
        }
    }

    /// Initial discovery pass over the content present at load.
    pub fn start(&mut self) -> ScanReport {
        tracing::debug!("Page session started");
        self.enhancer.scan()
    }

    /// Record a content-changed event. Events that added no nodes are
    /// ignored; the rest are coalesced until `tick` runs the rescan.
    pub fn on_content_changed(&mut self, now: Instant, added_nodes: usize) {
        if added_nodes == 0 {
            return;
        }
        tracing::trace!(added_nodes, "Content changed");
        self.debouncer.notify(now);
    }

    /// Advance time: run a due rescan and expire transient feedback.
    ///
    /// Returns the rescan report when one ran.
    pub fn tick(&mut self, now: Instant) -> Option<ScanReport> {
        let report = self.debouncer.poll(now).then(|| self.enhancer.scan());
        self.enhancer.tick(now);
        report
    }

    /// Earliest time `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.debouncer.deadline(), self.enhancer.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn on_notification(&mut self, notification: Notification) -> Result<()> {
        match notification {
            Notification::ConfigUpdated { config } => self.enhancer.update_config(config),
            Notification::EnhanceLogs => {
                self.debouncer.cancel();
                let report = self.enhancer.scan();
                tracing::info!(enhanced = report.enhanced.len(), "Forced enhancement pass");
            }
            Notification::CopyLogs => {
                self.enhancer.copy_all()?;
            }
        }
        Ok(())
    }

    pub fn on_control(&mut self, node: NodeId, action: ControlAction, now: Instant) -> Result<()> {
        self.enhancer.handle_action(node, action, now)
    }

    /// Dispatch a controls-bar click by its `data-action` value.
    ///
    /// Returns `Ok(false)` for an action no button carries.
    pub fn on_button(&mut self, node: NodeId, action: &str, now: Instant) -> Result<bool> {
        let Some(action) = ControlAction::from_button(action) else {
            tracing::debug!(node = %node, action, "Unknown button action ignored");
            return Ok(false);
        };
        self.enhancer.handle_action(node, action, now)?;
        Ok(true)
    }

    pub fn enhancer(&self) -> &Enhancer<H> {
        &self.enhancer
    }

    pub fn enhancer_mut(&mut self) -> &mut Enhancer<H> {
        &mut self.enhancer
    }

    pub fn into_host(self) -> H {
        self.enhancer.into_host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::memory::MemoryDocument;
    use crate::core::model::ElementSpec;

    fn session() -> PageSession<MemoryDocument> {
        PageSession::new(
            MemoryDocument::new(),
            Config::default(),
            false,
            &AppSettings::default(),
        )
    }

    fn add_log(s: &mut PageSession<MemoryDocument>, text: &str) -> NodeId {
        s.enhancer_mut()
            .host_mut()
            .append(None, ElementSpec::new("div").class("job-logs").inner(text))
    }

    #[test]
    fn test_burst_triggers_one_rescan() {
        let mut s = session();
        assert_eq!(s.start().candidates, 0);
        let t0 = Instant::now();
        let first = add_log(&mut s, "ERROR: one\n");
        s.on_content_changed(t0, 1);
        let second = add_log(&mut s, "ERROR: two\n");
        s.on_content_changed(t0 + Duration::from_millis(100), 1);

        assert!(s.tick(t0 + Duration::from_millis(200)).is_none());
        let report = s.tick(t0 + Duration::from_millis(350)).unwrap();
        assert_eq!(report.enhanced, vec![first, second]);
        assert!(s.tick(t0 + Duration::from_millis(1000)).is_none());
    }

    #[test]
    fn test_button_clicks_dispatch_by_action_name() {
        let mut s = session();
        let node = add_log(&mut s, "ERROR: one\nok\n");
        s.start();
        let now = Instant::now();

        assert!(s.on_button(node, "fold", now).unwrap());
        assert!(s.enhancer().block(node).unwrap().is_folded());
        assert!(s.on_button(node, "jump", now).unwrap());
        assert_eq!(s.enhancer().host().scrolls(), &[node]);

        assert!(!s.on_button(node, "explode", now).unwrap());
        assert!(s.on_button(NodeId(99), "copy", now).is_err());
    }

    #[test]
    fn test_events_without_added_nodes_are_ignored() {
        let mut s = session();
        s.on_content_changed(Instant::now(), 0);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_enhance_logs_forces_scan() {
        let mut s = session();
        let t0 = Instant::now();
        let node = add_log(&mut s, "FAILED\n");
        s.on_content_changed(t0, 1);
        s.on_notification(Notification::EnhanceLogs).unwrap();
        assert!(s.enhancer().block(node).is_some());
        assert_eq!(s.next_deadline(), None, "pending rescan was served");
    }

    #[test]
    fn test_config_update_notification() {
        let mut s = session();
        let config = Config {
            ansi_colors: false,
            ..Config::default()
        };
        s.on_notification(Notification::ConfigUpdated {
            config: config.clone(),
        })
        .unwrap();
        assert_eq!(s.enhancer().config(), &config);
    }

    #[test]
    fn test_copy_logs_requires_pro() {
        let mut s = session();
        add_log(&mut s, "ERROR: x\n");
        s.start();
        s.on_notification(Notification::CopyLogs).unwrap();
        assert_eq!(s.enhancer().host().clipboard(), None);

        s.enhancer_mut().set_pro(true);
        s.on_notification(Notification::CopyLogs).unwrap();
        assert_eq!(s.enhancer().host().clipboard(), Some("ERROR: x\n"));
    }
}
