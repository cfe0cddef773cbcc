// LogLens - ui/controls.rs
//
// Markup for the controls bar placed before an enhanced block and the
// search box placed after it. Pure functions of a view struct; the app
// layer owns the state and hands the result to the host.

use crate::core::markup::{escape_attr, escape_text};
use crate::core::model::{ElementSpec, Platform, Theme};
use crate::core::stats::BlockStats;
use crate::util::constants::{CLASS_CONTROLS, CLASS_SEARCH_BOX};

/// Everything the controls bar displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlsView<'a> {
    pub platform: Platform,
    pub theme: Theme,
    pub show_search: bool,
    pub show_fold: bool,
    pub show_jump: bool,
    pub folded: bool,
    pub copy_label: &'a str,
    pub stats: BlockStats,
}

/// Theme class carried by every inserted element.
pub fn theme_class(theme: Theme) -> String {
    format!("loglens-theme-{}", theme.label())
}

/// The controls bar element.
pub fn controls_bar(view: &ControlsView<'_>) -> ElementSpec {
    ElementSpec::new("div")
        .class(CLASS_CONTROLS)
        .class(&theme_class(view.theme))
        .attr("data-platform", view.platform.tag())
        .inner(controls_inner(view))
}

/// Inner markup of the controls bar; re-rendered whenever state changes.
pub fn controls_inner(view: &ControlsView<'_>) -> String {
    let mut out = String::from("<div class=\"loglens-controls-inner\">");
    if view.show_search {
        out.push_str(&button("search", "🔍 Search"));
    }
    if view.show_fold {
        let label = if view.folded {
            "📂 Unfold All"
        } else {
            "📁 Fold All"
        };
        out.push_str(&button("fold", label));
    }
    if view.show_jump {
        out.push_str(&button("jump", "⬇ Jump to Error"));
    }
    out.push_str(&button("copy", view.copy_label));
    out.push_str(&format!(
        "<span class=\"loglens-stats\">{}</span></div>",
        escape_text(&view.stats.to_string())
    ));
    out
}

fn button(action: &str, label: &str) -> String {
    format!(
        "<button class=\"loglens-btn\" data-action=\"{action}\">{}</button>",
        escape_text(label)
    )
}

/// The search box element, opened empty.
pub fn search_box(theme: Theme) -> ElementSpec {
    ElementSpec::new("div")
        .class(CLASS_SEARCH_BOX)
        .class(&theme_class(theme))
        .inner(search_box_inner("", None))
}

/// Inner markup of the search box for the current query and match count.
pub fn search_box_inner(query: &str, matches: Option<usize>) -> String {
    let results = match matches {
        None => String::new(),
        Some(0) => "No matches".to_string(),
        Some(1) => "1 match".to_string(),
        Some(n) => format!("{n} matches"),
    };
    format!(
        "<input type=\"text\" placeholder=\"Search logs...\" class=\"loglens-search-input\" \
         value=\"{}\"><button class=\"loglens-search-close\">×</button>\
         <div class=\"loglens-search-results\">{}</div>",
        escape_attr(query),
        escape_text(&results)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> ControlsView<'static> {
        ControlsView {
            platform: Platform::Gitlab,
            theme: Theme::Light,
            show_search: true,
            show_fold: true,
            show_jump: false,
            folded: false,
            copy_label: "📋 Copy",
            stats: BlockStats {
                lines: 3,
                errors: 1,
                warnings: 1,
            },
        }
    }

    #[test]
    fn test_controls_bar_element() {
        let bar = controls_bar(&view());
        assert_eq!(bar.tag, "div");
        assert_eq!(bar.classes, vec!["loglens-controls", "loglens-theme-light"]);
        assert!(bar.attrs.contains(&("data-platform".to_string(), "gitlab".to_string())));
    }

    #[test]
    fn test_hidden_buttons_are_omitted() {
        let inner = controls_inner(&view());
        assert!(inner.contains("data-action=\"search\""));
        assert!(inner.contains("data-action=\"fold\""));
        assert!(!inner.contains("data-action=\"jump\""));
        assert!(inner.contains("data-action=\"copy\""));
        assert!(inner.contains("3 lines • 1 errors • 1 warnings"));
    }

    #[test]
    fn test_fold_label_tracks_state() {
        let mut v = view();
        v.folded = true;
        assert!(controls_inner(&v).contains("Unfold All"));
    }

    #[test]
    fn test_search_box_escapes_query() {
        let inner = search_box_inner("\"<x>\"", Some(2));
        assert!(inner.contains("value=\"&quot;&lt;x&gt;&quot;\""));
        assert!(inner.contains(">2 matches<"));
    }
}
