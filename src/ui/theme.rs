// LogLens - ui/theme.rs
//
// Colour palettes and the stylesheet for the injected controls, markers and
// line elements. No dependencies on app state or business logic.

use crate::core::markup::escape_text;
use crate::core::model::Theme;
use crate::util::constants::{
    CLASS_CONTROLS, CLASS_ERROR, CLASS_ERROR_HIGHLIGHT, CLASS_FOLDED, CLASS_LINE,
    CLASS_SEARCH_BOX, CLASS_SEARCH_MATCH,
};

/// Colours used by one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bar_bg: &'static str,
    pub bar_text: &'static str,
    pub button_bg: &'static str,
    pub button_border: &'static str,
    pub log_bg: &'static str,
    pub log_text: &'static str,
    pub error_bg: &'static str,
    pub error_highlight: &'static str,
    pub search_match: &'static str,
}

pub const DEFAULT_PALETTE: Palette = Palette {
    bar_bg: "#1f2937",        // Gray 800
    bar_text: "#d1d5db",      // Gray 300
    button_bg: "#374151",     // Gray 700
    button_border: "#4b5563", // Gray 600
    log_bg: "#111827",        // Gray 900
    log_text: "#e5e7eb",      // Gray 200
    error_bg: "rgba(220, 38, 38, 0.25)",
    error_highlight: "#dc2626", // Red 600
    search_match: "#fde047",    // Yellow 300
};

pub const LIGHT_PALETTE: Palette = Palette {
    bar_bg: "#f3f4f6",
    bar_text: "#1f2937",
    button_bg: "#ffffff",
    button_border: "#d1d5db",
    log_bg: "#ffffff",
    log_text: "#111827",
    error_bg: "rgba(220, 38, 38, 0.12)",
    error_highlight: "#b91c1c",
    search_match: "#facc15",
};

pub fn palette(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Default => &DEFAULT_PALETTE,
        Theme::Light => &LIGHT_PALETTE,
    }
}

/// Folded lines collapse to this height.
pub const FOLDED_LINE_HEIGHT: &str = "0";

/// Stylesheet for every LogLens element under `theme`.
pub fn stylesheet(theme: Theme) -> String {
    let p = palette(theme);
    format!(
        "pre, code {{ background: {log_bg}; color: {log_text}; }}\n\
         .{CLASS_CONTROLS} {{ display: flex; padding: 4px 8px; background: {bar_bg}; color: {bar_text}; font: 12px sans-serif; }}\n\
         .{CLASS_CONTROLS} .loglens-btn {{ margin-right: 6px; background: {button_bg}; color: {bar_text}; border: 1px solid {button_border}; border-radius: 4px; cursor: pointer; }}\n\
         .{CLASS_CONTROLS} .loglens-stats {{ margin-left: auto; opacity: 0.8; }}\n\
         .{CLASS_SEARCH_BOX} {{ display: flex; gap: 6px; padding: 4px 8px; background: {bar_bg}; color: {bar_text}; }}\n\
         .{CLASS_ERROR} {{ background: {error_bg}; }}\n\
         .{CLASS_ERROR_HIGHLIGHT} {{ outline: 2px solid {error_highlight}; }}\n\
         .{CLASS_SEARCH_MATCH} {{ background: {search_match}; color: #000; }}\n\
         .{CLASS_LINE} {{ display: block; }}\n\
         .{CLASS_LINE}.{CLASS_FOLDED} {{ height: {FOLDED_LINE_HEIGHT}; overflow: hidden; }}\n",
        log_bg = p.log_bg,
        log_text = p.log_text,
        bar_bg = p.bar_bg,
        bar_text = p.bar_text,
        button_bg = p.button_bg,
        button_border = p.button_border,
        error_bg = p.error_bg,
        error_highlight = p.error_highlight,
        search_match = p.search_match,
    )
}

/// Wrap rendered body markup in a standalone page carrying the stylesheet.
pub fn page_document(title: &str, theme: Theme, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>\n{}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape_text(title),
        stylesheet(theme)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_uses_theme_palette() {
        let dark = stylesheet(Theme::Default);
        let light = stylesheet(Theme::Light);
        assert!(dark.contains(DEFAULT_PALETTE.bar_bg));
        assert!(light.contains(LIGHT_PALETTE.bar_bg));
        assert!(light.contains(".loglens-line.loglens-folded"));
    }

    #[test]
    fn test_page_document_escapes_title() {
        let page = page_document("a<b>.log", Theme::Default, "<pre>x</pre>");
        assert!(page.contains("<title>a&lt;b&gt;.log</title>"));
        assert!(page.contains("<pre>x</pre>"));
    }
}
