// LogLens - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no host,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::error::ConfigError;
use serde::{Deserialize, Serialize};

// =============================================================================
// Platform
// =============================================================================

/// CI/CD source a log block was discovered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Github,
    Gitlab,
    Jenkins,
    Generic,
}

impl Platform {
    /// All platforms in discovery order. `Generic` is always tried last.
    pub fn all() -> &'static [Platform] {
        &[
            Platform::Github,
            Platform::Gitlab,
            Platform::Jenkins,
            Platform::Generic,
        ]
    }

    /// Lowercase tag used in markup attributes and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Platform::Github => "github",
            Platform::Gitlab => "gitlab",
            Platform::Jenkins => "jenkins",
            Platform::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "github" => Ok(Platform::Github),
            "gitlab" => Ok(Platform::Gitlab),
            "jenkins" => Ok(Platform::Jenkins),
            "generic" => Ok(Platform::Generic),
            other => Err(format!(
                "unknown platform '{other}' (expected github, gitlab, jenkins or generic)"
            )),
        }
    }
}

// =============================================================================
// Theme
// =============================================================================

/// Visual theme of the injected controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Light,
}

impl Theme {
    pub fn label(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Light => "light",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// User configuration
// =============================================================================

/// User configuration snapshot.
///
/// Owned by the persistence collaborator; the enhancer only reads it.
/// Every field has a default so a partial stored record deserialises into a
/// complete snapshot at load time, never per call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Render terminal SGR escape sequences as styled spans.
    pub ansi_colors: bool,
    /// Offer the in-block search box.
    pub search_enabled: bool,
    /// Segment enhanced blocks into lines and offer fold/unfold.
    pub fold_enabled: bool,
    /// Mark error-like text.
    pub error_highlighting: bool,
    /// Offer the jump-to-first-error button.
    pub jump_to_failure: bool,
    /// Controls theme.
    pub theme: Theme,
    /// Pro entitlement mirrored into the config record.
    pub pro_features: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ansi_colors: true,
            search_enabled: true,
            fold_enabled: true,
            error_highlighting: true,
            jump_to_failure: true,
            theme: Theme::Default,
            pro_features: false,
        }
    }
}

impl Config {
    /// Field names accepted by `set_field`, as stored.
    pub const FIELDS: &'static [&'static str] = &[
        "ansiColors",
        "searchEnabled",
        "foldEnabled",
        "errorHighlighting",
        "jumpToFailure",
        "theme",
        "proFeatures",
    ];

    /// Set one field from its stored name and a textual value.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ConfigError> {
        if field == "theme" {
            self.theme = match value.to_lowercase().as_str() {
                "default" => Theme::Default,
                "light" => Theme::Light,
                _ => {
                    return Err(ConfigError::ValueOutOfRange {
                        field: field.to_string(),
                        value: value.to_string(),
                        expected: "\"default\" or \"light\"".to_string(),
                    })
                }
            };
            return Ok(());
        }

        let slot = match field {
            "ansiColors" => &mut self.ansi_colors,
            "searchEnabled" => &mut self.search_enabled,
            "foldEnabled" => &mut self.fold_enabled,
            "errorHighlighting" => &mut self.error_highlighting,
            "jumpToFailure" => &mut self.jump_to_failure,
            "proFeatures" => &mut self.pro_features,
            _ => {
                return Err(ConfigError::UnknownField {
                    field: field.to_string(),
                })
            }
        };
        *slot = match value.to_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => true,
            "false" | "off" | "no" | "0" => false,
            _ => {
                return Err(ConfigError::ValueOutOfRange {
                    field: field.to_string(),
                    value: value.to_string(),
                    expected: "true or false".to_string(),
                })
            }
        };
        Ok(())
    }
}

// =============================================================================
// Host elements
// =============================================================================

/// Description of an element the enhancer asks the host to insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementSpec {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    /// Inner markup.
    pub inner: String,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn inner(mut self, markup: impl Into<String>) -> Self {
        self.inner = markup.into();
        self
    }
}

// =============================================================================
// Controls
// =============================================================================

/// Actions exposed by a block's controls bar and search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlAction {
    /// Open the inline search box.
    Search,
    /// Toggle the folded state of the block's lines.
    Fold,
    /// Scroll to the first error marker and highlight it briefly.
    Jump,
    /// Copy the block's plain text to the clipboard.
    Copy,
    /// The search box input changed.
    SearchInput(String),
    /// The search box was closed.
    SearchClose,
}

impl ControlAction {
    /// Parse the `data-action` value carried by a controls-bar button.
    pub fn from_button(action: &str) -> Option<Self> {
        match action {
            "search" => Some(Self::Search),
            "fold" => Some(Self::Fold),
            "jump" => Some(Self::Jump),
            "copy" => Some(Self::Copy),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let c = Config::default();
        assert!(c.ansi_colors && c.search_enabled && c.fold_enabled);
        assert!(c.error_highlighting && c.jump_to_failure);
        assert_eq!(c.theme, Theme::Default);
        assert!(!c.pro_features);
    }

    #[test]
    fn test_config_partial_record_fills_defaults() {
        let c: Config = serde_json::from_str(r#"{"ansiColors": false, "theme": "light"}"#).unwrap();
        assert!(!c.ansi_colors);
        assert_eq!(c.theme, Theme::Light);
        assert!(c.error_highlighting, "missing fields take their default");
    }

    #[test]
    fn test_config_serialises_camel_case() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("\"errorHighlighting\":true"));
        assert!(json.contains("\"proFeatures\":false"));
        assert!(json.contains("\"theme\":\"default\""));
    }

    #[test]
    fn test_set_field_parses_booleans_and_theme() {
        let mut c = Config::default();
        c.set_field("foldEnabled", "off").unwrap();
        c.set_field("theme", "LIGHT").unwrap();
        assert!(!c.fold_enabled);
        assert_eq!(c.theme, Theme::Light);
    }

    #[test]
    fn test_set_field_rejects_bad_input() {
        let mut c = Config::default();
        assert!(matches!(
            c.set_field("colour", "true"),
            Err(ConfigError::UnknownField { .. })
        ));
        assert!(matches!(
            c.set_field("ansiColors", "maybe"),
            Err(ConfigError::ValueOutOfRange { .. })
        ));
        assert_eq!(c, Config::default(), "failed edits leave the config untouched");
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("GitLab".parse::<Platform>().unwrap(), Platform::Gitlab);
        assert!("travis".parse::<Platform>().is_err());
    }

    #[test]
    fn test_control_action_from_button() {
        assert_eq!(ControlAction::from_button("jump"), Some(ControlAction::Jump));
        assert_eq!(ControlAction::from_button("explode"), None);
    }
}
