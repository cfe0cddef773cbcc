// LogLens - platform/config.rs
//
// Platform-specific directory resolution and config.toml loading with
// startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogLens data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory holding config.toml.
    pub config_dir: PathBuf,

    /// Data directory holding the JSON store.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();
            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );
            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
                data_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of the JSON store.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(constants::STORE_FILE_NAME)
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads in
/// an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub logging: LoggingSection,
    pub enhancer: EnhancerSection,
    pub store: StoreSection,
}

/// `[logging]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// "error", "warn", "info", "debug" or "trace".
    pub level: Option<String>,
}

/// `[enhancer]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct EnhancerSection {
    pub generic_min_chars: Option<usize>,
    pub rescan_debounce_ms: Option<u64>,
    pub rescan_max_wait_ms: Option<u64>,
}

/// `[store]` section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Store file override; empty means the platform default.
    pub file: Option<String>,
}

/// Validated host settings derived from `config.toml`.
///
/// Invalid values produce warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub generic_min_chars: usize,
    pub rescan_debounce_ms: u64,
    pub rescan_max_wait_ms: u64,
    pub store_file: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: None,
            generic_min_chars: constants::DEFAULT_GENERIC_MIN_CHARS,
            rescan_debounce_ms: constants::DEFAULT_RESCAN_DEBOUNCE_MS,
            rescan_max_wait_ms: constants::DEFAULT_RESCAN_MAX_WAIT_MS,
            store_file: None,
        }
    }
}

/// Load and validate `config.toml` from `config_dir`.
///
/// Returns validated settings and a list of non-fatal warnings. A missing
/// file yields defaults with no warnings; an unreadable or unparseable file
/// yields defaults with one warning.
pub fn load_settings(config_dir: &Path) -> (AppSettings, Vec<ConfigError>) {
    let path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<ConfigError> = Vec::new();

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No config.toml found; using defaults");
            return (AppSettings::default(), warnings);
        }
        Err(e) => {
            warnings.push(ConfigError::Io { path, source: e });
            return (AppSettings::default(), warnings);
        }
    };

    let raw: RawSettings = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(ConfigError::TomlParse { path, source: e });
            return (AppSettings::default(), warnings);
        }
    };

    tracing::info!(path = %path.display(), "Loaded config.toml");
    let settings = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }
    (settings, warnings)
}

fn validate(raw: RawSettings, warnings: &mut Vec<ConfigError>) -> AppSettings {
    let mut settings = AppSettings::default();

    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            settings.log_level = Some(level);
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "logging.level".to_string(),
                value: level,
                expected: "error, warn, info, debug or trace".to_string(),
            });
        }
    }

    if let Some(n) = raw.enhancer.generic_min_chars {
        if (constants::MIN_GENERIC_MIN_CHARS..=constants::MAX_GENERIC_MIN_CHARS).contains(&n) {
            settings.generic_min_chars = n;
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "enhancer.generic_min_chars".to_string(),
                value: n.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_GENERIC_MIN_CHARS,
                    constants::MAX_GENERIC_MIN_CHARS
                ),
            });
        }
    }

    if let Some(ms) = raw.enhancer.rescan_debounce_ms {
        if (constants::MIN_RESCAN_DEBOUNCE_MS..=constants::MAX_RESCAN_DEBOUNCE_MS).contains(&ms) {
            settings.rescan_debounce_ms = ms;
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "enhancer.rescan_debounce_ms".to_string(),
                value: ms.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_RESCAN_DEBOUNCE_MS,
                    constants::MAX_RESCAN_DEBOUNCE_MS
                ),
            });
        }
    }

    // The max-wait cap may not be shorter than the quiet period it bounds.
    if let Some(ms) = raw.enhancer.rescan_max_wait_ms {
        if (settings.rescan_debounce_ms..=constants::MAX_RESCAN_MAX_WAIT_MS).contains(&ms) {
            settings.rescan_max_wait_ms = ms;
        } else {
            warnings.push(ConfigError::ValueOutOfRange {
                field: "enhancer.rescan_max_wait_ms".to_string(),
                value: ms.to_string(),
                expected: format!(
                    "{}-{}",
                    settings.rescan_debounce_ms,
                    constants::MAX_RESCAN_MAX_WAIT_MS
                ),
            });
        }
    }

    if let Some(file) = raw.store.file {
        if !file.is_empty() {
            settings.store_file = Some(PathBuf::from(file));
        }
    }

    settings
}
