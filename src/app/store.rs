// LogLens - app/store.rs
//
// Persistence collaborator for the user config record and the Pro flag.
//
// Design:
//   - One JSON document holds everything, keyed the way the page-side
//     storage names its records (`loglensConfig`, `loglensPro`).
//   - Writes are atomic (write temp -> rename) via platform::fs.
//   - A missing store file is a normal first run and loads as empty.
//   - Missing fields in a stored config take their defaults at load time.

use crate::core::model::Config;
use crate::platform::fs::write_atomic;
use crate::util::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything persisted by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreData {
    /// Stored config record; `None` until the first save.
    #[serde(rename = "loglensConfig", skip_serializing_if = "Option::is_none")]
    pub config: Option<Config>,

    /// Pro entitlement flag.
    #[serde(rename = "loglensPro")]
    pub pro: bool,

    /// When Pro was activated (RFC 3339).
    #[serde(rename = "proActivatedAt", skip_serializing_if = "Option::is_none")]
    pub pro_activated_at: Option<DateTime<Utc>>,
}

impl StoreData {
    /// The stored config, or defaults when none has been saved.
    pub fn config_or_default(&self) -> Config {
        self.config.clone().unwrap_or_default()
    }

    /// Pro entitlement: the stored flag or the config mirror.
    pub fn is_pro(&self) -> bool {
        self.pro || self.config.as_ref().is_some_and(|c| c.pro_features)
    }
}

/// Read/write access to the persisted record.
pub trait ConfigStore {
    fn load(&self) -> Result<StoreData, StoreError>;
    fn save(&mut self, data: &StoreData) -> Result<(), StoreError>;
}

// =============================================================================
// JSON file store
// =============================================================================

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonFileStore {
    fn load(&self) -> Result<StoreData, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No store file; starting empty");
                return Ok(StoreData::default());
            }
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };
        let data = serde_json::from_str(&content).map_err(|e| StoreError::Json {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), "Store loaded");
        Ok(data)
    }

    fn save(&mut self, data: &StoreData) -> Result<(), StoreError> {
        let json =
            serde_json::to_string_pretty(data).map_err(|e| StoreError::Serialise { source: e })?;
        write_atomic(&self.path, json.as_bytes()).map_err(|e| StoreError::Io {
            path: self.path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %self.path.display(), "Store saved");
        Ok(())
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Store kept in memory; used by tests and ephemeral hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: StoreData,
}

impl MemoryStore {
    pub fn new(data: StoreData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }
}

impl ConfigStore for MemoryStore {
    fn load(&self) -> Result<StoreData, StoreError> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &StoreData) -> Result<(), StoreError> {
        self.data = data.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Theme;
    use chrono::TimeZone;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("storage.json"));
        let data = store.load().unwrap();
        assert_eq!(data, StoreData::default());
        assert_eq!(data.config_or_default(), Config::default());
        assert!(!data.is_pro());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("sub").join("storage.json"));
        let data = StoreData {
            config: Some(Config {
                theme: Theme::Light,
                ..Config::default()
            }),
            pro: true,
            pro_activated_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
        };
        store.save(&data).unwrap();
        assert_eq!(store.load().unwrap(), data);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"loglensConfig\""));
        assert!(raw.contains("\"loglensPro\": true"));
        assert!(raw.contains("\"proActivatedAt\": \"2026-03-01T12:00:00Z\""));
    }

    #[test]
    fn test_partial_record_takes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, r#"{"loglensConfig": {"foldEnabled": false}}"#).unwrap();
        let data = JsonFileStore::new(&path).load().unwrap();
        let config = data.config_or_default();
        assert!(!config.fold_enabled);
        assert!(config.ansi_colors);
        assert!(!data.pro);
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::new(&path).load(),
            Err(StoreError::Json { .. })
        ));
    }

    #[test]
    fn test_pro_via_config_mirror() {
        let data = StoreData {
            config: Some(Config {
                pro_features: true,
                ..Config::default()
            }),
            ..StoreData::default()
        };
        assert!(data.is_pro());
    }
}
