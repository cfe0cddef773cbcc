// LogLens - app/messaging.rs
//
// Message shapes exchanged between the page side, the settings surface and
// the background service, plus the background service itself.
//
// Every message is JSON with an `action` tag. Responses are untagged: a
// `getConfig` reply is the bare config object.

use crate::app::store::{ConfigStore, StoreData};
use crate::core::model::Config;
use crate::util::error::StoreError;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Requests answered by the background service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetConfig,
    SaveConfig { config: Config },
    CheckProStatus,
    ActivatePro { config: Config },
}

/// Replies to a `Request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Config(Config),
    Saved {
        success: bool,
    },
    ProStatus {
        #[serde(rename = "isPro")]
        is_pro: bool,
    },
}

/// One-way messages delivered to the page side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Notification {
    ConfigUpdated { config: Config },
    EnhanceLogs,
    CopyLogs,
}

/// Page context-menu entries and the notification each one sends.
pub const MENU_ITEMS: &[(&str, &str)] = &[
    ("loglens-enhance-page", "Enhance Logs with LogLens"),
    ("loglens-copy-logs", "Copy Enhanced Logs"),
];

/// Map a clicked context-menu id to the notification it sends.
pub fn menu_notification(menu_id: &str) -> Option<Notification> {
    match menu_id {
        "loglens-enhance-page" => Some(Notification::EnhanceLogs),
        "loglens-copy-logs" => Some(Notification::CopyLogs),
        _ => None,
    }
}

// =============================================================================
// Background service
// =============================================================================

/// Answers requests against a config store.
pub struct Background<S: ConfigStore> {
    store: S,
}

impl<S: ConfigStore> Background<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Install-time setup: write the default config unless one is stored.
    ///
    /// Returns true when the defaults were written.
    pub fn install(&mut self) -> Result<bool, StoreError> {
        let mut data = self.store.load()?;
        if data.config.is_some() {
            tracing::debug!("Config already stored; install leaves it untouched");
            return Ok(false);
        }
        data.config = Some(Config::default());
        self.store.save(&data)?;
        tracing::info!("Default config installed");
        Ok(true)
    }

    pub fn handle(&mut self, request: Request) -> Result<Response, StoreError> {
        tracing::debug!(?request, "Background request");
        match request {
            Request::GetConfig => Ok(Response::Config(self.store.load()?.config_or_default())),
            Request::SaveConfig { config } => {
                let mut data = self.store.load()?;
                data.config = Some(config);
                self.store.save(&data)?;
                Ok(Response::Saved { success: true })
            }
            Request::CheckProStatus => Ok(Response::ProStatus {
                is_pro: self.store.load()?.is_pro(),
            }),
            Request::ActivatePro { config } => {
                let data = StoreData {
                    config: Some(Config {
                        pro_features: true,
                        ..config
                    }),
                    pro: true,
                    pro_activated_at: Some(Utc::now()),
                };
                self.store.save(&data)?;
                tracing::info!("Pro activated");
                Ok(Response::Saved { success: true })
            }
        }
    }

    /// Decode a JSON request, handle it and encode the reply.
    pub fn handle_json(&mut self, message: &str) -> Result<String, StoreError> {
        let request: Request =
            serde_json::from_str(message).map_err(|e| StoreError::Serialise { source: e })?;
        let response = self.handle(request)?;
        serde_json::to_string(&response).map_err(|e| StoreError::Serialise { source: e })
    }
}
