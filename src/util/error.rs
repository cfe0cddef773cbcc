// LogLens - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.
// The enhancer itself never fails outward: host and search errors are
// turned into "do nothing further" plus a log line at the call site.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogLens operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogLensError {
    /// Reading or writing the persisted configuration failed.
    Store(StoreError),

    /// Host settings could not be loaded or a value was rejected.
    Config(ConfigError),

    /// A search query could not be turned into a matcher.
    Search(SearchError),

    /// A host capability (clipboard, document) refused the request.
    Host(HostError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogLensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(e) => write!(f, "Store error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Search(e) => write!(f, "Search error: {e}"),
            Self::Host(e) => write!(f, "Host error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogLensError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Search(e) => Some(e),
            Self::Host(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// Errors related to the persisted configuration store.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error reading or writing the store file.
    Io { path: PathBuf, source: io::Error },

    /// The store file exists but is not valid JSON of the expected shape.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A record or message could not be serialised or decoded.
    Serialise { source: serde_json::Error },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Store I/O error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "Store file '{}' is malformed: {source}", path.display())
            }
            Self::Serialise { source } => write!(f, "Failed to encode or decode record: {source}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Serialise { source } => Some(source),
        }
    }
}

impl From<StoreError> for LogLensError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to host settings and configuration edits.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// A configuration field name is not recognised.
    UnknownField { field: String },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::UnknownField { field } => write!(f, "Unknown config field '{field}'"),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogLensError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Search errors
// ---------------------------------------------------------------------------

/// Errors related to live search.
#[derive(Debug)]
pub enum SearchError {
    /// The escaped query still failed to compile (e.g. exceeded size limits).
    InvalidPattern { query: String, source: regex::Error },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { query, source } => {
                write!(f, "Cannot search for '{query}': {source}")
            }
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
        }
    }
}

impl From<SearchError> for LogLensError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

// ---------------------------------------------------------------------------
// Host errors
// ---------------------------------------------------------------------------

/// Errors reported by the host environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The clipboard write was rejected (permissions, focus, unsupported).
    ClipboardRejected { reason: String },

    /// The referenced node no longer exists in the document.
    NodeMissing { node: usize },
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClipboardRejected { reason } => write!(f, "Clipboard write rejected: {reason}"),
            Self::NodeMissing { node } => write!(f, "Node #{node} is no longer in the document"),
        }
    }
}

impl std::error::Error for HostError {}

impl From<HostError> for LogLensError {
    fn from(e: HostError) -> Self {
        Self::Host(e)
    }
}

/// Convenience type alias for LogLens results.
pub type Result<T> = std::result::Result<T, LogLensError>;
