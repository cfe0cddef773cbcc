// LogLens - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogLens";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogLens";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Persistence keys
// =============================================================================

/// Store file name (stored in the platform data directory).
pub const STORE_FILE_NAME: &str = "storage.json";

/// Host settings file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Marker classes shared by the serialiser, the parser and the host
// =============================================================================

/// Class added to a host node once it has been considered for enhancement.
pub const CLASS_PROCESSED: &str = "loglens-processed";

/// Class of a rendered SGR style element.
pub const CLASS_ANSI: &str = "loglens-ansi";

/// Class of an error marker element.
pub const CLASS_ERROR: &str = "loglens-error";

/// Extra class applied to the error marker targeted by jump-to-error.
pub const CLASS_ERROR_HIGHLIGHT: &str = "loglens-error-highlight";

/// Class of a live search match element.
pub const CLASS_SEARCH_MATCH: &str = "loglens-search-match";

/// Class of a segmented line element.
pub const CLASS_LINE: &str = "loglens-line";

/// Class toggled on line elements by fold/unfold.
pub const CLASS_FOLDED: &str = "loglens-folded";

/// Class of the controls bar inserted before an enhanced block.
pub const CLASS_CONTROLS: &str = "loglens-controls";

/// Class of the search box inserted after an enhanced block.
pub const CLASS_SEARCH_BOX: &str = "loglens-search";

// =============================================================================
// Discovery
// =============================================================================

/// A generic `pre`/`code` element must hold more than this many characters
/// of text to be considered a log.
pub const DEFAULT_GENERIC_MIN_CHARS: usize = 100;

/// Lower bound for the configurable generic detection threshold.
pub const MIN_GENERIC_MIN_CHARS: usize = 1;

/// Upper bound for the configurable generic detection threshold.
pub const MAX_GENERIC_MIN_CHARS: usize = 100_000;

// =============================================================================
// Change-detection debouncing
// =============================================================================

/// Quiet period after the last content-changed event before a rescan runs (ms).
pub const DEFAULT_RESCAN_DEBOUNCE_MS: u64 = 250;

/// Minimum configurable rescan debounce (ms).
pub const MIN_RESCAN_DEBOUNCE_MS: u64 = 10;

/// Maximum configurable rescan debounce (ms).
pub const MAX_RESCAN_DEBOUNCE_MS: u64 = 10_000;

/// Longest a continuous burst of change events may postpone a rescan (ms).
pub const DEFAULT_RESCAN_MAX_WAIT_MS: u64 = 2_000;

/// Maximum configurable rescan max-wait (ms).
pub const MAX_RESCAN_MAX_WAIT_MS: u64 = 60_000;

// =============================================================================
// Controls feedback
// =============================================================================

/// How long the jump-to-error highlight stays on the target marker (ms).
pub const ERROR_HIGHLIGHT_MS: u64 = 2_000;

/// How long the copy button shows its feedback label (ms).
pub const COPY_FEEDBACK_MS: u64 = 2_000;

/// Copy button idle label.
pub const LABEL_COPY: &str = "📋 Copy";

/// Copy button label after a successful clipboard write.
pub const LABEL_COPIED: &str = "✓ Copied!";

/// Copy button label after a rejected clipboard write.
pub const LABEL_COPY_FAILED: &str = "✗ Copy failed";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of block text included in debug output.
pub const DEBUG_MAX_TEXT_PREVIEW: usize = 200;
