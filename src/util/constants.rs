// ctail - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Every tunable that the config file may override has its default and its
// accepted range defined here.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ctail";

/// Application identifier used for config directories.
pub const APP_ID: &str = "ctail";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Binary sniffing
// =============================================================================

/// Chunk size used when scanning a file for NUL bytes.
pub const SNIFF_CHUNK_SIZE: usize = 1024;

// =============================================================================
// Tail engine
// =============================================================================

/// How many trailing bytes of a large, never-seen file are shown on the
/// first attach of a session.
pub const DEFAULT_INITIAL_TAIL_BYTES: u64 = 2048;

/// Upper bound for the configurable initial window.
pub const MAX_INITIAL_TAIL_BYTES: u64 = 1024 * 1024; // 1 MiB

/// Steady-state poll interval between EOF checks (ms).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Minimum user-configurable poll interval (ms).
pub const MIN_POLL_INTERVAL_MS: u64 = 10;

/// Maximum user-configurable poll interval (ms).
pub const MAX_POLL_INTERVAL_MS: u64 = 10_000; // 10 s

/// Delay between whole-session retries when retry mode is on (ms).
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 1_000;

/// Minimum user-configurable retry interval (ms).
pub const MIN_RETRY_INTERVAL_MS: u64 = 100;

/// Maximum user-configurable retry interval (ms).
pub const MAX_RETRY_INTERVAL_MS: u64 = 60_000; // 60 s

/// Size of each read from the tailed file.
pub const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Granularity at which sleeps check the cancel token (ms).
pub const CANCEL_CHECK_INTERVAL_MS: u64 = 50;

/// Maximum size of an unterminated line held back while waiting for its
/// newline. A larger fragment is emitted as-is so a file without newlines
/// cannot grow the buffer without bound.
pub const MAX_PENDING_LINE_BYTES: usize = 2 * 1024 * 1024; // 2 MiB

// =============================================================================
// Event records
// =============================================================================

/// Offset applied to event-record Unix timestamps (GMT+9).
pub const EVENT_TIME_OFFSET_SECS: i32 = 9 * 3600;

/// Rendering format of event-record timestamps.
pub const EVENT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// =============================================================================
// Logging
// =============================================================================

/// Default log level. Tracing output goes to stderr; stdout carries the
/// tailed lines, so the default is kept quiet.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
