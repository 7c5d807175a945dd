// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display)
pub const APP_NAME: &str = "Pubflow";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "pubflow";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "pubflow.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "PUBFLOW_CONFIG";

// =============================================================================
// Environment Variables - Debug / Logging
// =============================================================================

/// Environment variable for debug mode
pub const ENV_DEBUG: &str = "PUBFLOW_DEBUG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "PUBFLOW_LOG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "PUBFLOW_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "PUBFLOW_PORT";

/// Environment variable for the tokio worker pool size
pub const ENV_WORKERS: &str = "PUBFLOW_WORKERS";

/// Environment variable for per-agent inbox capacity
pub const ENV_INBOX_CAPACITY: &str = "PUBFLOW_INBOX_CAPACITY";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8080;

/// Default tokio worker pool size (stands in for the distilled spec's hand-rolled
/// fixed-size dispatcher thread pool, see DESIGN.md)
pub const DEFAULT_WORKERS: usize = 5;

/// Default bounded inbox capacity per `AsyncAgentWrapper` (spec §4.6)
pub const DEFAULT_INBOX_CAPACITY: usize = 10;

/// How often an idle wrapper worker re-checks its shutdown flag (spec §4.6: "pop one
/// tuple with a timeout; if none, check shutdown and loop")
pub const WRAPPER_POLL_INTERVAL_MS: u64 = 200;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "PUBFLOW_DATA_DIR";

// =============================================================================
// Shutdown
// =============================================================================

/// Grace period (seconds) for background tasks to finish during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

// =============================================================================
// HTTP
// =============================================================================

/// Maximum size of an uploaded topology body
pub const UPLOAD_BODY_LIMIT: usize = 1024 * 1024;
