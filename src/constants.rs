//! App-wide constants.
//!
//! Centralises the tool name and the default parse options so a rename
//! only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "strata";

/// Crate version, baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ── Parse option defaults ───────────────────────────────────────────

/// Prefix every environment variable (and `.env` key) must carry.
pub const DEFAULT_ENV_PREFIX: &str = "SNKD_";

/// Separator between the segments of a dotted key path.
pub const DEFAULT_DELIMITER: &str = ".";

/// Name of the boolean flag that short-circuits loading.
pub const DEFAULT_HELP_FLAG: &str = "help";

/// Key holding the path of the `.env` file to load.
pub const DEFAULT_CONFIG_PATH_KEY: &str = "config";

/// Short form of the config-path flag.
pub const CONFIG_PATH_SHORT: char = 'c';

/// Short form of the help flag (only used when it keeps its default name).
pub const HELP_SHORT: char = 'h';

// ── Environment variable names ──────────────────────────────────────

/// Log filter for the binary (`tracing_subscriber::EnvFilter` syntax).
pub const ENV_LOG: &str = "STRATA_LOG";
