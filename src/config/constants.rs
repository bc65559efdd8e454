// Project-wide constants
//
// File names and environment variables in one place. Import via
// `use crate::config::constants::*;`.

/// Directory under the home directory holding config and data.
pub const PSYCHE_DIR: &str = ".psyche";

pub const CONFIG_FILE: &str = "config.toml";

/// Default SQLite file inside [`PSYCHE_DIR`].
pub const DEFAULT_DB_FILE: &str = "sessions.db";

/// Environment variable consulted when the config has no API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// User id when neither the config nor `--user` names one.
pub const DEFAULT_USER_ID: &str = "local";

/// Upper bound for the advisory request timeout.
pub const MAX_TIMEOUT_SECONDS: u64 = 3600;

/// Upper bounds for the retry schedule.
pub const MAX_RETRY_STEPS: usize = 10;
pub const MAX_RETRY_DELAY_MS: u64 = 60_000;
