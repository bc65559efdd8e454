// Error taxonomy for the interview core
//
// Input and lifecycle errors are surfaced to the caller. Advisory, storage
// and speech errors are recovered locally (fail-open, retry-on-next-save,
// silent degrade) and only ever show up as warnings.

use thiserror::Error;

/// Errors returned synchronously from interview operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InterviewError {
    /// The submitted answer was empty after trimming.
    #[error("Please provide an answer before continuing")]
    EmptyAnswer,

    /// A previous answer is still being classified.
    #[error("Still thinking about the previous answer")]
    Busy,

    /// `apply` was called while no answer was being classified.
    #[error("No answer is awaiting a decision")]
    NotDeciding,

    /// The identity boundary handed over no authenticated user.
    #[error("No authenticated user; the interview cannot start")]
    NotAuthenticated,

    /// The session was closed (logout, navigation away) while in use.
    #[error("Interview session has been closed")]
    SessionClosed,
}

/// Failure of the advisory classifier after its retry policy ran out.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("Advisory service unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable { attempts: usize, last_error: String },

    #[error("Advisory request cancelled")]
    Cancelled,
}

/// Session store failures. Never fatal to the in-memory session.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Failed to (de)serialize stored value for {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Speech output failures. Always degraded silently.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Failed to start speech command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Speech output is disabled")]
    Disabled,
}

/// Attach an actionable hint to an error message.
pub fn wrap_error_with_suggestion(message: impl Into<String>, suggestion: &str) -> String {
    format!("{}\n\n{}", message.into(), suggestion)
}

/// Error text for an unreadable or missing file.
pub fn file_not_found_error(path: &str, what: &str) -> String {
    wrap_error_with_suggestion(
        format!("{} not found or unreadable: {}", what, path),
        "Check that the path exists and is readable, or remove the setting to use defaults.",
    )
}

/// Error text for a malformed config file.
pub fn config_parse_error(detail: &str) -> String {
    wrap_error_with_suggestion(
        format!("Failed to parse configuration: {}", detail),
        "Fix the syntax in ~/.psyche/config.toml (TOML format).",
    )
}
