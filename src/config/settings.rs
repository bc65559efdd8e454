// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::constants::*;
use crate::advisory::gemini::{DEFAULT_MODEL, GEMINI_BASE_URL, REQUEST_TIMEOUT_SECS};
use crate::advisory::retry::DEFAULT_DELAYS_MS;
use crate::advisory::RetryPolicy;
use crate::errors;

/// Advisory classifier (Gemini) settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// API key; falls back to `GEMINI_API_KEY`. Without one the interview
    /// runs offline and follows the script only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub model: String,

    pub base_url: String,

    /// Per-request timeout
    pub timeout_seconds: u64,

    /// Delay before each retry, in order. Attempts = len + 1.
    pub retry_delays_ms: Vec<u64>,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            timeout_seconds: REQUEST_TIMEOUT_SECS,
            retry_delays_ms: DEFAULT_DELAYS_MS.to_vec(),
        }
    }
}

impl AdvisoryConfig {
    /// The API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_millis(&self.retry_delays_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    #[default]
    Sqlite,
    /// Nothing survives the process
    Memory,
}

/// Session store settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,

    /// SQLite file; defaults to `~/.psyche/sessions.db`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolved_db_path(&self, psyche_dir: &std::path::Path) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| psyche_dir.join(DEFAULT_DB_FILE))
    }
}

/// Text-to-speech settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Allow speech at all. The per-user audio preference applies on top.
    pub enabled: bool,

    /// TTS program; the platform default (`say`, `espeak`) when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Arguments placed before the text
    pub args: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Follow-ups allowed in a row before returning to the script.
    /// Unset means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_consecutive_branches: Option<u32>,
}

/// Feature flags configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Enable debug logging for troubleshooting
    pub debug_logging: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identity handed over by the sign-in layer
    pub user_id: String,
    pub advisory: AdvisoryConfig,
    pub storage: StorageConfig,
    pub speech: SpeechConfig,
    pub interview: InterviewConfig,
    pub features: FeaturesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            advisory: AdvisoryConfig::default(),
            storage: StorageConfig::default(),
            speech: SpeechConfig::default(),
            interview: InterviewConfig::default(),
            features: FeaturesConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.user_id.trim().is_empty() {
            anyhow::bail!(errors::wrap_error_with_suggestion(
                "user_id must not be empty",
                "Set user_id in ~/.psyche/config.toml or pass --user <ID>"
            ));
        }

        if self.advisory.timeout_seconds == 0 {
            anyhow::bail!("advisory.timeout_seconds must be greater than 0");
        }

        if self.advisory.timeout_seconds > MAX_TIMEOUT_SECONDS {
            anyhow::bail!(errors::wrap_error_with_suggestion(
                format!(
                    "advisory.timeout_seconds ({}) is very high",
                    self.advisory.timeout_seconds
                ),
                "Recommended range: 10-120 seconds\n\
                 High values leave the interview waiting on a stalled request"
            ));
        }

        if self.advisory.retry_delays_ms.len() > MAX_RETRY_STEPS {
            anyhow::bail!(errors::wrap_error_with_suggestion(
                format!(
                    "advisory.retry_delays_ms has {} steps",
                    self.advisory.retry_delays_ms.len()
                ),
                &format!("Use at most {} retry delays, e.g. [1000, 2000, 4000, 8000]", MAX_RETRY_STEPS)
            ));
        }

        if let Some(delay) = self
            .advisory
            .retry_delays_ms
            .iter()
            .find(|d| **d > MAX_RETRY_DELAY_MS)
        {
            anyhow::bail!(errors::wrap_error_with_suggestion(
                format!("advisory.retry_delays_ms contains {}ms", delay),
                &format!("Each retry delay must be at most {}ms", MAX_RETRY_DELAY_MS)
            ));
        }

        if self.advisory.base_url.trim().is_empty() {
            anyhow::bail!("advisory.base_url must not be empty");
        }

        if self.interview.max_consecutive_branches == Some(0) {
            anyhow::bail!(errors::wrap_error_with_suggestion(
                "interview.max_consecutive_branches must be greater than 0",
                "Remove the setting to allow unlimited follow-up questions"
            ));
        }

        if let Some(ref command) = self.speech.command {
            if command.trim().is_empty() {
                anyhow::bail!("speech.command must not be empty when set");
            }
        }

        Ok(())
    }
}
