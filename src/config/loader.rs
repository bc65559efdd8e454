// Configuration loader
// Loads settings from ~/.psyche/config.toml (or an explicit path) and the
// GEMINI_API_KEY environment variable

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::*;
use super::settings::Config;
use crate::errors;

/// `~/.psyche`
pub fn psyche_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(PSYCHE_DIR))
}

/// `~/.psyche/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(psyche_dir()?.join(CONFIG_FILE))
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, a missing default file
/// yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => {
            let default_path = default_config_path()?;
            if default_path.exists() {
                read_config_file(&default_path)?
            } else {
                tracing::debug!("No config at {}, using defaults", default_path.display());
                Config::default()
            }
        }
    };

    apply_env_api_key(&mut config, std::env::var(API_KEY_ENV).ok());

    config
        .validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path).map_err(|_e| {
        anyhow::anyhow!(errors::file_not_found_error(
            &path.display().to_string(),
            "Configuration file"
        ))
    })?;
    let config = parse_config(&contents)?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Parse TOML config text. Absent sections and keys take their defaults.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| anyhow::anyhow!(errors::config_parse_error(&e.to_string())))
}

/// Fill a missing API key from the environment value.
pub fn apply_env_api_key(config: &mut Config, env_value: Option<String>) {
    if config.advisory.api_key().is_some() {
        return;
    }
    if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
        config.advisory.api_key = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageBackendKind;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
user_id = "alice"

[advisory]
api_key = "key-123"
model = "gemini-pro"
timeout_seconds = 30
retry_delays_ms = [100, 200]

[storage]
backend = "memory"

[speech]
enabled = false
command = "espeak"
args = ["-s", "140"]

[interview]
max_consecutive_branches = 2

[features]
debug_logging = true
"#,
        )
        .unwrap();

        assert_eq!(config.user_id, "alice");
        assert_eq!(config.advisory.api_key(), Some("key-123"));
        assert_eq!(config.advisory.model, "gemini-pro");
        assert_eq!(config.advisory.retry_delays_ms, vec![100, 200]);
        assert_eq!(config.storage.backend, StorageBackendKind::Memory);
        assert!(!config.speech.enabled);
        assert_eq!(config.speech.args, vec!["-s", "140"]);
        assert_eq!(config.interview.max_consecutive_branches, Some(2));
        assert!(config.features.debug_logging);
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let config = parse_config("[advisory]\nmodel = \"other\"\n").unwrap();
        assert_eq!(config.advisory.model, "other");
        assert_eq!(config.advisory.retry_delays_ms, vec![1000, 2000, 4000, 8000]);
        assert_eq!(config.user_id, DEFAULT_USER_ID);
    }

    #[test]
    fn test_parse_error_has_suggestion() {
        let err = parse_config("user_id = ").unwrap_err().to_string();
        assert!(err.contains("Failed to parse configuration"));
        assert!(err.contains("config.toml"));
    }

    #[test]
    fn test_env_key_fills_only_missing_key() {
        let mut config = Config::default();
        apply_env_api_key(&mut config, Some("from-env".to_string()));
        assert_eq!(config.advisory.api_key(), Some("from-env"));

        let mut config = Config::default();
        config.advisory.api_key = Some("from-file".to_string());
        apply_env_api_key(&mut config, Some("from-env".to_string()));
        assert_eq!(config.advisory.api_key(), Some("from-file"));

        let mut config = Config::default();
        apply_env_api_key(&mut config, Some("  ".to_string()));
        assert!(config.advisory.api_key().is_none());
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = TempDir::new().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml")))
            .unwrap_err()
            .to_string();
        assert!(err.contains("not found"));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[interview]\nmax_consecutive_branches = 0\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{:#}", err).contains("max_consecutive_branches"));
    }
}
