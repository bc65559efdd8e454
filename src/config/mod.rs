// Configuration module
// Public interface for configuration loading

pub mod constants;
mod loader;
mod settings;

pub use loader::{apply_env_api_key, default_config_path, load_config, parse_config, psyche_dir};
pub use settings::{
    AdvisoryConfig, Config, FeaturesConfig, InterviewConfig, SpeechConfig, StorageBackendKind,
    StorageConfig,
};
