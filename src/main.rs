// Psyche - Adaptive self-reflection interview
// Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use psyche::advisory::{AdvisoryClassifier, GeminiClassifier, OfflineClassifier};
use psyche::cli::Repl;
use psyche::config::{load_config, psyche_dir, Config, StorageBackendKind};
use psyche::identity::{UserId, UserIdentity};
use psyche::interview::{InterviewSession, Script, SessionOptions};
use psyche::speech::{CommandSpeech, SilentSpeech, SpeechOutput};
use psyche::storage::{MemoryBackend, SessionStore, SqliteBackend};

/// Psyche: a guided self-reflection interview that follows up on what matters.
#[derive(Parser, Debug)]
#[command(name = "psyche", version, about)]
struct Args {
    /// Path to the configuration file (default: ~/.psyche/config.toml)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Signed-in user id; overrides `user_id` from the config
    #[arg(short = 'u', long = "user")]
    user: Option<String>,

    /// Do not read questions aloud in this run
    #[arg(long = "no-audio")]
    no_audio: bool,

    /// Verbose diagnostics on stderr
    #[arg(long = "debug")]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    psyche::logging::init(args.debug || config.features.debug_logging);

    let user_id = args.user.clone().unwrap_or_else(|| config.user_id.clone());
    let user_id = UserId::new(user_id).context("User id must not be empty")?;
    let identity = UserIdentity::authenticated(user_id);

    let store = build_store(&config)?;
    let classifier = build_classifier(&config)?;
    let speech = build_speech(&config);

    let options = SessionOptions {
        script: Script::core(),
        max_consecutive_branches: config.interview.max_consecutive_branches,
        mute: args.no_audio || !config.speech.enabled,
    };

    let session = InterviewSession::start(&identity, classifier, store, speech, options).await?;
    let session = Arc::new(session);

    let mut repl = Repl::new(Arc::clone(&session))?;
    let result = repl.run().await;
    session.close();
    result
}

fn build_store(config: &Config) -> Result<SessionStore> {
    match config.storage.backend {
        StorageBackendKind::Memory => {
            tracing::warn!("Using in-memory storage; answers will not be kept after exit");
            Ok(SessionStore::new(Arc::new(MemoryBackend::new())))
        }
        StorageBackendKind::Sqlite => {
            let path = config.storage.resolved_db_path(&psyche_dir()?);
            let backend = SqliteBackend::open(&path)
                .with_context(|| format!("Failed to open session store at {}", path.display()))?;
            Ok(SessionStore::new(Arc::new(backend)))
        }
    }
}

fn build_classifier(config: &Config) -> Result<Arc<dyn AdvisoryClassifier>> {
    let Some(api_key) = config.advisory.api_key() else {
        tracing::warn!("No Gemini API key configured; follow-up questions are disabled");
        return Ok(Arc::new(OfflineClassifier));
    };

    let classifier = GeminiClassifier::new(api_key.to_string())?
        .with_model(config.advisory.model.clone())
        .with_base_url(config.advisory.base_url.clone())
        .with_retry_policy(config.advisory.retry_policy())
        .with_timeout(config.advisory.timeout())?;
    Ok(Arc::new(classifier))
}

fn build_speech(config: &Config) -> Arc<dyn SpeechOutput> {
    if !config.speech.enabled {
        return Arc::new(SilentSpeech);
    }
    if let Some(ref command) = config.speech.command {
        return Arc::new(CommandSpeech::new(command.clone(), config.speech.args.clone()));
    }
    match CommandSpeech::platform_default() {
        Some(speech) => Arc::new(speech),
        None => Arc::new(SilentSpeech),
    }
}
