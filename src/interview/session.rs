// Interview session
//
// One running interview for one authenticated user. Owns the sequencer and
// connects it to the advisory classifier, the session store and speech.
//
// - The sequencer lock is never held across the classifier call
// - Classifier failure fails open to Continue
// - Store failures are counted and reported, never fatal
// - Speech errors are logged and otherwise ignored

use anyhow::Context;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use std::sync::Arc;

use super::decision::AdvisoryDecision;
use super::script::Script;
use super::sequencer::{Phase, Progress, Sequencer};
use super::state::{InterviewState, Preferences, SessionPosition, TranscriptEntry};
use crate::advisory::AdvisoryClassifier;
use crate::errors::{AdvisoryError, InterviewError, StoreError};
use crate::identity::{UserId, UserIdentity};
use crate::speech::SpeechOutput;
use crate::storage::SessionStore;

/// Knobs for a session that do not come from the store.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub script: Script,
    /// Cap on consecutive follow-ups; `None` means unbounded.
    pub max_consecutive_branches: Option<u32>,
    /// Suppress automatic speech for this run without touching the stored
    /// preference.
    pub mute: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            script: Script::core(),
            max_consecutive_branches: None,
            mute: false,
        }
    }
}

/// What happened in one answered turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    pub branched: bool,
    pub cursor: u64,
    /// The question now shown.
    pub question: String,
    /// The cursor has run past the end of the script.
    pub extended: bool,
    /// The classifier was unavailable and the script was followed instead.
    pub fallback: bool,
    /// A follow-up was suppressed by the branch cap.
    pub capped: bool,
    /// Set while recent saves have been failing.
    pub persistence_warning: Option<String>,
}

/// Snapshot for the status command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub user_tag: String,
    pub classifier: String,
    pub backend: String,
    pub cursor: u64,
    pub script_len: usize,
    pub branch_depth: u32,
    pub extended: bool,
    pub answers: usize,
    pub audio_enabled: bool,
    pub speaking: bool,
    pub persistence_failures: u32,
    pub closed: bool,
}

#[derive(Debug, Default)]
struct PersistenceHealth {
    consecutive_failures: u32,
    last_error: Option<String>,
}

impl PersistenceHealth {
    fn record(&mut self, result: Result<(), StoreError>) {
        match result {
            Ok(()) => {
                self.consecutive_failures = 0;
                self.last_error = None;
            }
            Err(e) => {
                self.consecutive_failures += 1;
                self.last_error = Some(e.to_string());
            }
        }
    }

    fn warning(&self) -> Option<String> {
        if self.consecutive_failures == 0 {
            return None;
        }
        Some(format!(
            "Progress is not being saved ({} failed attempt(s)): {}",
            self.consecutive_failures,
            self.last_error.as_deref().unwrap_or("unknown error")
        ))
    }
}

struct Snapshot {
    transcript: Vec<TranscriptEntry>,
    position: SessionPosition,
}

impl Snapshot {
    fn of(seq: &Sequencer) -> Self {
        Self {
            transcript: seq.state().transcript.entries().to_vec(),
            position: seq.position(),
        }
    }
}

pub struct InterviewSession {
    id: Uuid,
    user: UserId,
    sequencer: Mutex<Sequencer>,
    classifier: Arc<dyn AdvisoryClassifier>,
    store: SessionStore,
    speech: Arc<dyn SpeechOutput>,
    preferences: Mutex<Preferences>,
    health: Mutex<PersistenceHealth>,
    mute: bool,
    cancel: CancellationToken,
}

impl InterviewSession {
    /// Start (or resume) the interview for an authenticated user.
    ///
    /// Stored transcript, position and preferences are loaded when present.
    /// Unreadable stored values are logged and replaced by defaults.
    pub async fn start(
        identity: &UserIdentity,
        classifier: Arc<dyn AdvisoryClassifier>,
        store: SessionStore,
        speech: Arc<dyn SpeechOutput>,
        options: SessionOptions,
    ) -> Result<Self, InterviewError> {
        let user = identity.require()?.clone();
        let mut health = PersistenceHealth::default();

        let transcript = match store.load_transcript(&user).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(user = %user.log_tag(), "Failed to load transcript: {}", e);
                health.record(Err(e));
                Vec::new()
            }
        };
        let position = match store.load_position(&user).await {
            Ok(position) => position,
            Err(e) => {
                warn!(user = %user.log_tag(), "Failed to load session position: {}", e);
                health.record(Err(e));
                None
            }
        };
        let preferences = match store.load_preferences(&user).await {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!(user = %user.log_tag(), "Failed to load preferences: {}", e);
                health.record(Err(e));
                Preferences::default()
            }
        };

        let id = Uuid::new_v4();
        let state = InterviewState::restore(&options.script, transcript, position);
        info!(
            session = %id,
            user = %user.log_tag(),
            cursor = state.cursor,
            answers = state.transcript.len(),
            classifier = classifier.name(),
            backend = store.backend_name(),
            "Interview session started"
        );

        let sequencer = Sequencer::from_state(options.script, state)
            .with_branch_limit(options.max_consecutive_branches);

        Ok(Self {
            id,
            user,
            sequencer: Mutex::new(sequencer),
            classifier,
            store,
            speech,
            preferences: Mutex::new(preferences),
            health: Mutex::new(health),
            mute: options.mute,
            cancel: CancellationToken::new(),
        })
    }

    /// Submit an answer to the active question and move to the next one.
    pub async fn submit_answer(&self, raw: &str) -> Result<TurnOutcome, InterviewError> {
        if self.cancel.is_cancelled() {
            return Err(InterviewError::SessionClosed);
        }

        let (request, snapshot) = {
            let mut seq = self.sequencer.lock().await;
            let request = seq.begin_answer(raw)?;
            (request, Snapshot::of(&seq))
        };

        self.speech.stop();
        self.persist(snapshot).await;

        let (decision, fallback) = match self.classifier.classify(&request, &self.cancel).await {
            Ok(reply) => (AdvisoryDecision::from_response(reply.as_deref()), false),
            Err(AdvisoryError::Unavailable {
                attempts,
                last_error,
            }) => {
                warn!(
                    attempts,
                    "Advisory classifier unavailable, continuing with script: {}", last_error
                );
                (AdvisoryDecision::Continue, true)
            }
            Err(AdvisoryError::Cancelled) => {
                self.sequencer.lock().await.abandon();
                return Err(InterviewError::SessionClosed);
            }
        };

        let (turn, extended) = {
            let mut seq = self.sequencer.lock().await;
            if self.cancel.is_cancelled() {
                seq.abandon();
                return Err(InterviewError::SessionClosed);
            }
            let turn = seq.apply(decision)?;

            debug!(
                cursor = turn.cursor,
                branched = turn.branched,
                fallback,
                "Turn applied"
            );
            if turn.capped {
                info!(cursor = turn.cursor, "Follow-up limit reached, returning to script");
            }

            // Saved under the lock so erase_all cannot slip in before the write
            self.persist(Snapshot::of(&seq)).await;
            (turn, seq.is_extended())
        };

        if self.audio_enabled().await {
            if let Err(e) = self.speech.speak(&turn.question) {
                debug!("Speech unavailable: {}", e);
            }
        }

        Ok(TurnOutcome {
            branched: turn.branched,
            cursor: turn.cursor,
            question: turn.question,
            extended,
            fallback,
            capped: turn.capped,
            persistence_warning: self.persistence_warning().await,
        })
    }

    /// Write transcript and position; failures only update the health record.
    async fn persist(&self, snapshot: Snapshot) {
        let transcript = self
            .store
            .save_transcript(&self.user, &snapshot.transcript)
            .await;
        let position = self.store.save_position(&self.user, &snapshot.position).await;

        let mut health = self.health.lock().await;
        for result in [transcript, position] {
            if let Err(e) = &result {
                warn!(user = %self.user.log_tag(), "Failed to save interview state: {}", e);
            }
            health.record(result);
        }
    }

    pub async fn set_draft(&self, draft: impl Into<String>) {
        self.sequencer.lock().await.set_draft(draft);
    }

    pub async fn draft(&self) -> String {
        self.sequencer.lock().await.draft().to_string()
    }

    pub async fn current_question(&self) -> String {
        self.sequencer.lock().await.active_question().to_string()
    }

    pub async fn phase(&self) -> Phase {
        self.sequencer.lock().await.phase()
    }

    pub async fn is_extended(&self) -> bool {
        self.sequencer.lock().await.is_extended()
    }

    pub async fn history(&self) -> Vec<TranscriptEntry> {
        self.sequencer
            .lock()
            .await
            .state()
            .transcript
            .entries()
            .to_vec()
    }

    pub async fn progress(&self) -> Progress {
        self.sequencer.lock().await.progress()
    }

    /// Speak the active question now, whatever the audio preference.
    pub async fn play_question(&self) -> Result<(), crate::errors::SpeechError> {
        let question = self.current_question().await;
        self.speech.speak(&question)
    }

    /// Speak the active question if automatic audio is on.
    pub async fn announce(&self) {
        if !self.audio_enabled().await {
            return;
        }
        if let Err(e) = self.play_question().await {
            debug!("Speech unavailable: {}", e);
        }
    }

    pub fn stop_speaking(&self) {
        self.speech.stop();
    }

    pub fn is_speaking(&self) -> bool {
        self.speech.is_speaking()
    }

    /// Automatic speech is on for this run.
    pub async fn audio_enabled(&self) -> bool {
        !self.mute && self.preferences.lock().await.audio_enabled
    }

    /// Flip the stored audio preference and return the new value.
    pub async fn toggle_audio(&self) -> bool {
        let prefs = {
            let mut prefs = self.preferences.lock().await;
            prefs.audio_enabled = !prefs.audio_enabled;
            prefs.clone()
        };
        if !prefs.audio_enabled {
            self.speech.stop();
        }

        let result = self.store.save_preferences(&self.user, &prefs).await;
        if let Err(e) = &result {
            warn!(user = %self.user.log_tag(), "Failed to save preferences: {}", e);
        }
        self.health.lock().await.record(result);

        prefs.audio_enabled
    }

    pub async fn preferences(&self) -> Preferences {
        self.preferences.lock().await.clone()
    }

    pub async fn persistence_warning(&self) -> Option<String> {
        self.health.lock().await.warning()
    }

    /// Erase every stored value for the user and restart from the first
    /// question. Refused while an answer is being classified.
    pub async fn erase_all(&self) -> anyhow::Result<()> {
        if self.cancel.is_cancelled() {
            return Err(InterviewError::SessionClosed.into());
        }

        let mut seq = self.sequencer.lock().await;
        if seq.phase() == Phase::Deciding {
            return Err(InterviewError::Busy.into());
        }

        self.store
            .erase_all(&self.user)
            .await
            .context("Failed to erase stored interview data")?;

        seq.reset();
        *self.preferences.lock().await = Preferences::default();
        *self.health.lock().await = PersistenceHealth::default();
        self.speech.stop();
        Ok(())
    }

    pub async fn status(&self) -> SessionStatus {
        let (cursor, script_len, branch_depth, extended, answers) = {
            let seq = self.sequencer.lock().await;
            (
                seq.cursor(),
                seq.script().len(),
                seq.state().branch_depth,
                seq.is_extended(),
                seq.state().transcript.len(),
            )
        };

        SessionStatus {
            session_id: self.id,
            user_tag: self.user.log_tag(),
            classifier: self.classifier.name().to_string(),
            backend: self.store.backend_name().to_string(),
            cursor,
            script_len,
            branch_depth,
            extended,
            answers,
            audio_enabled: self.audio_enabled().await,
            speaking: self.speech.is_speaking(),
            persistence_failures: self.health.lock().await.consecutive_failures,
            closed: self.cancel.is_cancelled(),
        }
    }

    /// End the session: cancel any pending classification and stop speech.
    ///
    /// A turn still waiting on the classifier is abandoned without applying
    /// or saving a decision. Later submissions fail with `SessionClosed`.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            info!(session = %self.id, "Interview session closed");
        }
        self.cancel.cancel();
        self.speech.stop();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }
}

impl Drop for InterviewSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
