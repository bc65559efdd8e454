// Interview state and persisted shapes

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::script::Script;

/// One answered question. Entries are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub question: String,
    pub answer: String,
    #[serde(serialize_with = "serialize_millis")]
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            timestamp: Utc::now().trunc_subsecs(3),
        }
    }
}

/// `2025-01-02T03:04:05.000Z`: millisecond precision, `Z` suffix.
fn serialize_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Append-only, chronological list of answered questions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }
}

impl From<Vec<TranscriptEntry>> for Transcript {
    fn from(entries: Vec<TranscriptEntry>) -> Self {
        Self { entries }
    }
}

/// Cursor and displayed question as written to the session store.
///
/// Field names follow the storage format shared with other clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPosition {
    #[serde(rename = "questionIndex", default)]
    pub cursor: u64,
    #[serde(rename = "questionText", default)]
    pub question: Option<String>,
    #[serde(default)]
    pub branch_depth: u32,
}

/// Per-user preferences kept next to the interview state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_true")]
    pub audio_enabled: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_true() -> bool {
    true
}

fn default_theme() -> String {
    "dark".to_string()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            theme: default_theme(),
        }
    }
}

/// Full per-user interview state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewState {
    /// Index into the script; the planned question is `script[cursor mod N]`.
    pub cursor: u64,
    /// The question currently shown, scripted or generated.
    pub active_question: String,
    /// Consecutive branch decisions since the last continue.
    pub branch_depth: u32,
    /// Answer being composed. Not part of the persisted state.
    pub pending_draft: String,
    pub transcript: Transcript,
}

impl InterviewState {
    /// Fresh state: cursor 0, first scripted question, empty transcript.
    pub fn initial(script: &Script) -> Self {
        Self {
            cursor: 0,
            active_question: script.planned(0).to_string(),
            branch_depth: 0,
            pending_draft: String::new(),
            transcript: Transcript::new(),
        }
    }

    /// Rebuild state from stored values.
    ///
    /// A non-empty stored transcript replaces the in-memory one; a stored
    /// position replaces the defaults. A missing or blank question text falls
    /// back to the planned question for the stored cursor.
    pub fn restore(
        script: &Script,
        transcript: Vec<TranscriptEntry>,
        position: Option<SessionPosition>,
    ) -> Self {
        let mut state = Self::initial(script);

        if !transcript.is_empty() {
            state.transcript = Transcript::from(transcript);
        }

        if let Some(position) = position {
            state.cursor = position.cursor;
            state.branch_depth = position.branch_depth;
            state.active_question = match position.question {
                Some(q) if !q.trim().is_empty() => q,
                _ => script.planned(position.cursor).to_string(),
            };
        }

        state
    }

    /// The persisted position for this state.
    pub fn position(&self) -> SessionPosition {
        SessionPosition {
            cursor: self.cursor,
            question: Some(self.active_question.clone()),
            branch_depth: self.branch_depth,
        }
    }
}
