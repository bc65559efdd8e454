// Interview sequencer: the question/answer state machine
//
// A submission moves Idle -> Deciding and records the answer. Applying the
// advisory decision moves Deciding -> Idle and updates the cursor and the
// active question. The cursor never decreases.

use super::decision::AdvisoryDecision;
use super::script::Script;
use super::state::{InterviewState, SessionPosition, TranscriptEntry};
use crate::errors::InterviewError;

/// Sequencing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the user's answer.
    Idle,
    /// An answer is being classified; new submissions are rejected.
    Deciding,
}

/// Input for the advisory classifier, built when an answer is accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub last_answer: String,
    pub current_question: String,
    pub planned_next: String,
}

/// Result of applying a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedTurn {
    /// Whether the turn branched into a follow-up.
    pub branched: bool,
    pub cursor: u64,
    pub question: String,
    /// Set when a branch was turned into a continue by the depth cap.
    pub capped: bool,
}

/// Status of one scripted question in the progress view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Completed,
    Current,
    Upcoming,
}

/// Progress through the current pass over the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// 0 for the first pass, 1 once the script has wrapped, and so on.
    pub cycle: u64,
    pub steps: Vec<Step>,
}

pub struct Sequencer {
    script: Script,
    state: InterviewState,
    phase: Phase,
    max_consecutive_branches: Option<u32>,
}

impl Sequencer {
    /// Start a fresh interview.
    pub fn new(script: Script) -> Self {
        let state = InterviewState::initial(&script);
        Self::from_state(script, state)
    }

    /// Resume from a previously stored state.
    pub fn from_state(script: Script, state: InterviewState) -> Self {
        Self {
            script,
            state,
            phase: Phase::Idle,
            max_consecutive_branches: None,
        }
    }

    /// Cap consecutive follow-ups; `None` leaves them unbounded.
    pub fn with_branch_limit(mut self, limit: Option<u32>) -> Self {
        self.max_consecutive_branches = limit;
        self
    }

    /// Accept an answer and prepare the classification request.
    ///
    /// Rejects blank answers and submissions while a decision is pending;
    /// neither case changes any state.
    pub fn begin_answer(&mut self, raw: &str) -> Result<ClassificationRequest, InterviewError> {
        if raw.trim().is_empty() {
            return Err(InterviewError::EmptyAnswer);
        }
        if self.phase == Phase::Deciding {
            return Err(InterviewError::Busy);
        }

        self.state
            .transcript
            .push(TranscriptEntry::new(self.state.active_question.clone(), raw));
        self.state.pending_draft.clear();
        self.phase = Phase::Deciding;

        Ok(ClassificationRequest {
            last_answer: raw.to_string(),
            current_question: self.state.active_question.clone(),
            planned_next: self.script.planned(self.state.cursor + 1).to_string(),
        })
    }

    /// Apply the decision for the pending answer and return to `Idle`.
    pub fn apply(&mut self, decision: AdvisoryDecision) -> Result<AppliedTurn, InterviewError> {
        if self.phase != Phase::Deciding {
            return Err(InterviewError::NotDeciding);
        }

        let at_limit = self
            .max_consecutive_branches
            .is_some_and(|limit| self.state.branch_depth >= limit);

        let mut capped = false;
        let branched = match decision {
            AdvisoryDecision::Branch(_) if at_limit => {
                capped = true;
                self.advance();
                false
            }
            AdvisoryDecision::Branch(text) => {
                self.state.active_question = text;
                self.state.branch_depth += 1;
                true
            }
            AdvisoryDecision::Continue => {
                self.advance();
                false
            }
        };

        self.phase = Phase::Idle;

        Ok(AppliedTurn {
            branched,
            cursor: self.state.cursor,
            question: self.state.active_question.clone(),
            capped,
        })
    }

    /// Drop a pending decision without touching cursor or question.
    ///
    /// The answer already recorded stays in the transcript.
    pub fn abandon(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Discard all progress and start over from the first question.
    pub fn reset(&mut self) {
        self.state = InterviewState::initial(&self.script);
        self.phase = Phase::Idle;
    }

    fn advance(&mut self) {
        self.state.cursor += 1;
        self.state.active_question = self.script.planned(self.state.cursor).to_string();
        self.state.branch_depth = 0;
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.state.pending_draft = draft.into();
    }

    pub fn draft(&self) -> &str {
        &self.state.pending_draft
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cursor(&self) -> u64 {
        self.state.cursor
    }

    pub fn active_question(&self) -> &str {
        &self.state.active_question
    }

    pub fn state(&self) -> &InterviewState {
        &self.state
    }

    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn branch_limit(&self) -> Option<u32> {
        self.max_consecutive_branches
    }

    pub fn position(&self) -> SessionPosition {
        self.state.position()
    }

    /// True once the cursor has run past the end of the script.
    pub fn is_extended(&self) -> bool {
        self.state.cursor >= self.script.len() as u64
    }

    pub fn progress(&self) -> Progress {
        let n = self.script.len() as u64;
        let cycle = self.state.cursor / n;
        let current = self.state.cursor % n;
        let steps = (0..n)
            .map(|idx| match idx.cmp(&current) {
                std::cmp::Ordering::Less => Step::Completed,
                std::cmp::Ordering::Equal => Step::Current,
                std::cmp::Ordering::Greater => Step::Upcoming,
            })
            .collect();
        Progress { cycle, steps }
    }
}
