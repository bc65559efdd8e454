// Interview core
//
// Scripted questions, the per-user interview state, the rule that turns a
// classifier reply into a decision, the sequencing state machine and the
// session that wires them to the classifier, the store and speech.

pub mod decision;
pub mod script;
pub mod sequencer;
pub mod session;
pub mod state;

pub use decision::{AdvisoryDecision, CONTINUE_SENTINEL, MIN_BRANCH_CHARS};
pub use script::{Script, CORE_QUESTIONS};
pub use sequencer::{AppliedTurn, ClassificationRequest, Phase, Progress, Sequencer, Step};
pub use session::{InterviewSession, SessionOptions, SessionStatus, TurnOutcome};
pub use state::{InterviewState, Preferences, SessionPosition, Transcript, TranscriptEntry};
