// Scripted question set
//
// The core interview is a fixed, ordered list of questions. The cursor indexes
// into it modulo its length, so the script cycles once it has been exhausted.

use std::sync::Arc;

/// The ten core interview questions, in order.
pub const CORE_QUESTIONS: [&str; 10] = [
    "What is the one rule or belief you enforce most strictly on yourself, and if you broke it, what is the deepest fear about yourself that would be realised?",
    "What is the recurring, seemingly minor inconvenience in your life that actually serves a secret, unconscious purpose?",
    "What is a trait in another person that you consistently judge, and in what subtle way do you possess or secretly wish you possessed that same trait?",
    "If you received a substantial inheritance, what is the first thing you would stop doing?",
    "Think back to a recent mistake. What did you tell yourself immediately after, and what does that reveal about your self-worth?",
    "Imagine your 80-year-old self looks at you with regret and says, 'If only you hadn't wasted time on X...' What is X?",
    "What is a possession, routine, or relationship you know is holding you back, but you refuse to let go of?",
    "When was the last time you felt a truly unadulterated emotion (joy, grief, anger) that wasn't influenced by how you thought you 'should' feel?",
    "If you could only have one: Total freedom from fear OR Total certainty of unconditional love. Which do you choose?",
    "Define 'enough' for your life. What evidence are you waiting for to tell you that you've reached it?",
];

/// Immutable, non-empty ordered question list. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    questions: Arc<[String]>,
}

impl Script {
    /// The built-in core script.
    pub fn core() -> Self {
        Self {
            questions: CORE_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        }
    }

    /// Build a custom script. Returns `None` for an empty list.
    pub fn new<I, S>(questions: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let questions: Arc<[String]> = questions.into_iter().map(Into::into).collect();
        if questions.is_empty() {
            None
        } else {
            Some(Self { questions })
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// The planned question for a cursor: `script[cursor mod N]`.
    pub fn planned(&self, cursor: u64) -> &str {
        let idx = (cursor % self.questions.len() as u64) as usize;
        &self.questions[idx]
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::core()
    }
}
