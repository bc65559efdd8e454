// Advisory classifier
//
// After each answer the interview asks an external text-generation service
// whether to follow up or move on. Implementations own their retry policy;
// the sequencer only sees the final reply or `AdvisoryError`.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::errors::AdvisoryError;
use crate::interview::ClassificationRequest;

pub mod gemini;
pub mod offline;
pub mod prompt;
pub mod retry;

pub use gemini::GeminiClassifier;
pub use offline::OfflineClassifier;
pub use prompt::build_prompt;
pub use retry::{with_retry, RetryError, RetryPolicy, Sleeper, TokioSleeper};

/// Source of follow-up decisions.
#[async_trait]
pub trait AdvisoryClassifier: Send + Sync {
    /// Classify an answer and return the raw reply text.
    ///
    /// `Ok(None)` means the service answered without any text. Errors mean
    /// the service could not be reached within the retry policy, or that
    /// `cancel` fired.
    async fn classify(
        &self,
        request: &ClassificationRequest,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, AdvisoryError>;

    /// Short name for logs and status output.
    fn name(&self) -> &str;
}
