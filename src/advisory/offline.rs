// Script-only classifier used when no API key is configured

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::AdvisoryClassifier;
use crate::errors::AdvisoryError;
use crate::interview::decision::CONTINUE_SENTINEL;
use crate::interview::ClassificationRequest;

/// Always answers with the continue sentinel, so the interview follows the
/// script without follow-ups.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineClassifier;

#[async_trait]
impl AdvisoryClassifier for OfflineClassifier {
    async fn classify(
        &self,
        _request: &ClassificationRequest,
        cancel: &CancellationToken,
    ) -> Result<Option<String>, AdvisoryError> {
        if cancel.is_cancelled() {
            return Err(AdvisoryError::Cancelled);
        }
        Ok(Some(CONTINUE_SENTINEL.to_string()))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::AdvisoryDecision;

    #[tokio::test]
    async fn test_offline_always_continues() {
        let request = ClassificationRequest {
            last_answer: "A long and heartfelt answer about my childhood".to_string(),
            current_question: "q".to_string(),
            planned_next: "n".to_string(),
        };
        let reply = OfflineClassifier
            .classify(&request, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            AdvisoryDecision::from_response(reply.as_deref()),
            AdvisoryDecision::Continue
        );
    }
}
