// End-to-end tests: interview session driven by the Gemini client against a
// mock server, with backoff delays recorded instead of slept

use async_trait::async_trait;
use mockito::Matcher;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use psyche::advisory::{GeminiClassifier, RetryPolicy, Sleeper};
use psyche::identity::{UserId, UserIdentity};
use psyche::interview::{InterviewSession, SessionOptions, CORE_QUESTIONS};
use psyche::speech::SilentSpeech;
use psyche::storage::SessionStore;

#[derive(Default)]
struct InstantSleeper {
    slept: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

async fn session_against(url: &str, sleeper: Arc<InstantSleeper>) -> InterviewSession {
    let classifier = GeminiClassifier::new("test-key".to_string())
        .unwrap()
        .with_model("test-model")
        .with_base_url(url)
        .with_retry_policy(RetryPolicy::default())
        .with_sleeper(sleeper);

    InterviewSession::start(
        &UserIdentity::authenticated(UserId::new("u1").unwrap()),
        Arc::new(classifier),
        SessionStore::in_memory(),
        Arc::new(SilentSpeech),
        SessionOptions::default(),
    )
    .await
    .unwrap()
}

fn generate_path() -> Matcher {
    Matcher::Regex(r"^/models/test-model:generateContent".to_string())
}

#[tokio::test]
async fn test_outage_falls_back_after_full_schedule() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", generate_path())
        .with_status(500)
        .with_body("internal error")
        .expect(4)
        .create_async()
        .await;

    let sleeper = Arc::new(InstantSleeper::default());
    let session = session_against(&server.url(), sleeper.clone()).await;

    let outcome = session.submit_answer("A long and honest answer").await.unwrap();
    assert!(outcome.fallback);
    assert_eq!(outcome.cursor, 1);
    assert_eq!(outcome.question, CORE_QUESTIONS[1]);

    let slept = sleeper.slept.lock().unwrap().clone();
    assert_eq!(
        slept,
        vec![
            Duration::from_millis(1000),
            Duration::from_millis(2000),
            Duration::from_millis(4000),
            Duration::from_millis(8000),
        ]
    );
    assert_eq!(slept.iter().sum::<Duration>(), Duration::from_secs(15));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_follow_up_from_service_is_shown() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", generate_path())
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"candidates":[{"content":{"parts":[{"text":"\"What did your mother say?\"\n"}]}}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let sleeper = Arc::new(InstantSleeper::default());
    let session = session_against(&server.url(), sleeper.clone()).await;

    let outcome = session
        .submit_answer("My mother's voice is always in my head")
        .await
        .unwrap();
    assert!(outcome.branched);
    assert!(!outcome.fallback);
    assert_eq!(outcome.cursor, 0);
    assert_eq!(outcome.question, "What did your mother say?");
    assert!(sleeper.slept.lock().unwrap().is_empty());
    mock.assert_async().await;
}

/// Parks the retry loop in its first backoff until released.
#[derive(Default)]
struct GatedSleeper {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl Sleeper for GatedSleeper {
    async fn sleep(&self, _duration: Duration) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

#[tokio::test]
async fn test_transient_failure_then_sentinel() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("POST", generate_path())
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let sleeper = Arc::new(GatedSleeper::default());
    let classifier = GeminiClassifier::new("test-key".to_string())
        .unwrap()
        .with_model("test-model")
        .with_base_url(server.url())
        .with_sleeper(sleeper.clone());
    let session = Arc::new(
        InterviewSession::start(
            &UserIdentity::authenticated(UserId::new("u1").unwrap()),
            Arc::new(classifier),
            SessionStore::in_memory(),
            Arc::new(SilentSpeech),
            SessionOptions::default(),
        )
        .await
        .unwrap(),
    );

    let submit = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit_answer("fine").await })
    };

    // First attempt failed; swap in a healthy endpoint before the retry
    sleeper.entered.notified().await;
    failing.assert_async().await;
    failing.remove_async().await;
    let healthy = server
        .mock("POST", generate_path())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"NEXT_STANDARD"}]}}]}"#)
        .expect(1)
        .create_async()
        .await;
    sleeper.release.notify_one();

    let outcome = submit.await.unwrap().unwrap();
    assert!(!outcome.fallback);
    assert_eq!(outcome.cursor, 1);
    healthy.assert_async().await;
}
