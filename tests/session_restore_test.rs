// Integration tests for resuming an interview from the SQLite session store

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use psyche::advisory::{AdvisoryClassifier, OfflineClassifier};
use psyche::errors::AdvisoryError;
use psyche::identity::{UserId, UserIdentity};
use psyche::interview::{ClassificationRequest, InterviewSession, SessionOptions, CORE_QUESTIONS};
use psyche::speech::SilentSpeech;
use psyche::storage::{KvBackend, SessionStore, SqliteBackend, StorageKey};

/// Always asks the same follow-up.
struct AlwaysFollowUp;

#[async_trait]
impl AdvisoryClassifier for AlwaysFollowUp {
    async fn classify(
        &self,
        _request: &ClassificationRequest,
        _cancel: &CancellationToken,
    ) -> Result<Option<String>, AdvisoryError> {
        Ok(Some("“What were you protecting yourself from?”".to_string()))
    }

    fn name(&self) -> &str {
        "follow-up"
    }
}

fn identity() -> UserIdentity {
    UserIdentity::authenticated(UserId::new("sqlite-user").unwrap())
}

async fn open_session(
    dir: &TempDir,
    classifier: Arc<dyn AdvisoryClassifier>,
) -> Result<InterviewSession> {
    let backend = SqliteBackend::open(dir.path().join("sessions.db"))?;
    let session = InterviewSession::start(
        &identity(),
        classifier,
        SessionStore::new(Arc::new(backend)),
        Arc::new(SilentSpeech),
        SessionOptions::default(),
    )
    .await?;
    Ok(session)
}

#[tokio::test]
async fn test_resume_restores_cursor_question_and_history() -> Result<()> {
    let dir = TempDir::new()?;

    {
        let session = open_session(&dir, Arc::new(OfflineClassifier)).await?;
        session.submit_answer("My rule is never to be late").await?;
        session.submit_answer("Traffic, always traffic").await?;
        session.close();
    }
    {
        let session = open_session(&dir, Arc::new(AlwaysFollowUp)).await?;
        assert_eq!(session.current_question().await, CORE_QUESTIONS[2]);
        let outcome = session.submit_answer("People who brag").await?;
        assert!(outcome.branched);
        assert_eq!(outcome.question, "What were you protecting yourself from?");
        session.close();
    }

    let session = open_session(&dir, Arc::new(OfflineClassifier)).await?;
    assert_eq!(session.current_question().await, "What were you protecting yourself from?");
    assert_eq!(session.status().await.cursor, 2);
    assert_eq!(session.status().await.branch_depth, 1);

    let history = session.history().await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].answer, "My rule is never to be late");
    assert_eq!(history[2].question, CORE_QUESTIONS[2]);
    Ok(())
}

#[tokio::test]
async fn test_stored_format_is_shared_json() -> Result<()> {
    let dir = TempDir::new()?;
    let session = open_session(&dir, Arc::new(OfflineClassifier)).await?;
    session.submit_answer("An answer").await?;
    session.toggle_audio().await;
    session.close();
    drop(session);

    let backend = SqliteBackend::open(dir.path().join("sessions.db"))?;
    let user = UserId::new("sqlite-user").unwrap();

    let raw = backend
        .get("@psych_insight:current_session_sqlite-user")
        .await?
        .expect("session value");
    let json: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(json["questionIndex"], 1);
    assert_eq!(json["questionText"], CORE_QUESTIONS[1]);

    let raw = backend
        .get(&StorageKey::ConversationHistory.for_user(&user))
        .await?
        .expect("history value");
    let json: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(json[0]["question"], CORE_QUESTIONS[0]);
    assert_eq!(json[0]["answer"], "An answer");
    assert!(json[0]["timestamp"].is_string());

    let raw = backend
        .get(&StorageKey::UserPreferences.for_user(&user))
        .await?
        .expect("preferences value");
    let json: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(json["audioEnabled"], false);
    assert_eq!(json["theme"], "dark");
    Ok(())
}

#[tokio::test]
async fn test_erase_all_clears_file_backed_store() -> Result<()> {
    let dir = TempDir::new()?;
    let session = open_session(&dir, Arc::new(OfflineClassifier)).await?;
    session.submit_answer("something").await?;
    session.erase_all().await?;
    session.close();
    drop(session);

    let backend = SqliteBackend::open(dir.path().join("sessions.db"))?;
    let user = UserId::new("sqlite-user").unwrap();
    for key in StorageKey::all_for_user(&user) {
        assert_eq!(backend.get(&key).await?, None, "{} should be erased", key);
    }
    Ok(())
}

#[tokio::test]
async fn test_resumes_history_written_by_other_client() -> Result<()> {
    let dir = TempDir::new()?;
    let history = r#"[{"question":"What do you avoid?","answer":"Conflict, mostly.","timestamp":"2025-01-02T03:04:05.000Z"}]"#;
    {
        let backend = SqliteBackend::open(dir.path().join("sessions.db"))?;
        backend
            .set("@psych_insight:conversation_history_sqlite-user", history)
            .await?;
        backend
            .set(
                "@psych_insight:current_session_sqlite-user",
                r#"{"questionIndex":1,"questionText":"Why conflict?"}"#,
            )
            .await?;
    }

    let session = open_session(&dir, Arc::new(OfflineClassifier)).await?;
    assert_eq!(session.history().await.len(), 1);
    assert_eq!(session.current_question().await, "Why conflict?");
    assert_eq!(session.progress().await.cycle, 0);

    session.submit_answer("Because it never ends well").await?;
    session.close();
    drop(session);

    let backend = SqliteBackend::open(dir.path().join("sessions.db"))?;
    let raw = backend
        .get("@psych_insight:conversation_history_sqlite-user")
        .await?
        .expect("history value");
    assert!(raw.starts_with(&history[..history.len() - 1]));
    let json: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(json.as_array().map(Vec::len), Some(2));
    Ok(())
}
