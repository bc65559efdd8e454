// Session store
//
// Typed, per-user persistence of the transcript, the cursor/question position
// and user preferences, layered over any `KvBackend`. Values are stored as
// JSON text so they stay readable by other clients.

mod backend;
mod keys;
mod sqlite;

pub use backend::{KvBackend, MemoryBackend};
pub use keys::StorageKey;
pub use sqlite::SqliteBackend;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::errors::StoreError;
use crate::identity::UserId;
use crate::interview::{Preferences, SessionPosition, TranscriptEntry};

/// Per-user interview persistence.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KvBackend>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Store backed by a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub async fn save_transcript(
        &self,
        user: &UserId,
        transcript: &[TranscriptEntry],
    ) -> Result<(), StoreError> {
        self.put(&StorageKey::ConversationHistory.for_user(user), transcript)
            .await
    }

    /// Stored transcript, or an empty list when none exists.
    pub async fn load_transcript(&self, user: &UserId) -> Result<Vec<TranscriptEntry>, StoreError> {
        Ok(self
            .fetch(&StorageKey::ConversationHistory.for_user(user))
            .await?
            .unwrap_or_default())
    }

    pub async fn save_position(
        &self,
        user: &UserId,
        position: &SessionPosition,
    ) -> Result<(), StoreError> {
        self.put(&StorageKey::CurrentSession.for_user(user), position)
            .await
    }

    pub async fn load_position(&self, user: &UserId) -> Result<Option<SessionPosition>, StoreError> {
        self.fetch(&StorageKey::CurrentSession.for_user(user)).await
    }

    pub async fn save_preferences(
        &self,
        user: &UserId,
        preferences: &Preferences,
    ) -> Result<(), StoreError> {
        self.put(&StorageKey::UserPreferences.for_user(user), preferences)
            .await
    }

    /// Stored preferences, or defaults when none exist.
    pub async fn load_preferences(&self, user: &UserId) -> Result<Preferences, StoreError> {
        Ok(self
            .fetch(&StorageKey::UserPreferences.for_user(user))
            .await?
            .unwrap_or_default())
    }

    /// Remove every key belonging to the user.
    pub async fn erase_all(&self, user: &UserId) -> Result<(), StoreError> {
        tracing::info!(user = %user.log_tag(), "Erasing all stored interview data");
        self.backend.remove(&StorageKey::all_for_user(user)).await
    }

    async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;
        self.backend.set(key, &json).await
    }

    async fn fetch<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(json) = self.backend.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StoreError::Serialization {
                key: key.to_string(),
                source,
            })
    }
}
