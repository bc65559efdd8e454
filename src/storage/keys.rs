// Logical storage keys, one set per user

use crate::identity::UserId;

const KEY_PREFIX: &str = "@psych_insight";

/// Every kind of value stored for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    ConversationHistory,
    UserPreferences,
    CurrentSession,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [
        StorageKey::ConversationHistory,
        StorageKey::UserPreferences,
        StorageKey::CurrentSession,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            StorageKey::ConversationHistory => "conversation_history",
            StorageKey::UserPreferences => "user_preferences",
            StorageKey::CurrentSession => "current_session",
        }
    }

    /// Full backend key for a user, e.g. `@psych_insight:current_session_<uid>`.
    pub fn for_user(&self, user: &UserId) -> String {
        format!("{}:{}_{}", KEY_PREFIX, self.as_str(), user.as_str())
    }

    /// All backend keys belonging to a user.
    pub fn all_for_user(user: &UserId) -> Vec<String> {
        Self::ALL.iter().map(|k| k.for_user(user)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let user = UserId::new("abc123").unwrap();
        assert_eq!(
            StorageKey::ConversationHistory.for_user(&user),
            "@psych_insight:conversation_history_abc123"
        );
        assert_eq!(
            StorageKey::CurrentSession.for_user(&user),
            "@psych_insight:current_session_abc123"
        );
    }

    #[test]
    fn test_all_keys_are_distinct() {
        let user = UserId::new("u").unwrap();
        let keys = StorageKey::all_for_user(&user);
        assert_eq!(keys.len(), 3);
        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
    }
}
