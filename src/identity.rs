// Identity handed over by the external authentication subsystem
//
// The interview performs no authentication itself. It receives a user id and
// an "is authenticated" signal and refuses to run without an authenticated
// user.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::errors::InterviewError;

/// Non-blank user identifier used to key all stored state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Returns `None` for a blank id.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short SHA256 digest for logs, so ids never appear in clear.
    pub fn log_tag(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..12].to_string()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current user as reported by the auth boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    user_id: Option<UserId>,
    authenticated: bool,
}

impl UserIdentity {
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            authenticated: true,
        }
    }

    /// No signed-in user.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            authenticated: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated && self.user_id.is_some()
    }

    /// The user id, or `NotAuthenticated` when there is no signed-in user.
    pub fn require(&self) -> Result<&UserId, InterviewError> {
        match (&self.user_id, self.authenticated) {
            (Some(id), true) => Ok(id),
            _ => Err(InterviewError::NotAuthenticated),
        }
    }
}
