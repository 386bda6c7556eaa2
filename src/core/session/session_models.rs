// Session domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored session binding: opaque token -> user, with expiry.
///
/// Sessions are Active until they expire (checked lazily at verify time)
/// or are revoked; both states are terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: i64,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remember: bool,
}

/// What the caller gets back from a successful login: the token to hand to
/// the client, and when it stops working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Session lifetime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Lifetime of a normal session, in days.
    pub session_ttl_days: i64,
    /// Lifetime when the user checked "remember me", in days.
    pub remember_ttl_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl_days: 7,
            remember_ttl_days: 30,
        }
    }
}
