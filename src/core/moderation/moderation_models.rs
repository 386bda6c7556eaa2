// Moderation domain models - data structures for warning escalation.
//
// These are pure domain types with no storage dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A marketplace user as the moderation core sees them.
///
/// `warning_count` only ever increases, and `is_banned` implies that none
/// of the user's items are available. There is no unban path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub warning_count: u32,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Outcome of issuing a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarningOutcome {
    /// The user's warning count after this warning was recorded.
    pub warning_count: u32,
    /// Whether the user is banned after this warning (either newly banned
    /// by crossing the threshold, or already banned before it).
    pub banned: bool,
}

/// Configuration for warning escalation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Number of warnings at which a user is banned.
    pub ban_threshold: u32,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self { ban_threshold: 3 }
    }
}
