// Session authentication service - issues, verifies, and revokes the
// opaque tokens that authorize every mutating marketplace operation.
//
// Verification always re-reads the live user record so a ban issued after
// login takes effect on the very next request, not when the token expires.

use super::session_models::{IssuedSession, SessionConfig, SessionRecord};
use crate::core::moderation::UserRecord;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use thiserror::Error;

/// Length of generated session tokens, in alphanumeric characters.
/// 48 chars of [a-zA-Z0-9] is ~285 bits - not guessable.
pub const TOKEN_CHARS: usize = 48;

// ============================================================================
// ERRORS
// ============================================================================

/// Authentication failures. All of these map to a 401 at the route layer;
/// `Banned` may additionally be surfaced as a distinct "account suspended"
/// message.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token unknown: never issued, or revoked.
    #[error("Invalid session")]
    InvalidSession,

    /// Token known but past its expiry. Treated as absent; no renewal.
    #[error("Session expired")]
    Expired,

    /// The bound account is banned.
    #[error("Account suspended")]
    Banned,

    /// Wraps the underlying storage error. Never shown to end users.
    #[error("Storage error: {0}")]
    StorageError(String),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting session bindings.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_session(&self, record: SessionRecord) -> Result<(), AuthError>;

    async fn get_session(&self, token: &str) -> Result<Option<SessionRecord>, AuthError>;

    /// Delete a session. Deleting an unknown token is a no-op success, so
    /// revocation stays idempotent.
    async fn delete_session(&self, token: &str) -> Result<(), AuthError>;

    /// Look up the live user record a session is bound to.
    async fn find_user(&self, user_id: i64) -> Result<Option<UserRecord>, AuthError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Issues, verifies, and revokes opaque session tokens.
pub struct SessionService<S: SessionStore> {
    store: S,
    config: SessionConfig,
}

impl<S: SessionStore> SessionService<S> {
    /// Create a service with default lifetimes (7 days, 30 if remembered).
    pub fn new(store: S) -> Self {
        Self::with_config(store, SessionConfig::default())
    }

    pub fn with_config(store: S, config: SessionConfig) -> Self {
        Self { store, config }
    }

    /// Issue a new session for a user after login/registration.
    pub async fn issue(&self, user_id: i64, remember: bool) -> Result<IssuedSession, AuthError> {
        let now = Utc::now();
        let ttl_days = if remember {
            self.config.remember_ttl_days
        } else {
            self.config.session_ttl_days
        };
        let record = SessionRecord {
            token: generate_token(),
            user_id,
            issued_at: now,
            expires_at: now + Duration::days(ttl_days),
            remember,
        };

        self.store.insert_session(record.clone()).await?;
        tracing::debug!(user_id, remember, expires_at = %record.expires_at, "session issued");

        Ok(IssuedSession {
            token: record.token,
            expires_at: record.expires_at,
        })
    }

    /// Resolve a token to its user.
    ///
    /// Fails with `InvalidSession` for unknown/revoked tokens, `Expired`
    /// for stale ones (the row is dropped on detection - no background
    /// sweep needed), and `Banned` if the live user record carries the ban
    /// flag.
    pub async fn verify(&self, token: &str) -> Result<UserRecord, AuthError> {
        let session = self
            .store
            .get_session(token)
            .await?
            .ok_or(AuthError::InvalidSession)?;

        if Utc::now() >= session.expires_at {
            // Lazy expiry: evict on first sight. Eviction is storage
            // hygiene, not correctness, so a failure here must not mask
            // the expiry outcome.
            if let Err(e) = self.store.delete_session(token).await {
                tracing::warn!(error = %e, "failed to evict expired session");
            }
            return Err(AuthError::Expired);
        }

        let user = self
            .store
            .find_user(session.user_id)
            .await?
            .ok_or(AuthError::InvalidSession)?;

        if user.is_banned {
            return Err(AuthError::Banned);
        }

        Ok(user)
    }

    /// Revoke a session (logout). Idempotent: revoking an unknown or
    /// already-revoked token succeeds.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        self.store.delete_session(token).await?;
        tracing::debug!("session revoked");
        Ok(())
    }
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_CHARS)
        .map(char::from)
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
