// In-memory implementation of SessionStore, backed by DashMap.
//
// User lookups delegate to a shared in-memory moderation store, matching
// the SQLite wiring where both stores read the same users table. That is
// what keeps a fresh ban visible to `verify` without any cache.

use crate::core::moderation::{ModerationStore, UserRecord};
use crate::core::session::{AuthError, SessionRecord, SessionStore};
use crate::infra::moderation::InMemoryModerationStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

pub struct InMemorySessionStore {
    sessions: DashMap<String, SessionRecord>,
    users: Arc<InMemoryModerationStore>,
}

impl InMemorySessionStore {
    pub fn new(users: Arc<InMemoryModerationStore>) -> Self {
        Self {
            sessions: DashMap::new(),
            users,
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert_session(&self, record: SessionRecord) -> Result<(), AuthError> {
        self.sessions.insert(record.token.clone(), record);
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<SessionRecord>, AuthError> {
        Ok(self.sessions.get(token).map(|s| s.clone()))
    }

    async fn delete_session(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.remove(token);
        Ok(())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<UserRecord>, AuthError> {
        self.users
            .get_user(user_id)
            .await
            .map_err(|e| AuthError::StorageError(e.to_string()))
    }
}
