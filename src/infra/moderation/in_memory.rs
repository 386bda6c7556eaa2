// In-memory implementation of ModerationStore, backed by DashMap.
//
// Useful for tests and local development; it implements the same trait as
// the SQLite store, so services cannot tell them apart. Per-user atomicity
// of the warn -> ban -> delist chain comes from holding the user's DashMap
// entry guard for the whole operation.

use crate::core::moderation::{ModerationError, ModerationStore, UserRecord, WarningOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Debug, Clone)]
struct StoredItem {
    seller_id: i64,
    is_available: bool,
}

#[derive(Debug, Clone)]
struct StoredWarning {
    reason: String,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct InMemoryModerationStore {
    users: DashMap<i64, UserRecord>,
    items: DashMap<i64, StoredItem>,
    warnings: DashMap<i64, Vec<StoredWarning>>,
    next_user_id: AtomicI64,
    next_item_id: AtomicI64,
}

impl InMemoryModerationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user, mirroring the SQLite store's registration helper.
    pub fn create_user(&self, email: &str, display_name: &str) -> UserRecord {
        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = UserRecord {
            id,
            email: email.to_string(),
            display_name: display_name.to_string(),
            warning_count: 0,
            is_banned: false,
            ban_reason: None,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        user
    }

    pub fn create_item(&self, seller_id: i64, _title: &str) -> i64 {
        let id = self.next_item_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.items.insert(
            id,
            StoredItem {
                seller_id,
                is_available: true,
            },
        );
        id
    }

    pub fn item_is_available(&self, item_id: i64) -> Option<bool> {
        self.items.get(&item_id).map(|item| item.is_available)
    }

    fn delist_items(&self, seller_id: i64) {
        for mut item in self.items.iter_mut() {
            if item.seller_id == seller_id {
                item.is_available = false;
            }
        }
    }

    fn record_warning(&self, user_id: i64, reason: &str) {
        self.warnings.entry(user_id).or_default().push(StoredWarning {
            reason: reason.to_string(),
            created_at: Utc::now(),
        });
    }
}

#[async_trait]
impl ModerationStore for InMemoryModerationStore {
    async fn issue_warning(
        &self,
        user_id: i64,
        reason: &str,
        ban_threshold: u32,
    ) -> Result<WarningOutcome, ModerationError> {
        // The entry guard serializes concurrent warnings for this user, so
        // the increment and the threshold check see a consistent count.
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or(ModerationError::UserNotFound(user_id))?;

        user.warning_count += 1;
        self.record_warning(user_id, reason);

        if user.warning_count >= ban_threshold && !user.is_banned {
            user.is_banned = true;
            user.ban_reason = Some(reason.to_string());
            self.delist_items(user_id);
        }

        Ok(WarningOutcome {
            warning_count: user.warning_count,
            banned: user.is_banned,
        })
    }

    async fn ban_user(&self, user_id: i64, reason: &str) -> Result<(), ModerationError> {
        let mut user = self
            .users
            .get_mut(&user_id)
            .ok_or(ModerationError::UserNotFound(user_id))?;

        user.is_banned = true;
        user.ban_reason = Some(reason.to_string());
        self.delist_items(user_id);
        Ok(())
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, ModerationError> {
        Ok(self.users.get(&user_id).map(|u| u.clone()))
    }
}
