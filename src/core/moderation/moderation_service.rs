// Warning escalation service - core business logic for moderation.
//
// This service handles:
// - Recording warnings against a user (atomic increment-and-read)
// - Escalating repeated warnings into a ban at a configurable threshold
// - Cascading a ban into delisting the user's items
//
// NO storage dependencies here - just the port trait and domain logic.

use super::moderation_models::{ModerationConfig, UserRecord, WarningOutcome};
use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum ModerationError {
    /// Wraps the underlying storage error. Logged internally; callers show
    /// users a generic failure, never this text.
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Unknown user: {0}")]
    UserNotFound(i64),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

/// Trait for persisting moderation state.
///
/// Following the same pattern as the session store: the core defines the
/// contract, infra supplies SQLite and in-memory implementations.
#[async_trait]
pub trait ModerationStore: Send + Sync {
    /// Record a warning for a user and return the outcome.
    ///
    /// The increment, the post-increment threshold check, and - when the
    /// threshold is reached - the ban plus item delisting must form one
    /// atomic unit: concurrent warnings for the same user may not lose
    /// updates, and no caller may ever observe a warning applied without
    /// its ban check, or a ban without its cascade. On failure the whole
    /// operation is rolled back and the warning counts as not applied.
    async fn issue_warning(
        &self,
        user_id: i64,
        reason: &str,
        ban_threshold: u32,
    ) -> Result<WarningOutcome, ModerationError>;

    /// Ban a user outright: set the ban flag, record the reason and
    /// timestamp, and mark every item they own unavailable, as a single
    /// durable operation.
    async fn ban_user(&self, user_id: i64, reason: &str) -> Result<(), ModerationError>;

    /// Look up a user by id.
    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, ModerationError>;
}

// Stores are often shared between this service and the session store, so
// let an Arc'd store satisfy the trait directly.
#[async_trait]
impl<S: ModerationStore> ModerationStore for std::sync::Arc<S> {
    async fn issue_warning(
        &self,
        user_id: i64,
        reason: &str,
        ban_threshold: u32,
    ) -> Result<WarningOutcome, ModerationError> {
        (**self).issue_warning(user_id, reason, ban_threshold).await
    }

    async fn ban_user(&self, user_id: i64, reason: &str) -> Result<(), ModerationError> {
        (**self).ban_user(user_id, reason).await
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, ModerationError> {
        (**self).get_user(user_id).await
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Escalation service: converts repeated policy violations into a ban.
pub struct ModerationService<S: ModerationStore> {
    store: S,
    config: ModerationConfig,
}

impl<S: ModerationStore> ModerationService<S> {
    /// Create a service with the default escalation config (ban at 3).
    pub fn new(store: S) -> Self {
        Self::with_config(store, ModerationConfig::default())
    }

    pub fn with_config(store: S, config: ModerationConfig) -> Self {
        Self { store, config }
    }

    /// Issue a warning to a user.
    ///
    /// If the post-increment count reaches the ban threshold, the user is
    /// banned and their items delisted as part of the same operation. A
    /// storage failure leaves the warning unapplied, so callers can safely
    /// retry.
    pub async fn issue_warning(
        &self,
        user_id: i64,
        reason: &str,
    ) -> Result<WarningOutcome, ModerationError> {
        let outcome = self
            .store
            .issue_warning(user_id, reason, self.config.ban_threshold)
            .await?;

        if outcome.banned {
            tracing::warn!(
                user_id,
                warning_count = outcome.warning_count,
                reason,
                "user banned after repeated warnings"
            );
        } else {
            tracing::info!(
                user_id,
                warning_count = outcome.warning_count,
                reason,
                "warning issued"
            );
        }

        Ok(outcome)
    }

    /// Ban a user directly (admin action), delisting their items.
    pub async fn ban_user(&self, user_id: i64, reason: &str) -> Result<(), ModerationError> {
        self.store.ban_user(user_id, reason).await?;
        tracing::warn!(user_id, reason, "user banned");
        Ok(())
    }

    /// Current warning count for a user (for the moderation UI).
    pub async fn warning_count(&self, user_id: i64) -> Result<u32, ModerationError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(ModerationError::UserNotFound(user_id))?;
        Ok(user.warning_count)
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, ModerationError> {
        self.store.get_user(user_id).await
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use dashmap::DashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// In-memory store for testing. Per-user atomicity comes from holding
    /// the DashMap entry guard across the increment and the ban check.
    #[derive(Default)]
    struct MockModerationStore {
        users: DashMap<i64, UserRecord>,
        items: DashMap<i64, (i64, bool)>, // item_id -> (seller_id, is_available)
        fail_storage: AtomicBool,
    }

    impl MockModerationStore {
        fn with_user(user_id: i64) -> Self {
            let store = Self::default();
            store.users.insert(
                user_id,
                UserRecord {
                    id: user_id,
                    email: format!("user{}@campus.edu", user_id),
                    display_name: format!("User {}", user_id),
                    warning_count: 0,
                    is_banned: false,
                    ban_reason: None,
                    created_at: Utc::now(),
                },
            );
            store
        }

        fn add_item(&self, item_id: i64, seller_id: i64) {
            self.items.insert(item_id, (seller_id, true));
        }

        fn item_available(&self, item_id: i64) -> bool {
            self.items.get(&item_id).map(|i| i.1).unwrap()
        }

        fn delist_items(&self, seller_id: i64) {
            for mut item in self.items.iter_mut() {
                if item.0 == seller_id {
                    item.1 = false;
                }
            }
        }
    }

    #[async_trait]
    impl ModerationStore for MockModerationStore {
        async fn issue_warning(
            &self,
            user_id: i64,
            reason: &str,
            ban_threshold: u32,
        ) -> Result<WarningOutcome, ModerationError> {
            if self.fail_storage.load(Ordering::SeqCst) {
                return Err(ModerationError::StorageError("disk on fire".to_string()));
            }
            let mut user = self
                .users
                .get_mut(&user_id)
                .ok_or(ModerationError::UserNotFound(user_id))?;

            user.warning_count += 1;
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

    #[tokio::test]
    async fn warnings_below_threshold_do_not_ban() {
        let service = ModerationService::new(MockModerationStore::with_user(1));

        let first = service.issue_warning(1, "spam listing").await.unwrap();
        assert_eq!(first, WarningOutcome { warning_count: 1, banned: false });

        let second = service.issue_warning(1, "rude message").await.unwrap();
        assert_eq!(second, WarningOutcome { warning_count: 2, banned: false });
    }

    #[tokio::test]
    async fn third_warning_bans_and_delists() {
        let store = MockModerationStore::with_user(7);
        store.add_item(100, 7);
        store.add_item(101, 7);
        store.add_item(102, 99); // someone else's item
        let service = ModerationService::new(store);

        for _ in 0..2 {
            let outcome = service.issue_warning(7, "profanity").await.unwrap();
            assert!(!outcome.banned);
        }
        let third = service.issue_warning(7, "profanity").await.unwrap();
        assert_eq!(third, WarningOutcome { warning_count: 3, banned: true });

        let user = service.get_user(7).await.unwrap().unwrap();
        assert!(user.is_banned);
        assert_eq!(user.warning_count, 3);

        // Ban cascades to the user's items only.
        let store = &service.store;
        assert!(!store.item_available(100));
        assert!(!store.item_available(101));
        assert!(store.item_available(102));
    }

    #[tokio::test]
    async fn warnings_keep_counting_after_ban() {
        let service = ModerationService::new(MockModerationStore::with_user(1));

        for _ in 0..3 {
            service.issue_warning(1, "spam").await.unwrap();
        }
        let fourth = service.issue_warning(1, "spam").await.unwrap();
        assert_eq!(fourth, WarningOutcome { warning_count: 4, banned: true });
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_warnings_are_all_counted() {
        let service = Arc::new(ModerationService::new(MockModerationStore::with_user(1)));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.issue_warning(1, "spam").await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(service.warning_count(1).await.unwrap(), 16);
        assert!(service.get_user(1).await.unwrap().unwrap().is_banned);
    }

    #[tokio::test]
    async fn direct_ban_delists_items() {
        let store = MockModerationStore::with_user(5);
        store.add_item(1, 5);
        let service = ModerationService::new(store);

        service.ban_user(5, "fraudulent listings").await.unwrap();

        let user = service.get_user(5).await.unwrap().unwrap();
        assert!(user.is_banned);
        assert_eq!(user.ban_reason.as_deref(), Some("fraudulent listings"));
        assert!(!service.store.item_available(1));
    }

    #[tokio::test]
    async fn storage_failure_leaves_warning_unapplied() {
        let store = MockModerationStore::with_user(1);
        store.fail_storage.store(true, Ordering::SeqCst);
        let service = ModerationService::new(store);

        let result = service.issue_warning(1, "spam").await;
        assert!(matches!(result, Err(ModerationError::StorageError(_))));

        // Safe to retry once storage recovers.
        service.store.fail_storage.store(false, Ordering::SeqCst);
        let outcome = service.issue_warning(1, "spam").await.unwrap();
        assert_eq!(outcome.warning_count, 1);
    }

    #[tokio::test]
    async fn warning_unknown_user_fails() {
        let service = ModerationService::new(MockModerationStore::default());
        let result = service.issue_warning(42, "spam").await;
        assert!(matches!(result, Err(ModerationError::UserNotFound(42))));
    }

    #[tokio::test]
    async fn custom_threshold_is_respected() {
        let service = ModerationService::with_config(
            MockModerationStore::with_user(1),
            ModerationConfig { ban_threshold: 1 },
        );

        let outcome = service.issue_warning(1, "zero tolerance").await.unwrap();
        assert_eq!(outcome, WarningOutcome { warning_count: 1, banned: true });
    }
}
