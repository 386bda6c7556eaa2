// SQLite-backed session store.
//
// Holds the sessions table only; user lookups read the users table owned
// by the moderation store's migrations. Point both stores at the same
// pool (the normal wiring) so a ban is visible to `verify` immediately.

use crate::core::moderation::UserRecord;
use crate::core::session::{AuthError, SessionRecord, SessionStore};
use crate::infra::moderation::sqlite_store::{open_sqlite_pool, row_to_user};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteSessionStore {
    pool: Pool<Sqlite>,
}

impl SqliteSessionStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) and migrate a database at the given URL
    /// or path.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = open_sqlite_pool(database_url).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations to create the sessions table.
    pub async fn migrate(&self) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL,
                issued_at TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                remember BOOLEAN NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user
                ON sessions(user_id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    /// Drop all expired sessions. Not needed for correctness (expiry is
    /// checked at verify time); storage hygiene only.
    pub async fn sweep_expired(&self) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn insert_session(&self, record: SessionRecord) -> Result<(), AuthError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, issued_at, expires_at, remember)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.token)
        .bind(record.user_id)
        .bind(record.issued_at.to_rfc3339())
        .bind(record.expires_at.to_rfc3339())
        .bind(record.remember)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<SessionRecord>, AuthError> {
        let row = sqlx::query(
            "SELECT token, user_id, issued_at, expires_at, remember FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.map(|row| {
            let issued_at_str: String = row.get("issued_at");
            let expires_at_str: String = row.get("expires_at");
            SessionRecord {
                token: row.get("token"),
                user_id: row.get("user_id"),
                issued_at: parse_timestamp(&issued_at_str),
                expires_at: parse_timestamp(&expires_at_str),
                remember: row.get("remember"),
            }
        }))
    }

    async fn delete_session(&self, token: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query(
            "SELECT id, email, display_name, warning_count, is_banned, ban_reason, created_at \
             FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.map(row_to_user))
    }
}

fn storage_err(e: sqlx::Error) -> AuthError {
    AuthError::StorageError(e.to_string())
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
