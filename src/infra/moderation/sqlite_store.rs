// SQLite-backed moderation store.
//
// Tables:
// - users: account data plus warning count and ban flag
// - user_warnings: one row per issued warning (reason + timestamp)
// - items: marketplace listings; only `is_available` is touched here
//
// The warn -> threshold check -> ban -> delist chain runs inside a single
// transaction, so concurrent warnings serialize on the database and a
// failure rolls the whole escalation back.

use crate::core::moderation::{ModerationError, ModerationStore, UserRecord, WarningOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;

pub struct SqliteModerationStore {
    pool: Pool<Sqlite>,
}

impl SqliteModerationStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Open (creating the file if needed) and migrate a database at the
    /// given URL or path.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = open_sqlite_pool(database_url).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                display_name TEXT NOT NULL,
                warning_count INTEGER NOT NULL DEFAULT 0,
                is_banned BOOLEAN NOT NULL DEFAULT 0,
                ban_reason TEXT,
                banned_at TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_warnings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                reason TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_user_warnings_user
                ON user_warnings(user_id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                seller_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                is_available BOOLEAN NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_items_seller
                ON items(seller_id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    /// Insert a user (registration path in the embedding app; also the
    /// test fixture).
    pub async fn create_user(
        &self,
        email: &str,
        display_name: &str,
    ) -> Result<UserRecord, ModerationError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (email, display_name, created_at) VALUES (?, ?, ?)",
        )
        .bind(email)
        .bind(display_name)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(UserRecord {
            id: result.last_insert_rowid(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            warning_count: 0,
            is_banned: false,
            ban_reason: None,
            created_at: now,
        })
    }

    /// Insert an item for a seller, returning its id.
    pub async fn create_item(&self, seller_id: i64, title: &str) -> Result<i64, ModerationError> {
        let result = sqlx::query(
            "INSERT INTO items (seller_id, title, created_at) VALUES (?, ?, ?)",
        )
        .bind(seller_id)
        .bind(title)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(result.last_insert_rowid())
    }

    pub async fn item_is_available(&self, item_id: i64) -> Result<bool, ModerationError> {
        let row = sqlx::query("SELECT is_available FROM items WHERE id = ?")
            .bind(item_id)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.get("is_available"))
    }
}

#[async_trait]
impl ModerationStore for SqliteModerationStore {
    async fn issue_warning(
        &self,
        user_id: i64,
        reason: &str,
        ban_threshold: u32,
    ) -> Result<WarningOutcome, ModerationError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query("INSERT INTO user_warnings (user_id, reason, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(reason)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        let updated = sqlx::query("UPDATE users SET warning_count = warning_count + 1 WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        if updated.rows_affected() == 0 {
            // Dropping the uncommitted transaction rolls everything back.
            return Err(ModerationError::UserNotFound(user_id));
        }

        let row = sqlx::query("SELECT warning_count, is_banned FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(storage_err)?;
        let warning_count = row.get::<i64, _>("warning_count") as u32;
        let mut banned: bool = row.get("is_banned");

        if warning_count >= ban_threshold && !banned {
            sqlx::query("UPDATE users SET is_banned = 1, ban_reason = ?, banned_at = ? WHERE id = ?")
                .bind(reason)
                .bind(&now)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;

            sqlx::query("UPDATE items SET is_available = 0 WHERE seller_id = ?")
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;

            banned = true;
        }

        tx.commit().await.map_err(storage_err)?;

        Ok(WarningOutcome {
            warning_count,
            banned,
        })
    }

    async fn ban_user(&self, user_id: i64, reason: &str) -> Result<(), ModerationError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let updated = sqlx::query(
            "UPDATE users SET is_banned = 1, ban_reason = ?, banned_at = ? WHERE id = ?",
        )
        .bind(reason)
        .bind(Utc::now().to_rfc3339())
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;
        if updated.rows_affected() == 0 {
            return Err(ModerationError::UserNotFound(user_id));
        }

        sqlx::query("UPDATE items SET is_available = 0 WHERE seller_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, ModerationError> {
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

fn storage_err(e: sqlx::Error) -> ModerationError {
    ModerationError::StorageError(e.to_string())
}

pub(crate) fn row_to_user(row: sqlx::sqlite::SqliteRow) -> UserRecord {
    let created_at_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        warning_count: row.get::<i64, _>("warning_count") as u32,
        is_banned: row.get("is_banned"),
        ban_reason: row.get("ban_reason"),
        created_at,
    }
}

/// Open a SQLite pool, creating the database file (and parent directories)
/// if it does not exist yet.
pub(crate) async fn open_sqlite_pool(database_url: &str) -> anyhow::Result<Pool<Sqlite>> {
    // Both `sqlite://foo.db` and the bare `sqlite:foo.db` form name foo.db.
    let path_str = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    if !database_url.contains(":memory:") && !Path::new(path_str).exists() {
        if let Some(parent) = Path::new(path_str).parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::File::create(path_str)?;
    }

    let conn_str = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite://{}", database_url)
    };

    Ok(SqlitePoolOptions::new().connect(&conn_str).await?)
}
