use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{debug, warn};

use anime_track_models::{TrackedEntry, WatchRef, WatchStatus};

use crate::error::StoreError;
use crate::TrackingStore;

/// Postgres-backed tracking store.
///
/// One `tracked_anime` table keyed by (user_id, anime_id). Connections
/// come from a bounded pool and are acquired per operation, never held
/// across catalog calls. `last_watched` and `last_notified` are
/// independent columns updated by single-field statements so
/// concurrent writers cannot clobber each other.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bootstrap the schema. Safe to call on every startup.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tracked_anime (
                user_id BIGINT,
                anime_id INTEGER,
                anime_name TEXT,
                alias TEXT,
                last_watched INTEGER DEFAULT 0,
                last_notified INTEGER DEFAULT 0,
                status TEXT DEFAULT 'watching',
                PRIMARY KEY (user_id, anime_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Backstop for the pre-insert alias check: two concurrent
        // creates with the same alias both pass the probe, but only
        // one can satisfy this index.
        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS tracked_anime_user_alias_idx
            ON tracked_anime (user_id, alias)
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn alias_taken(
        &self,
        user_id: i64,
        alias: &str,
        exclude_title: i32,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM tracked_anime
                WHERE user_id = $1 AND alias = $2 AND anime_id <> $3
            ) AS taken
            "#,
        )
        .bind(user_id)
        .bind(alias)
        .bind(exclude_title)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get::<bool, _>("taken"))
    }
}

fn is_alias_conflict(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.constraint() == Some("tracked_anime_user_alias_idx")
    )
}

fn entry_from_row(row: &sqlx::postgres::PgRow) -> TrackedEntry {
    let status_raw: String = row.get("status");
    let status = status_raw.parse::<WatchStatus>().unwrap_or_else(|e| {
        warn!(operation = "store_row_decode", error = %e, "Falling back to default status");
        WatchStatus::default()
    });

    TrackedEntry {
        user_id: row.get("user_id"),
        title_id: row.get("anime_id"),
        title_name: row.get("anime_name"),
        alias: row.get("alias"),
        last_watched: row.get("last_watched"),
        last_notified: row.get("last_notified"),
        status,
    }
}

#[async_trait]
impl TrackingStore for PgStore {
    async fn create(
        &self,
        user_id: i64,
        title_id: i32,
        title_name: &str,
        alias: &str,
        start_episode: i32,
        status: WatchStatus,
    ) -> Result<(), StoreError> {
        // Idempotent create: an existing (user, title) row wins over
        // any alias concern.
        let existing = sqlx::query(
            "SELECT 1 FROM tracked_anime WHERE user_id = $1 AND anime_id = $2",
        )
        .bind(user_id)
        .bind(title_id)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_some() {
            debug!(operation = "store_create", user_id, title_id, "Entry already tracked");
            return Ok(());
        }

        if self.alias_taken(user_id, alias, title_id).await? {
            return Err(StoreError::AliasTaken {
                alias: alias.to_string(),
            });
        }

        sqlx::query(
            r#"
            INSERT INTO tracked_anime
            (user_id, anime_id, anime_name, alias, last_watched, last_notified, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, anime_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(title_id)
        .bind(title_name)
        .bind(alias)
        .bind(start_episode)
        .bind(start_episode)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // A writer that raced past the alias_taken probe lands here.
            if is_alias_conflict(&e) {
                StoreError::AliasTaken {
                    alias: alias.to_string(),
                }
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    async fn resolve(
        &self,
        user_id: i64,
        identifier: &str,
    ) -> Result<Option<TrackedEntry>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, anime_id, anime_name, alias, last_watched, last_notified, status
            FROM tracked_anime
            WHERE user_id = $1
              AND (alias = $2 OR anime_name = $2)
            ORDER BY (alias = $2) DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(entry_from_row))
    }

    async fn list_aliases(&self, user_id: i64) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT alias FROM tracked_anime WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get("alias")).collect())
    }

    async fn list_entries(&self, user_id: i64) -> Result<Vec<TrackedEntry>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, anime_id, anime_name, alias, last_watched, last_notified, status
            FROM tracked_anime
            WHERE user_id = $1
            ORDER BY anime_name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(entry_from_row).collect())
    }

    async fn set_progress(
        &self,
        user_id: i64,
        title_id: i32,
        episode: i32,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE tracked_anime
            SET last_watched = $1, status = 'watching'
            WHERE user_id = $2 AND anime_id = $3
            "#,
        )
        .bind(episode)
        .bind(user_id)
        .bind(title_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_status(
        &self,
        user_id: i64,
        title_id: i32,
        status: WatchStatus,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE tracked_anime
            SET status = $1
            WHERE user_id = $2 AND anime_id = $3
            "#,
        )
        .bind(status.as_str())
        .bind(user_id)
        .bind(title_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_alias(
        &self,
        user_id: i64,
        title_id: i32,
        new_alias: &str,
    ) -> Result<(), StoreError> {
        // Missing row: plain no-op, even when the alias would collide.
        let existing = sqlx::query(
            "SELECT 1 FROM tracked_anime WHERE user_id = $1 AND anime_id = $2",
        )
        .bind(user_id)
        .bind(title_id)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_none() {
            return Ok(());
        }

        if self.alias_taken(user_id, new_alias, title_id).await? {
            return Err(StoreError::AliasTaken {
                alias: new_alias.to_string(),
            });
        }

        sqlx::query(
            r#"
            UPDATE tracked_anime
            SET alias = $1
            WHERE user_id = $2 AND anime_id = $3
            "#,
        )
        .bind(new_alias)
        .bind(user_id)
        .bind(title_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_alias_conflict(&e) {
                StoreError::AliasTaken {
                    alias: new_alias.to_string(),
                }
            } else {
                e.into()
            }
        })?;
        Ok(())
    }

    async fn set_notified_watermark(
        &self,
        user_id: i64,
        title_id: i32,
        episode: i32,
    ) -> Result<(), StoreError> {
        // The guard keeps the watermark monotone: a regressing value
        // matches no row and is a silent no-op.
        sqlx::query(
            r#"
            UPDATE tracked_anime
            SET last_notified = $1
            WHERE user_id = $2 AND anime_id = $3 AND last_notified < $1
            "#,
        )
        .bind(episode)
        .bind(user_id)
        .bind(title_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, user_id: i64, title_id: i32) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM tracked_anime WHERE user_id = $1 AND anime_id = $2")
            .bind(user_id)
            .bind(title_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn all_entries(&self) -> Result<Vec<WatchRef>, StoreError> {
        let rows = sqlx::query(
            "SELECT user_id, anime_id, last_watched, last_notified FROM tracked_anime",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| WatchRef {
                user_id: r.get("user_id"),
                title_id: r.get("anime_id"),
                last_watched: r.get("last_watched"),
                last_notified: r.get("last_notified"),
            })
            .collect())
    }
}
