pub mod error;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use anime_track_models::{TrackedEntry, WatchRef, WatchStatus};

pub use error::StoreError;
pub use memory::MemStore;
pub use postgres::PgStore;

/// Durable per-user-per-title tracking records.
///
/// Update and delete operations against a nonexistent (user, title)
/// pair are no-ops; presence checking is the caller's job via
/// [`TrackingStore::resolve`]. Connectivity failures surface as
/// [`StoreError::Unavailable`] and are never conflated with "not found".
#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Create a tracking entry. Idempotent: an existing (user, title)
    /// row is left untouched. Rejects [`StoreError::AliasTaken`] when
    /// the alias already names a different title of the same user.
    async fn create(
        &self,
        user_id: i64,
        title_id: i32,
        title_name: &str,
        alias: &str,
        start_episode: i32,
        status: WatchStatus,
    ) -> Result<(), StoreError>;

    /// Look up one entry by alias or title name (alias wins), exact
    /// match, case-sensitive.
    async fn resolve(&self, user_id: i64, identifier: &str)
        -> Result<Option<TrackedEntry>, StoreError>;

    async fn list_aliases(&self, user_id: i64) -> Result<Vec<String>, StoreError>;

    /// All of a user's entries, ordered by title name ascending.
    async fn list_entries(&self, user_id: i64) -> Result<Vec<TrackedEntry>, StoreError>;

    /// Record the last watched episode and force status back to
    /// watching. Never touches the notification watermark.
    async fn set_progress(&self, user_id: i64, title_id: i32, episode: i32)
        -> Result<(), StoreError>;

    async fn set_status(&self, user_id: i64, title_id: i32, status: WatchStatus)
        -> Result<(), StoreError>;

    async fn set_alias(&self, user_id: i64, title_id: i32, new_alias: &str)
        -> Result<(), StoreError>;

    /// Advance the notification watermark. Scheduler-only. A value at
    /// or below the current watermark is a silent no-op; the watermark
    /// never moves backwards. Never touches `last_watched`.
    async fn set_notified_watermark(&self, user_id: i64, title_id: i32, episode: i32)
        -> Result<(), StoreError>;

    async fn remove(&self, user_id: i64, title_id: i32) -> Result<(), StoreError>;

    /// Full-table scan for the scheduler: one consistent snapshot of
    /// every entry's key and watermarks.
    async fn all_entries(&self) -> Result<Vec<WatchRef>, StoreError>;
}
