use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use anime_track_models::{TrackedEntry, WatchRef, WatchStatus};

use crate::error::StoreError;
use crate::TrackingStore;

/// In-memory tracking store with the same observable semantics as
/// [`crate::PgStore`]. Used by unit tests and local dry runs; the
/// single mutex makes `all_entries` a consistent snapshot.
#[derive(Default)]
pub struct MemStore {
    entries: Mutex<BTreeMap<(i64, i32), TrackedEntry>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn alias_taken(
        entries: &BTreeMap<(i64, i32), TrackedEntry>,
        user_id: i64,
        alias: &str,
        exclude_title: i32,
    ) -> bool {
        entries.values().any(|e| {
            e.user_id == user_id && e.alias == alias && e.title_id != exclude_title
        })
    }
}

#[async_trait]
impl TrackingStore for MemStore {
    async fn create(
        &self,
        user_id: i64,
        title_id: i32,
        title_name: &str,
        alias: &str,
        start_episode: i32,
        status: WatchStatus,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if entries.contains_key(&(user_id, title_id)) {
            return Ok(());
        }
        if Self::alias_taken(&entries, user_id, alias, title_id) {
            return Err(StoreError::AliasTaken {
                alias: alias.to_string(),
            });
        }
        entries.insert(
            (user_id, title_id),
            TrackedEntry {
                user_id,
                title_id,
                title_name: title_name.to_string(),
                alias: alias.to_string(),
                last_watched: start_episode,
                last_notified: start_episode,
                status,
            },
        );
        Ok(())
    }

    async fn resolve(
        &self,
        user_id: i64,
        identifier: &str,
    ) -> Result<Option<TrackedEntry>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let by_alias = entries
            .values()
            .find(|e| e.user_id == user_id && e.alias == identifier);
        let found = by_alias.or_else(|| {
            entries
                .values()
                .find(|e| e.user_id == user_id && e.title_name == identifier)
        });
        Ok(found.cloned())
    }

    async fn list_aliases(&self, user_id: i64) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .values()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.alias.clone())
            .collect())
    }

    async fn list_entries(&self, user_id: i64) -> Result<Vec<TrackedEntry>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut out: Vec<TrackedEntry> = entries
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.title_name.cmp(&b.title_name));
        Ok(out)
    }

    async fn set_progress(
        &self,
        user_id: i64,
        title_id: i32,
        episode: i32,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get_mut(&(user_id, title_id)) {
            entry.last_watched = episode;
            entry.status = WatchStatus::Watching;
        }
        Ok(())
    }

    async fn set_status(
        &self,
        user_id: i64,
        title_id: i32,
        status: WatchStatus,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get_mut(&(user_id, title_id)) {
            entry.status = status;
        }
        Ok(())
    }

    async fn set_alias(
        &self,
        user_id: i64,
        title_id: i32,
        new_alias: &str,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        // Missing row: plain no-op, even when the alias would collide.
        if !entries.contains_key(&(user_id, title_id)) {
            return Ok(());
        }
        if Self::alias_taken(&entries, user_id, new_alias, title_id) {
            return Err(StoreError::AliasTaken {
                alias: new_alias.to_string(),
            });
        }
        if let Some(entry) = entries.get_mut(&(user_id, title_id)) {
            entry.alias = new_alias.to_string();
        }
        Ok(())
    }

    async fn set_notified_watermark(
        &self,
        user_id: i64,
        title_id: i32,
        episode: i32,
    ) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get_mut(&(user_id, title_id)) {
            if entry.last_notified < episode {
                entry.last_notified = episode;
            }
        }
        Ok(())
    }

    async fn remove(&self, user_id: i64, title_id: i32) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(&(user_id, title_id));
        Ok(())
    }

    async fn all_entries(&self) -> Result<Vec<WatchRef>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        Ok(entries
            .values()
            .map(|e| WatchRef {
                user_id: e.user_id,
                title_id: e.title_id,
                last_watched: e.last_watched,
                last_notified: e.last_notified,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_entry(alias: &str) -> MemStore {
        let store = MemStore::new();
        store
            .create(1, 100, "Steins;Gate", alias, 0, WatchStatus::Watching)
            .await
            .expect("create");
        store
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let store = store_with_entry("SG").await;
        store.set_progress(1, 100, 12).await.expect("progress");

        // Second create with different values must leave the original
        // row untouched.
        store
            .create(1, 100, "Steins;Gate", "OTHER", 3, WatchStatus::Paused)
            .await
            .expect("re-create");

        let entry = store.resolve(1, "SG").await.expect("resolve").expect("entry");
        assert_eq!(entry.last_watched, 12);
        assert_eq!(entry.alias, "SG");
        assert_eq!(entry.status, WatchStatus::Watching);

        assert_eq!(store.list_entries(1).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_create_starts_both_watermarks_at_start_episode() {
        let store = MemStore::new();
        store
            .create(1, 100, "Gintama", "GIN", 5, WatchStatus::Watching)
            .await
            .expect("create");
        let entry = store.resolve(1, "GIN").await.expect("resolve").expect("entry");
        assert_eq!(entry.last_watched, 5);
        assert_eq!(entry.last_notified, 5);
    }

    #[tokio::test]
    async fn test_resolve_by_alias_and_name() {
        let store = store_with_entry("SG").await;
        let by_alias = store.resolve(1, "SG").await.expect("resolve");
        let by_name = store.resolve(1, "Steins;Gate").await.expect("resolve");
        assert_eq!(by_alias, by_name);
        assert!(by_alias.is_some());
    }

    #[tokio::test]
    async fn test_resolve_unknown_is_none() {
        let store = store_with_entry("SG").await;
        assert!(store.resolve(1, "nope").await.expect("resolve").is_none());
        // Another user's identifiers do not leak across scopes
        assert!(store.resolve(2, "SG").await.expect("resolve").is_none());
    }

    #[tokio::test]
    async fn test_alias_match_wins_over_name_match() {
        let store = MemStore::new();
        store
            .create(1, 100, "Monster", "M", 0, WatchStatus::Watching)
            .await
            .expect("create");
        // A second title whose alias collides with the first one's name
        store
            .create(1, 200, "Mushishi", "Monster", 0, WatchStatus::Watching)
            .await
            .expect("create");

        let entry = store.resolve(1, "Monster").await.expect("resolve").expect("entry");
        assert_eq!(entry.title_id, 200);
    }

    #[tokio::test]
    async fn test_set_progress_never_touches_watermark() {
        let store = store_with_entry("SG").await;
        store.set_notified_watermark(1, 100, 8).await.expect("watermark");
        store.set_progress(1, 100, 3).await.expect("progress");

        let entry = store.resolve(1, "SG").await.expect("resolve").expect("entry");
        assert_eq!(entry.last_watched, 3);
        assert_eq!(entry.last_notified, 8);
    }

    #[tokio::test]
    async fn test_set_progress_forces_watching() {
        let store = store_with_entry("SG").await;
        store.set_status(1, 100, WatchStatus::Dropped).await.expect("status");
        store.set_progress(1, 100, 4).await.expect("progress");

        let entry = store.resolve(1, "SG").await.expect("resolve").expect("entry");
        assert_eq!(entry.status, WatchStatus::Watching);
    }

    #[tokio::test]
    async fn test_watermark_is_monotone_and_never_touches_progress() {
        let store = store_with_entry("SG").await;
        store.set_progress(1, 100, 2).await.expect("progress");

        store.set_notified_watermark(1, 100, 6).await.expect("watermark");
        // Regression attempt is a silent no-op
        store.set_notified_watermark(1, 100, 4).await.expect("watermark");

        let entry = store.resolve(1, "SG").await.expect("resolve").expect("entry");
        assert_eq!(entry.last_notified, 6);
        assert_eq!(entry.last_watched, 2);
    }

    #[tokio::test]
    async fn test_set_status_visible_immediately() {
        let store = store_with_entry("SG").await;
        store
            .set_status(1, 100, WatchStatus::Completed)
            .await
            .expect("status");
        let entry = store.resolve(1, "SG").await.expect("resolve").expect("entry");
        assert_eq!(entry.status, WatchStatus::Completed);
    }

    #[tokio::test]
    async fn test_alias_conflict_on_create_and_rename() {
        let store = store_with_entry("SG").await;
        let clash = store
            .create(1, 200, "Serial Experiments Lain", "SG", 0, WatchStatus::Watching)
            .await;
        assert!(matches!(clash, Err(StoreError::AliasTaken { .. })));

        store
            .create(1, 200, "Serial Experiments Lain", "SEL", 0, WatchStatus::Watching)
            .await
            .expect("create");
        let rename = store.set_alias(1, 200, "SG").await;
        assert!(matches!(rename, Err(StoreError::AliasTaken { .. })));

        // Same alias for the same title is not a conflict
        store.set_alias(1, 200, "SEL").await.expect("self rename");

        // Different users may reuse the alias
        store
            .create(2, 300, "Another Show", "SG", 0, WatchStatus::Watching)
            .await
            .expect("cross-user alias");
    }

    #[tokio::test]
    async fn test_updates_on_missing_entry_are_noops() {
        let store = MemStore::new();
        store.set_progress(1, 100, 5).await.expect("progress");
        store.set_status(1, 100, WatchStatus::Dropped).await.expect("status");
        store.set_alias(1, 100, "X").await.expect("alias");
        store.set_notified_watermark(1, 100, 5).await.expect("watermark");
        store.remove(1, 100).await.expect("remove");
        assert!(store.all_entries().await.expect("scan").is_empty());
    }

    #[tokio::test]
    async fn test_set_alias_on_missing_entry_ignores_collision() {
        let store = store_with_entry("SG").await;
        // No row for title 999: no-op, not an AliasTaken error, even
        // though "SG" is in use.
        store.set_alias(1, 999, "SG").await.expect("noop");

        let entries = store.list_entries(1).await.expect("list");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].alias, "SG");
        assert_eq!(entries[0].title_id, 100);
    }

    #[tokio::test]
    async fn test_list_aliases_scoped_to_user() {
        let store = MemStore::new();
        store
            .create(1, 100, "Monster", "M", 0, WatchStatus::Watching)
            .await
            .expect("create");
        store
            .create(1, 200, "Mushishi", "MU", 0, WatchStatus::Watching)
            .await
            .expect("create");
        store
            .create(2, 300, "Akira", "A", 0, WatchStatus::Watching)
            .await
            .expect("create");

        let mut aliases = store.list_aliases(1).await.expect("aliases");
        aliases.sort();
        assert_eq!(aliases, vec!["M", "MU"]);
        assert!(store.list_aliases(3).await.expect("aliases").is_empty());
    }

    #[tokio::test]
    async fn test_list_entries_ordered_by_title() {
        let store = MemStore::new();
        for (id, name, alias) in [(1, "Zeta", "Z"), (2, "Akira", "A"), (3, "Mononoke", "MK")] {
            store
                .create(1, id, name, alias, 0, WatchStatus::Watching)
                .await
                .expect("create");
        }
        let names: Vec<String> = store
            .list_entries(1)
            .await
            .expect("list")
            .into_iter()
            .map(|e| e.title_name)
            .collect();
        assert_eq!(names, vec!["Akira", "Mononoke", "Zeta"]);
    }

    #[tokio::test]
    async fn test_remove_then_resolve_misses() {
        let store = store_with_entry("SG").await;
        store.remove(1, 100).await.expect("remove");
        assert!(store.resolve(1, "SG").await.expect("resolve").is_none());
    }

    #[tokio::test]
    async fn test_all_entries_exposes_watermarks() {
        let store = store_with_entry("SG").await;
        store.set_progress(1, 100, 2).await.expect("progress");
        store.set_notified_watermark(1, 100, 7).await.expect("watermark");

        let refs = store.all_entries().await.expect("scan");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].user_id, 1);
        assert_eq!(refs[0].title_id, 100);
        assert_eq!(refs[0].last_watched, 2);
        assert_eq!(refs[0].last_notified, 7);
    }
}
