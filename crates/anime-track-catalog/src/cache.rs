use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anime_track_models::CatalogSnapshot;

struct Slot {
    stored_at: Instant,
    snapshot: CatalogSnapshot,
}

/// In-memory snapshot cache keyed by title id.
///
/// An expired entry is equivalent to an absent one: the cache never
/// serves stale data, and a failed re-fetch does not fall back to it.
pub struct SnapshotCache {
    ttl: Duration,
    slots: Mutex<HashMap<i32, Slot>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, id: i32) -> Option<CatalogSnapshot> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        match slots.get(&id) {
            Some(slot) if slot.stored_at.elapsed() < self.ttl => Some(slot.snapshot.clone()),
            Some(_) => {
                slots.remove(&id);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, snapshot: CatalogSnapshot) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(
            snapshot.id,
            Slot {
                stored_at: Instant::now(),
                snapshot,
            },
        );
    }

    #[cfg(test)]
    fn backdate(&self, id: i32, age: Duration) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = slots.get_mut(&id) {
            slot.stored_at = Instant::now() - age;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anime_track_models::CoverArt;

    fn snapshot(id: i32) -> CatalogSnapshot {
        CatalogSnapshot {
            id,
            title: format!("Title {}", id),
            description: None,
            genres: vec![],
            episodes: Some(12),
            cover: CoverArt::default(),
            next_airing: None,
        }
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = SnapshotCache::new(Duration::from_secs(600));
        cache.insert(snapshot(1));
        assert_eq!(cache.get(1).map(|s| s.id), Some(1));
    }

    #[test]
    fn test_expired_entry_is_absent() {
        let cache = SnapshotCache::new(Duration::from_secs(600));
        cache.insert(snapshot(1));
        cache.backdate(1, Duration::from_secs(601));
        assert!(cache.get(1).is_none());
        // And it stays gone until re-inserted
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn test_miss_on_unknown_id() {
        let cache = SnapshotCache::new(Duration::from_secs(600));
        assert!(cache.get(42).is_none());
    }
}
