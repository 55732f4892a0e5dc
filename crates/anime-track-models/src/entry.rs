use serde::{Deserialize, Serialize};

use crate::status::WatchStatus;

/// A user's tracking record for one title.
///
/// Keyed by (user_id, title_id). `title_name` is fixed at creation and
/// only used for display and name-based lookup; `alias` is the short
/// mutable handle commands resolve against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackedEntry {
    pub user_id: i64,
    pub title_id: i32,
    pub title_name: String,
    pub alias: String,
    /// Last episode the user confirmed watching. Only ever set by an
    /// explicit progress update, never by the scheduler.
    pub last_watched: i32,
    /// Highest episode number already announced. Monotonically
    /// non-decreasing; episodes at or below this are never re-announced.
    pub last_notified: i32,
    pub status: WatchStatus,
}

impl TrackedEntry {
    /// Derive a default alias from the title's word initials,
    /// e.g. "Fullmetal Alchemist Brotherhood" -> "FAB".
    pub fn derive_alias(title: &str) -> String {
        title
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .collect::<String>()
            .to_uppercase()
    }
}

/// The scheduler's scan row: just the key and the two watermarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchRef {
    pub user_id: i64,
    pub title_id: i32,
    pub last_watched: i32,
    pub last_notified: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_alias_initials() {
        assert_eq!(TrackedEntry::derive_alias("Fullmetal Alchemist Brotherhood"), "FAB");
        assert_eq!(TrackedEntry::derive_alias("one piece"), "OP");
    }

    #[test]
    fn test_derive_alias_single_word() {
        assert_eq!(TrackedEntry::derive_alias("Monster"), "M");
    }

    #[test]
    fn test_derive_alias_empty() {
        assert_eq!(TrackedEntry::derive_alias("   "), "");
    }
}
