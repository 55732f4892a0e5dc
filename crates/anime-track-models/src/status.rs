use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Watch status values stored per tracked entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    /// Currently watching (the default for new entries)
    Watching,
    /// Finished watching
    Completed,
    /// Want to watch later
    WantToWatch,
    /// On hold
    Paused,
    /// Stopped watching
    Dropped,
}

impl WatchStatus {
    /// Stable string form used in the database TEXT column.
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Watching => "watching",
            WatchStatus::Completed => "completed",
            WatchStatus::WantToWatch => "want_to_watch",
            WatchStatus::Paused => "paused",
            WatchStatus::Dropped => "dropped",
        }
    }
}

impl Default for WatchStatus {
    fn default() -> Self {
        WatchStatus::Watching
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watching" => Ok(WatchStatus::Watching),
            // "watched" is the legacy column value from early schemas
            "completed" | "watched" => Ok(WatchStatus::Completed),
            "want_to_watch" => Ok(WatchStatus::WantToWatch),
            "paused" => Ok(WatchStatus::Paused),
            "dropped" => Ok(WatchStatus::Dropped),
            other => Err(format!("unknown watch status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            WatchStatus::Watching,
            WatchStatus::Completed,
            WatchStatus::WantToWatch,
            WatchStatus::Paused,
            WatchStatus::Dropped,
        ] {
            assert_eq!(status.as_str().parse::<WatchStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_legacy_watched_value() {
        assert_eq!("watched".parse::<WatchStatus>(), Ok(WatchStatus::Completed));
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("binging".parse::<WatchStatus>().is_err());
    }
}
