use serde::{Deserialize, Serialize};

/// Ephemeral catalog data for one title.
///
/// Never persisted; owned transiently by the catalog client's cache
/// with a lifetime bounded by the cache TTL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub genres: Vec<String>,
    /// Total episode count; None for ongoing series where the catalog
    /// does not know yet.
    pub episodes: Option<i32>,
    pub cover: CoverArt,
    pub next_airing: Option<AiringEpisode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoverArt {
    pub large: Option<String>,
    pub medium: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiringEpisode {
    pub episode: i32,
    /// Unix timestamp (seconds) of the scheduled air time.
    pub airing_at: i64,
}
