pub mod cache;
pub mod client;
pub mod error;
pub mod sanitize;

use async_trait::async_trait;

use anime_track_models::{CatalogSnapshot, Season};

pub use cache::SnapshotCache;
pub use client::{AniListClient, CatalogOptions};
pub use error::CatalogError;

/// Lookup interface over the external media catalog.
///
/// Implementations normalize every upstream failure to
/// [`CatalogError::NotFound`] or [`CatalogError::Unavailable`]; callers
/// never see transport detail. Retries, if any, belong to the caller.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fuzzy search; the upstream decides ranking and the top match wins.
    async fn search_title(&self, text: &str) -> Result<CatalogSnapshot, CatalogError>;

    /// Fetch by catalog id.
    async fn fetch_title(&self, id: i32) -> Result<CatalogSnapshot, CatalogError>;

    /// Seasonal listing, lighter shape (no airing-schedule fidelity).
    async fn seasonal(
        &self,
        season: Season,
        year: i32,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CatalogSnapshot>, CatalogError>;
}
