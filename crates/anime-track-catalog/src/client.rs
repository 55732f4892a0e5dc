use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use anime_track_models::{AiringEpisode, CatalogSnapshot, CoverArt, Season};

use crate::cache::SnapshotCache;
use crate::error::CatalogError;
use crate::sanitize::clean_description;
use crate::Catalog;

const DEFAULT_API_URL: &str = "https://graphql.anilist.co";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);
const DEFAULT_DESCRIPTION_MAX_LEN: usize = 300;
const SEASONAL_DESCRIPTION_MAX_LEN: usize = 250;

const SEARCH_QUERY: &str = r#"
query ($search: String) {
  Media(search: $search, type: ANIME) {
    id
    title { romaji }
    description(asHtml: false)
    coverImage { large medium color }
    genres
    episodes
    nextAiringEpisode {
      episode
      airingAt
    }
  }
}
"#;

const BY_ID_QUERY: &str = r#"
query ($id: Int) {
  Media(id: $id, type: ANIME) {
    id
    title { romaji }
    description(asHtml: false)
    coverImage { large medium color }
    genres
    episodes
    nextAiringEpisode {
      episode
      airingAt
    }
  }
}
"#;

const SEASONAL_QUERY: &str = r#"
query ($season: MediaSeason, $seasonYear: Int, $page: Int, $perPage: Int) {
  Page(page: $page, perPage: $perPage) {
    media(
      season: $season,
      seasonYear: $seasonYear,
      type: ANIME,
      sort: POPULARITY_DESC
    ) {
      id
      title { romaji }
      description(asHtml: false)
      genres
      episodes
      coverImage { medium }
    }
  }
}
"#;

#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub base_url: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
    pub description_max_len: usize,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache_ttl: DEFAULT_CACHE_TTL,
            description_max_len: DEFAULT_DESCRIPTION_MAX_LEN,
        }
    }
}

impl CatalogOptions {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// GraphQL client for the AniList catalog.
///
/// One shared reqwest client with a bounded request timeout, plus a
/// TTL cache keyed by title id. Name searches are cached under the
/// resolved id after the lookup (query text is unbounded and low-reuse).
pub struct AniListClient {
    client: Client,
    base_url: String,
    cache: SnapshotCache,
    description_max_len: usize,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    errors: Option<Vec<ApiError>>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
    status: Option<u16>,
}

#[derive(Deserialize)]
struct MediaData {
    #[serde(rename = "Media")]
    media: Option<Media>,
}

#[derive(Deserialize)]
struct PageData {
    #[serde(rename = "Page")]
    page: PageBody,
}

#[derive(Deserialize)]
struct PageBody {
    media: Vec<Media>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Media {
    id: i32,
    title: MediaTitle,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    cover_image: Option<MediaCover>,
    #[serde(default)]
    genres: Option<Vec<String>>,
    #[serde(default)]
    episodes: Option<i32>,
    #[serde(default)]
    next_airing_episode: Option<MediaAiring>,
}

#[derive(Deserialize)]
struct MediaTitle {
    romaji: Option<String>,
}

#[derive(Deserialize)]
struct MediaCover {
    #[serde(default)]
    large: Option<String>,
    #[serde(default)]
    medium: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaAiring {
    episode: i32,
    airing_at: i64,
}

impl Media {
    fn into_snapshot(self, description_max_len: usize) -> CatalogSnapshot {
        let title = self
            .title
            .romaji
            .unwrap_or_else(|| format!("Unknown title #{}", self.id));
        let cover = self
            .cover_image
            .map(|c| CoverArt {
                large: c.large,
                medium: c.medium,
                color: c.color,
            })
            .unwrap_or_default();

        CatalogSnapshot {
            id: self.id,
            title,
            description: clean_description(self.description.as_deref(), description_max_len),
            genres: self.genres.unwrap_or_default(),
            episodes: self.episodes,
            cover,
            next_airing: self.next_airing_episode.map(|a| AiringEpisode {
                episode: a.episode,
                airing_at: a.airing_at,
            }),
        }
    }
}

impl AniListClient {
    pub fn new(options: CatalogOptions) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(options.timeout).build()?;
        Ok(Self {
            client,
            base_url: options.base_url,
            cache: SnapshotCache::new(options.cache_ttl),
            description_max_len: options.description_max_len,
        })
    }

    async fn request<T>(&self, query: &str, variables: Value) -> Result<T, CatalogError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(&self.base_url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(operation = "catalog_request", status = %status, "Catalog returned non-success status");
            return if status == reqwest::StatusCode::NOT_FOUND {
                Err(CatalogError::NotFound)
            } else {
                Err(CatalogError::Unavailable(format!("HTTP {}", status)))
            };
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| CatalogError::Unavailable(format!("malformed response: {}", e)))?;

        if let Some(errors) = envelope.errors {
            let not_found = errors.iter().any(|e| e.status == Some(404));
            let detail = errors
                .first()
                .map(|e| e.message.clone())
                .unwrap_or_else(|| "unknown API error".to_string());
            warn!(operation = "catalog_request", error = %detail, "Catalog returned API errors");
            return if not_found {
                Err(CatalogError::NotFound)
            } else {
                Err(CatalogError::Unavailable(detail))
            };
        }

        envelope
            .data
            .ok_or_else(|| CatalogError::Unavailable("response carried no data".to_string()))
    }

    async fn fetch_media(&self, query: &str, variables: Value) -> Result<CatalogSnapshot, CatalogError> {
        let data: MediaData = self.request(query, variables).await?;
        let media = data.media.ok_or(CatalogError::NotFound)?;
        Ok(media.into_snapshot(self.description_max_len))
    }
}

#[async_trait]
impl Catalog for AniListClient {
    async fn search_title(&self, text: &str) -> Result<CatalogSnapshot, CatalogError> {
        let snapshot = self
            .fetch_media(SEARCH_QUERY, json!({ "search": text }))
            .await?;
        debug!(operation = "catalog_search", id = snapshot.id, title = %snapshot.title, "Resolved search");
        self.cache.insert(snapshot.clone());
        Ok(snapshot)
    }

    async fn fetch_title(&self, id: i32) -> Result<CatalogSnapshot, CatalogError> {
        if let Some(snapshot) = self.cache.get(id) {
            debug!(operation = "catalog_fetch", id, "Cache hit");
            return Ok(snapshot);
        }

        let snapshot = self.fetch_media(BY_ID_QUERY, json!({ "id": id })).await?;
        self.cache.insert(snapshot.clone());
        Ok(snapshot)
    }

    async fn seasonal(
        &self,
        season: Season,
        year: i32,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<CatalogSnapshot>, CatalogError> {
        let data: PageData = self
            .request(
                SEASONAL_QUERY,
                json!({
                    "season": season.as_api_str(),
                    "seasonYear": year,
                    "page": page,
                    "perPage": per_page,
                }),
            )
            .await?;

        Ok(data
            .page
            .media
            .into_iter()
            .map(|m| m.into_snapshot(SEASONAL_DESCRIPTION_MAX_LEN))
            .collect())
    }
}
