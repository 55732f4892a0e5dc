use thiserror::Error;

/// The only externally observable catalog failure kinds.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The title does not exist upstream (or the search had no match).
    #[error("title not found in catalog")]
    NotFound,

    /// Network error, timeout, non-success status, or malformed
    /// response. Transient; the caller may retry on its own schedule.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for CatalogError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CatalogError::Unavailable("request timed out".to_string())
        } else {
            CatalogError::Unavailable(e.to_string())
        }
    }
}
