use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Connectivity or query failure. Fatal for the operation; the
    /// caller decides whether to retry.
    #[error("tracking store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    /// The alias already names a different title of the same user.
    #[error("alias '{alias}' is already in use")]
    AliasTaken { alias: String },
}
