pub mod catalog;
pub mod daemon;
pub mod tracklist;
pub mod webhook;

use std::time::Duration;

use color_eyre::eyre::Context as _;
use color_eyre::Result;

use anime_track_catalog::{AniListClient, CatalogOptions};
use anime_track_config::Config;
use anime_track_store::PgStore;

use crate::output::Output;

/// Shared handles for one command invocation: the process-scoped
/// catalog client (with its cache) and the pooled store.
pub struct AppContext {
    pub config: Config,
    pub store: PgStore,
    pub catalog: AniListClient,
}

pub async fn build_context(config: Config) -> Result<AppContext> {
    let database_url = config
        .require_database_url()
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?
        .to_string();
    let store = PgStore::connect(&database_url)
        .await
        .wrap_err("Failed to connect to the tracking database")?;
    let catalog = build_catalog(&config)?;
    Ok(AppContext {
        config,
        store,
        catalog,
    })
}

pub fn build_catalog(config: &Config) -> Result<AniListClient> {
    let options = CatalogOptions {
        base_url: config.catalog.base_url.clone(),
        timeout: Duration::from_secs(config.catalog.timeout_secs),
        cache_ttl: Duration::from_secs(config.catalog.cache_ttl_secs),
        description_max_len: config.catalog.description_max_len,
    };
    AniListClient::new(options).wrap_err("Failed to construct the catalog client")
}

/// The acting user: `--user` flag first, then TSUGI_USER_ID.
pub fn resolve_user(flag: Option<i64>, output: &Output) -> Result<i64> {
    if let Some(user) = flag {
        return Ok(user);
    }
    match std::env::var("TSUGI_USER_ID").ok().and_then(|v| v.parse().ok()) {
        Some(user) => Ok(user),
        None => {
            output.error("No user id: pass --user or set TSUGI_USER_ID");
            Err(color_eyre::eyre::eyre!("missing user id"))
        }
    }
}
