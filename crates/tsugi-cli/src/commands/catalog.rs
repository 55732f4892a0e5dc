use color_eyre::Result;

use anime_track_catalog::{Catalog, CatalogError};
use anime_track_config::Config;
use anime_track_models::Season;

use crate::commands::build_catalog;
use crate::output::Output;

pub async fn run_search(config: Config, query: &str, output: &Output) -> Result<()> {
    let catalog = build_catalog(&config)?;
    match catalog.search_title(query).await {
        Ok(snapshot) => {
            output.snapshot(&snapshot);
            Ok(())
        }
        Err(CatalogError::NotFound) => {
            output.error("Anime not found.");
            Ok(())
        }
        Err(e @ CatalogError::Unavailable(_)) => {
            output.error("Catalog is unavailable, try again later.");
            Err(color_eyre::eyre::eyre!(e))
        }
    }
}

pub async fn run_seasonal(
    config: Config,
    season: &str,
    year: i32,
    page: u32,
    per_page: u32,
    output: &Output,
) -> Result<()> {
    let season: Season = match season.parse() {
        Ok(season) => season,
        Err(e) => {
            output.error(e);
            return Ok(());
        }
    };

    let catalog = build_catalog(&config)?;
    match catalog.seasonal(season, year, page, per_page).await {
        Ok(listing) if listing.is_empty() => {
            output.info("No seasonal results.");
            Ok(())
        }
        Ok(listing) => {
            for snapshot in &listing {
                output.snapshot(snapshot);
            }
            Ok(())
        }
        Err(CatalogError::NotFound) => {
            output.info("No seasonal results.");
            Ok(())
        }
        Err(e @ CatalogError::Unavailable(_)) => {
            output.error("Catalog is unavailable, try again later.");
            Err(color_eyre::eyre::eyre!(e))
        }
    }
}
