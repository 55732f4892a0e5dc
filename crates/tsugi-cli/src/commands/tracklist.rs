use chrono::DateTime;
use color_eyre::Result;

use anime_track_catalog::{Catalog, CatalogError};
use anime_track_models::{TrackedEntry, WatchStatus};
use anime_track_store::{StoreError, TrackingStore};

use crate::commands::AppContext;
use crate::output::Output;

/// Exact resolve first, then a case-insensitive pass over the user's
/// entries (alias before title name). Storage stays case-sensitive;
/// forgiving matching is an interaction-layer concern.
async fn resolve_identifier(
    ctx: &AppContext,
    user: i64,
    identifier: &str,
) -> Result<Option<TrackedEntry>, StoreError> {
    if let Some(entry) = ctx.store.resolve(user, identifier).await? {
        return Ok(Some(entry));
    }

    let lowered = identifier.to_lowercase();
    let entries = ctx.store.list_entries(user).await?;
    let by_alias = entries.iter().find(|e| e.alias.to_lowercase() == lowered);
    let found = by_alias.or_else(|| {
        entries
            .iter()
            .find(|e| e.title_name.to_lowercase() == lowered)
    });
    Ok(found.cloned())
}

fn report_store_error(e: StoreError, output: &Output) -> color_eyre::Report {
    output.error("Tracking store is unavailable, try again later.");
    color_eyre::eyre::eyre!(e)
}

/// On an alias conflict, show what is already taken so the user can
/// pick a free one without a second round trip.
async fn report_alias_conflict(ctx: &AppContext, user: i64, alias: &str, output: &Output) {
    output.error(format!("Alias `{}` is already in use.", alias));
    if let Ok(aliases) = ctx.store.list_aliases(user).await {
        if !aliases.is_empty() {
            output.info(format!("Your aliases: {}", aliases.join(", ")));
        }
    }
}

fn report_catalog_error(e: CatalogError, output: &Output) {
    match e {
        CatalogError::NotFound => output.error("Anime not found."),
        CatalogError::Unavailable(_) => {
            output.error("Catalog is unavailable, try again later.")
        }
    }
}

pub async fn run_track(
    ctx: &AppContext,
    user: i64,
    query: &str,
    alias: Option<String>,
    episode: i32,
    output: &Output,
) -> Result<()> {
    let snapshot = match ctx.catalog.search_title(query).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            report_catalog_error(e, output);
            return Ok(());
        }
    };

    let alias = alias.unwrap_or_else(|| TrackedEntry::derive_alias(&snapshot.title));
    match ctx
        .store
        .create(
            user,
            snapshot.id,
            &snapshot.title,
            &alias,
            episode,
            WatchStatus::Watching,
        )
        .await
    {
        Ok(()) => {
            output.success(format!(
                "Tracking {} as `{}`, starting at episode {}",
                snapshot.title, alias, episode
            ));
            Ok(())
        }
        Err(StoreError::AliasTaken { alias }) => {
            report_alias_conflict(ctx, user, &alias, output).await;
            output.info("Pass --alias to pick another.");
            Ok(())
        }
        Err(e) => Err(report_store_error(e, output)),
    }
}

pub async fn run_watched(
    ctx: &AppContext,
    user: i64,
    identifier: &str,
    episode: i32,
    output: &Output,
) -> Result<()> {
    let entry = match resolve_identifier(ctx, user, identifier).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            output.error(format!("You are not tracking '{}'.", identifier));
            return Ok(());
        }
        Err(e) => return Err(report_store_error(e, output)),
    };

    match ctx.store.set_progress(user, entry.title_id, episode).await {
        Ok(()) => {
            output.success(format!("{} updated to episode {}.", entry.title_name, episode));
            Ok(())
        }
        Err(e) => Err(report_store_error(e, output)),
    }
}

pub async fn run_mark(
    ctx: &AppContext,
    user: i64,
    identifier: &str,
    status: &str,
    output: &Output,
) -> Result<()> {
    let status: WatchStatus = match status.parse() {
        Ok(status) => status,
        Err(e) => {
            output.error(e);
            return Ok(());
        }
    };

    let entry = match resolve_identifier(ctx, user, identifier).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            output.error(format!("You are not tracking '{}'.", identifier));
            return Ok(());
        }
        Err(e) => return Err(report_store_error(e, output)),
    };

    match ctx.store.set_status(user, entry.title_id, status).await {
        Ok(()) => {
            output.success(format!("{} marked as {}.", entry.title_name, status));
            Ok(())
        }
        Err(e) => Err(report_store_error(e, output)),
    }
}

pub async fn run_alias(
    ctx: &AppContext,
    user: i64,
    identifier: &str,
    new_alias: &str,
    output: &Output,
) -> Result<()> {
    let entry = match resolve_identifier(ctx, user, identifier).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            output.error(format!("You are not tracking '{}'.", identifier));
            return Ok(());
        }
        Err(e) => return Err(report_store_error(e, output)),
    };

    match ctx.store.set_alias(user, entry.title_id, new_alias).await {
        Ok(()) => {
            output.success(format!("{} is now `{}`.", entry.title_name, new_alias));
            Ok(())
        }
        Err(StoreError::AliasTaken { alias }) => {
            report_alias_conflict(ctx, user, &alias, output).await;
            Ok(())
        }
        Err(e) => Err(report_store_error(e, output)),
    }
}

pub async fn run_untrack(
    ctx: &AppContext,
    user: i64,
    identifier: &str,
    output: &Output,
) -> Result<()> {
    let entry = match resolve_identifier(ctx, user, identifier).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            output.error(format!("You are not tracking '{}'.", identifier));
            return Ok(());
        }
        Err(e) => return Err(report_store_error(e, output)),
    };

    match ctx.store.remove(user, entry.title_id).await {
        Ok(()) => {
            output.success(format!("Removed {}.", entry.title_name));
            Ok(())
        }
        Err(e) => Err(report_store_error(e, output)),
    }
}

pub async fn run_list(
    ctx: &AppContext,
    user: i64,
    status: Option<String>,
    output: &Output,
) -> Result<()> {
    let status = match status.map(|s| s.parse::<WatchStatus>()).transpose() {
        Ok(status) => status,
        Err(e) => {
            output.error(e);
            return Ok(());
        }
    };

    let mut entries = match ctx.store.list_entries(user).await {
        Ok(entries) => entries,
        Err(e) => return Err(report_store_error(e, output)),
    };
    if let Some(status) = status {
        entries.retain(|e| e.status == status);
    }

    if entries.is_empty() {
        output.info("No tracked anime in this category.");
    } else {
        output.entries(&entries);
    }
    Ok(())
}

pub async fn run_progress(
    ctx: &AppContext,
    user: i64,
    identifier: &str,
    output: &Output,
) -> Result<()> {
    let entry = match resolve_identifier(ctx, user, identifier).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            output.error(format!("You are not tracking '{}'.", identifier));
            return Ok(());
        }
        Err(e) => return Err(report_store_error(e, output)),
    };

    output.info(format!("{} (`{}`)", entry.title_name, entry.alias));
    output.info(format!("  Status: {}", entry.status));
    output.info(format!("  Last watched episode: {}", entry.last_watched));

    match ctx.catalog.fetch_title(entry.title_id).await {
        Ok(snapshot) => {
            if let Some(episodes) = snapshot.episodes {
                output.info(format!("  Total episodes: {}", episodes));
            }
            match snapshot.next_airing {
                Some(airing) => {
                    let when = DateTime::from_timestamp(airing.airing_at, 0)
                        .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                        .unwrap_or_else(|| "unknown time".to_string());
                    output.info(format!(
                        "  Next episode: {} airs at {}",
                        airing.episode, when
                    ));
                }
                None => output.info("  Next episode: completed or not airing"),
            }
        }
        Err(e) => report_catalog_error(e, output),
    }
    Ok(())
}
