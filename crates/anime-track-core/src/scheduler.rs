use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use anime_track_catalog::{Catalog, CatalogError};
use anime_track_models::{EpisodeAlert, WatchRef};
use anime_track_store::{StoreError, TrackingStore};

use crate::notify::AlertSink;

#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Time between reconciliation ticks.
    pub interval: Duration,
    /// How far before the scheduled air time an alert may fire.
    /// Valid range 0-30 minutes.
    pub early_tolerance: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(600),
            early_tolerance: Duration::ZERO,
        }
    }
}

/// Counters for one reconciliation tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub scanned: usize,
    pub notified: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum EntryOutcome {
    Notified,
    Skipped,
    Failed,
}

/// Periodic reconciliation loop.
///
/// Each tick scans every tracked entry, compares its notification
/// watermark against the catalog's next-airing data, and emits
/// at-most-once episode alerts. Entries are processed in isolation;
/// one entry's failure never aborts the rest of the scan.
pub struct EpisodeScheduler {
    store: Arc<dyn TrackingStore>,
    catalog: Arc<dyn Catalog>,
    sink: Arc<dyn AlertSink>,
    config: SchedulerConfig,
}

impl EpisodeScheduler {
    pub fn new(
        store: Arc<dyn TrackingStore>,
        catalog: Arc<dyn Catalog>,
        sink: Arc<dyn AlertSink>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            sink,
            config,
        }
    }

    /// Run ticks forever at the configured interval.
    ///
    /// Ticks are awaited sequentially, so a slow scan cannot overlap
    /// the next one; with `MissedTickBehavior::Skip` an overrun causes
    /// the next firing to be skipped rather than queued.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            operation = "scheduler_started",
            interval_secs = self.config.interval.as_secs(),
            early_tolerance_secs = self.config.early_tolerance.as_secs(),
            "Episode scheduler started"
        );

        loop {
            ticker.tick().await;
            match self.tick().await {
                Ok(summary) => {
                    info!(
                        operation = "tick_complete",
                        scanned = summary.scanned,
                        notified = summary.notified,
                        skipped = summary.skipped,
                        failed = summary.failed,
                        "Reconciliation tick completed"
                    );
                }
                Err(e) => {
                    error!(operation = "tick_error", error = %e, "Reconciliation tick failed");
                }
            }
        }
    }

    /// One reconciliation pass over every tracked entry.
    pub async fn tick(&self) -> Result<TickSummary, StoreError> {
        self.tick_at(Utc::now().timestamp()).await
    }

    /// Clock-injected form of [`EpisodeScheduler::tick`].
    pub async fn tick_at(&self, now: i64) -> Result<TickSummary, StoreError> {
        let entries = self.store.all_entries().await?;

        let mut summary = TickSummary {
            scanned: entries.len(),
            ..TickSummary::default()
        };

        for entry in entries {
            match self.process_entry(entry, now).await {
                EntryOutcome::Notified => summary.notified += 1,
                EntryOutcome::Skipped => summary.skipped += 1,
                EntryOutcome::Failed => summary.failed += 1,
            }
        }

        Ok(summary)
    }

    async fn process_entry(&self, watch: WatchRef, now: i64) -> EntryOutcome {
        let snapshot = match self.catalog.fetch_title(watch.title_id).await {
            Ok(snapshot) => snapshot,
            Err(CatalogError::NotFound) => {
                // Series removed upstream; nothing to announce.
                debug!(operation = "entry_skip", title_id = watch.title_id, "Title missing from catalog");
                return EntryOutcome::Skipped;
            }
            Err(CatalogError::Unavailable(reason)) => {
                warn!(
                    operation = "entry_catalog_error",
                    title_id = watch.title_id,
                    error = %reason,
                    "Catalog unavailable for entry, will retry next tick"
                );
                return EntryOutcome::Failed;
            }
        };

        let Some(airing) = snapshot.next_airing else {
            // Finished series or no schedule published.
            return EntryOutcome::Skipped;
        };

        // Stale or duplicate catalog data must never re-announce.
        if airing.episode <= watch.last_notified {
            return EntryOutcome::Skipped;
        }

        let tolerance = self.config.early_tolerance.as_secs() as i64;
        if now < airing.airing_at - tolerance {
            return EntryOutcome::Skipped;
        }

        let alert = EpisodeAlert {
            user_id: watch.user_id,
            title_id: watch.title_id,
            title_name: snapshot.title,
            episode: airing.episode,
        };
        let text = alert.message();

        // Delivery is best-effort on every channel; a failure is
        // logged and must not block the watermark advance below.
        if let Err(e) = self.sink.notify_user(alert.user_id, &text).await {
            warn!(
                operation = "alert_dm_failed",
                user_id = alert.user_id,
                title_id = alert.title_id,
                error = %e,
                "Direct notification failed"
            );
        }
        if let Err(e) = self.sink.broadcast(&text).await {
            warn!(
                operation = "alert_broadcast_failed",
                title_id = alert.title_id,
                error = %e,
                "Broadcast notification failed"
            );
        }

        // If this fails the entry is abandoned for the tick and picked
        // up again next interval; the alert may then repeat. That
        // at-least-once risk is accepted in favor of never silently
        // losing the watermark advance.
        match self
            .store
            .set_notified_watermark(alert.user_id, alert.title_id, alert.episode)
            .await
        {
            Ok(()) => {
                info!(
                    operation = "episode_alert",
                    user_id = alert.user_id,
                    title_id = alert.title_id,
                    episode = alert.episode,
                    title = %alert.title_name,
                    "Episode alert emitted"
                );
                EntryOutcome::Notified
            }
            Err(e) => {
                warn!(
                    operation = "watermark_update_failed",
                    user_id = alert.user_id,
                    title_id = alert.title_id,
                    error = %e,
                    "Watermark update failed, entry will be retried"
                );
                EntryOutcome::Failed
            }
        }
    }
}
