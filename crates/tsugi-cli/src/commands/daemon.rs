use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use tracing::info;

use anime_track_config::Config;
use anime_track_core::{AlertSink, EpisodeScheduler, LogSink, SchedulerConfig};

use crate::commands::{build_catalog, webhook::WebhookSink};
use crate::output::Output;

pub async fn run_daemon(
    config: Config,
    interval_secs: Option<u64>,
    once: bool,
    output: &Output,
) -> Result<()> {
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let database_url = config
        .require_database_url()
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    let store = anime_track_store::PgStore::connect(database_url).await?;
    store.init_schema().await?;

    let catalog = Arc::new(build_catalog(&config)?);

    let sink: Arc<dyn AlertSink> = match &config.delivery.webhook_url {
        Some(url) => {
            info!(operation = "daemon_setup", "Delivering alerts over webhook");
            Arc::new(WebhookSink::new(url.clone(), config.delivery.mention_role_id)?)
        }
        None => {
            info!(operation = "daemon_setup", "No webhook configured, alerts go to the log");
            Arc::new(LogSink)
        }
    };

    let scheduler_config = SchedulerConfig {
        interval: Duration::from_secs(interval_secs.unwrap_or(config.scheduler.interval_secs)),
        early_tolerance: Duration::from_secs(config.scheduler.early_tolerance_secs),
    };
    let scheduler = EpisodeScheduler::new(Arc::new(store), catalog, sink, scheduler_config);

    if once {
        let summary = scheduler.tick().await?;
        output.success(format!(
            "Tick complete: {} scanned, {} notified, {} skipped, {} failed",
            summary.scanned, summary.notified, summary.skipped, summary.failed
        ));
        return Ok(());
    }

    output.info(format!(
        "Episode scheduler running every {}s (Ctrl-C to stop)",
        scheduler_config.interval.as_secs()
    ));
    scheduler.run().await;
    Ok(())
}

pub async fn run_init_db(config: Config, output: &Output) -> Result<()> {
    let database_url = config
        .require_database_url()
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    let store = anime_track_store::PgStore::connect(database_url).await?;
    store.init_schema().await?;
    output.success("Tracking schema is ready.");
    Ok(())
}
