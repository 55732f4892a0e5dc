use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Message-delivery interface consumed by the scheduler.
///
/// Both channels are best-effort: the scheduler logs failures and
/// moves on; it never retries and never lets a delivery failure block
/// the notification watermark.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Direct message to one user.
    async fn notify_user(&self, user_id: i64, text: &str) -> Result<(), NotifyError>;

    /// Announcement on the shared channel.
    async fn broadcast(&self, text: &str) -> Result<(), NotifyError>;
}

/// Sink that only writes to the log. Used when no delivery channel is
/// configured, and for dry runs.
#[derive(Default)]
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    async fn notify_user(&self, user_id: i64, text: &str) -> Result<(), NotifyError> {
        info!(operation = "alert_user", user_id, text, "Episode alert (log only)");
        Ok(())
    }

    async fn broadcast(&self, text: &str) -> Result<(), NotifyError> {
        info!(operation = "alert_broadcast", text, "Episode alert (log only)");
        Ok(())
    }
}
