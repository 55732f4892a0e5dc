pub mod notify;
pub mod scheduler;

pub use notify::{AlertSink, LogSink, NotifyError};
pub use scheduler::{EpisodeScheduler, SchedulerConfig, TickSummary};
