pub mod config;
pub mod paths;

pub use config::{CatalogConfig, Config, DatabaseConfig, DeliveryConfig, SchedulerSettings};
pub use paths::PathManager;
