pub mod alert;
pub mod entry;
pub mod season;
pub mod snapshot;
pub mod status;

pub use alert::EpisodeAlert;
pub use entry::{TrackedEntry, WatchRef};
pub use season::Season;
pub use snapshot::{AiringEpisode, CatalogSnapshot, CoverArt};
pub use status::WatchStatus;
