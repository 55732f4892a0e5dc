use serde::{Deserialize, Serialize};

/// One episode-arrival notification, emitted by the scheduler to the
/// message-delivery sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeAlert {
    pub user_id: i64,
    pub title_id: i32,
    pub title_name: String,
    pub episode: i32,
}

impl EpisodeAlert {
    /// Announcement text shared by all delivery channels.
    pub fn message(&self) -> String {
        format!(
            "🎉 **{}** Episode {} just aired!",
            self.title_name, self.episode
        )
    }
}
