use serde::{Deserialize, Serialize};

/// First-episode details scraped from a season page. Never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EpisodeInfo {
    /// Episode title, empty when the page had no episode card
    pub title: String,
    /// Release date exactly as rendered by the source (may be empty or a phrase like "TBA")
    pub release_date: String,
    /// True when a synopsis is present and no "Add a plot" prompt is shown
    pub has_plot: bool,
}

impl EpisodeInfo {
    pub fn new(title: impl Into<String>, release_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            release_date: release_date.into(),
            has_plot: false,
        }
    }
}
