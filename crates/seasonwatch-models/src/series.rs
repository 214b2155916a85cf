use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::status::Status;

/// A tracked `(show_id, season)` pair
///
/// `show_id` and `season` form the identity and never change after creation;
/// only `last_checked` and `status` are rewritten by reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Series {
    pub show_id: String,
    pub season: u32,
    pub last_checked: DateTime<Utc>,
    pub status: Status,
}

impl Series {
    /// New placeholder entry checked at `now`
    pub fn placeholder(show_id: impl Into<String>, season: u32, now: DateTime<Utc>) -> Self {
        Self {
            show_id: show_id.into(),
            season,
            last_checked: now,
            status: Status::Placeholder,
        }
    }

    pub fn key(&self) -> String {
        series_key(&self.show_id, self.season)
    }
}

/// Canonical store key: `show_id + "-s" + season`
pub fn series_key(show_id: &str, season: u32) -> String {
    format!("{}-s{}", show_id, season)
}
