pub mod classifier;
pub mod error;
pub mod events;
pub mod store;
pub mod tracker;

pub use classifier::{has_specific_date, is_announced, is_placeholder_title};
pub use error::TrackerError;
pub use store::{JsonSeriesStore, SeriesStore, StoreError};
pub use events::{LogEvents, NoopEvents, RecordingEvents, TrackerEvent, TrackerEvents};
pub use tracker::{AddOutcome, CheckReport, TrackerService};
