mod service;


pub use service::{AddOutcome, CheckReport, TrackerService, DEFAULT_PACING};
