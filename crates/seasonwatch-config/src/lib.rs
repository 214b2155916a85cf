pub mod config;
pub mod duration;
pub mod paths;

pub use config::{Config, SchedulerConfig, ScraperConfig, ServerConfig, StorageConfig};
pub use duration::parse_duration;
pub use paths::PathManager;
