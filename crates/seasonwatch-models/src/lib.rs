pub mod episode;
pub mod series;
pub mod status;

pub use episode::EpisodeInfo;
pub use series::{series_key, Series};
pub use status::Status;
