pub mod error;
pub mod imdb;
pub mod traits;

pub use error::SourceError;
pub use imdb::{EpisodePageParser, ImdbExtractor};
pub use traits::ContentExtractor;
