pub mod client;
pub mod parser;

pub use client::ImdbExtractor;
pub use parser::EpisodePageParser;
