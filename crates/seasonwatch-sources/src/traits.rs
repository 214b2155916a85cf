use async_trait::async_trait;
use seasonwatch_models::EpisodeInfo;
use crate::error::SourceError;

/// Turns one season page of a show into an [`EpisodeInfo`]
///
/// Implementations must be safe to call repeatedly and must bound each call
/// with their own request timeout.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    fn source_name(&self) -> &str;

    async fn fetch_episode_info(&self, show_id: &str, season: u32) -> Result<EpisodeInfo, SourceError>;
}
