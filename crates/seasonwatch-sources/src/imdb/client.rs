use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::Client;
use seasonwatch_config::ScraperConfig;
use seasonwatch_models::EpisodeInfo;
use tracing::debug;

use crate::error::SourceError;
use crate::imdb::parser::EpisodePageParser;
use crate::traits::ContentExtractor;

/// Fetches IMDb season episode listings over HTTP
pub struct ImdbExtractor {
    client: Client,
    base_url: String,
    parser: EpisodePageParser,
}

impl ImdbExtractor {
    pub fn new(config: &ScraperConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        let language = HeaderValue::from_str(&config.accept_language)
            .map_err(|e| SourceError::Parse(format!("invalid Accept-Language header: {}", e)))?;
        headers.insert(ACCEPT_LANGUAGE, language);

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(SourceError::Client)?;

        let parser = EpisodePageParser::new()
            .map_err(|e| SourceError::Parse(format!("invalid extractor pattern: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            parser,
        })
    }

    pub fn season_url(&self, show_id: &str, season: u32) -> String {
        format!("{}/title/{}/episodes/?season={}", self.base_url, show_id, season)
    }
}

#[async_trait]
impl ContentExtractor for ImdbExtractor {
    fn source_name(&self) -> &str {
        "imdb"
    }

    async fn fetch_episode_info(&self, show_id: &str, season: u32) -> Result<EpisodeInfo, SourceError> {
        let url = self.season_url(show_id, season);
        debug!(show_id = %show_id, season = season, url = %url, "Fetching season page");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout { url: url.clone() }
            } else {
                SourceError::Request { url: url.clone(), source: e }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { status: status.as_u16(), url });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout { url: url.clone() }
            } else {
                SourceError::Request { url: url.clone(), source: e }
            }
        })?;

        let info = self.parser.parse(&body);
        debug!(
            show_id = %show_id,
            season = season,
            title = %info.title,
            release_date = %info.release_date,
            has_plot = info.has_plot,
            "Parsed season page"
        );
        Ok(info)
    }
}
