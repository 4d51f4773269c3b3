// read only metadata provider, the catalog pages live on it but the proxy never touches it
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, error};

use crate::{
    config::AppConfig,
    player::MediaKind,
    server::{
        dtos::metadata_dto::{EpisodeSummary, TmdbEpisode, TmdbSeasonResponse},
        error::{AppResult, Error},
    },
};

pub type DynMetadataService = Arc<dyn MetadataServiceTrait + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataServiceTrait {
    /// `/movie/{id}` or `/tv/{id}`, passed through as is
    async fn details(&self, kind: MediaKind, id: u64) -> AppResult<Value>;

    /// episodes of a season that are already out
    async fn season_episodes(&self, tv_id: u64, season: u32) -> AppResult<Vec<EpisodeSummary>>;

    fn is_configured(&self) -> bool;
}

pub struct TmdbMetadataService {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl TmdbMetadataService {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.tmdb_base_url.trim_end_matches('/').to_string(),
            api_key: config.tmdb_api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    async fn get_json(&self, endpoint: &str) -> AppResult<Value> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            Error::ServiceUnavailable("metadata provider is not configured".to_string())
        })?;

        let url = format!("{}{}", self.base_url, endpoint);
        debug!("metadata request: {}", url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", api_key)])
            .send()
            .await
            .map_err(|e| {
                error!("metadata request to {} failed: {}", endpoint, e);
                Error::InternalServerErrorWithContext(format!("metadata request failed: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("nothing found at {}", endpoint)));
        }
        if !status.is_success() {
            error!("metadata provider answered {} for {}", status, endpoint);
            return Err(Error::InternalServerErrorWithContext(format!(
                "metadata provider returned {}",
                status
            )));
        }

        response.json().await.map_err(|e| {
            error!("unable to parse metadata response: {}", e);
            Error::InternalServerErrorWithContext("invalid metadata response".to_string())
        })
    }
}

/// anything without a date, with a broken date, or dated after `today` is dropped
pub fn aired_episodes(episodes: Vec<TmdbEpisode>, today: NaiveDate) -> Vec<EpisodeSummary> {
    episodes
        .into_iter()
        .filter_map(|ep| {
            let air_date = ep.air_date.filter(|d| !d.is_empty())?;
            let aired_on = NaiveDate::parse_from_str(&air_date, "%Y-%m-%d").ok()?;

            (aired_on <= today).then_some(EpisodeSummary {
                episode_number: ep.episode_number,
                name: ep.name,
                overview: ep.overview,
                air_date,
                still_path: ep.still_path,
                runtime: ep.runtime,
            })
        })
        .collect()
}

#[async_trait]
impl MetadataServiceTrait for TmdbMetadataService {
    async fn details(&self, kind: MediaKind, id: u64) -> AppResult<Value> {
        let endpoint = match kind {
            MediaKind::Movie => format!("/movie/{}", id),
            MediaKind::Tv => format!("/tv/{}", id),
        };
        self.get_json(&endpoint).await
    }

    async fn season_episodes(&self, tv_id: u64, season: u32) -> AppResult<Vec<EpisodeSummary>> {
        let raw = self
            .get_json(&format!("/tv/{}/season/{}", tv_id, season))
            .await?;

        let season_response: TmdbSeasonResponse = serde_json::from_value(raw).map_err(|e| {
            error!("unexpected season shape for tv {}: {}", tv_id, e);
            Error::InternalServerErrorWithContext("invalid season response".to_string())
        })?;

        Ok(aired_episodes(
            season_response.episodes,
            Utc::now().date_naive(),
        ))
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(number: u32, air_date: Option<&str>) -> TmdbEpisode {
        TmdbEpisode {
            episode_number: number,
            name: Some(format!("Episode {}", number)),
            overview: None,
            air_date: air_date.map(str::to_string),
            still_path: None,
            runtime: Some(42),
        }
    }

    #[test]
    fn only_aired_episodes_are_kept() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let episodes = vec![
            episode(1, Some("2025-11-01")),
            episode(2, Some("2025-12-01")),
            episode(3, Some("2025-12-08")),
            episode(4, None),
            episode(5, Some("")),
            episode(6, Some("soon")),
        ];

        let aired: Vec<u32> = aired_episodes(episodes, today)
            .into_iter()
            .map(|e| e.episode_number)
            .collect();

        assert_eq!(aired, vec![1, 2]);
    }

    #[tokio::test]
    async fn missing_api_key_is_service_unavailable() {
        let service = TmdbMetadataService::new(&AppConfig::default()).unwrap();

        assert!(!service.is_configured());
        let result = service.details(MediaKind::Movie, 550).await;
        assert!(matches!(result, Err(Error::ServiceUnavailable(_))));
    }

    #[test]
    fn client_builds_with_a_configured_key() {
        let config = AppConfig {
            tmdb_api_key: Some("key".to_string()),
            tmdb_base_url: "http://127.0.0.1:9/3/".to_string(),
            ..AppConfig::default()
        };

        let service = TmdbMetadataService::new(&config).expect("client builds");

        assert!(service.is_configured());
        assert_eq!(service.base_url, "http://127.0.0.1:9/3");
    }
}
