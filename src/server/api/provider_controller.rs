use axum::{Extension, Json, Router, routing::get};
use tracing::{debug, info};

use crate::{
    player::{MediaKind, shield::ShieldKey},
    server::{
        dtos::{
            analytics_dto::AnalyticsEvent,
            provider_dto::{
                ProviderSummary, ProvidersResponse, ShieldConfig, WatchQuery, WatchResponse,
            },
        },
        error::{AppResult, Error},
        extractors::ValidatedQuery,
        services::Services,
        utils::url_utils::UrlUtil,
    },
};

pub struct ProviderController;

impl ProviderController {
    pub fn app() -> Router {
        Router::new()
            .route("/", get(Self::list_providers_endpoint))
            .route("/watch", get(Self::watch_endpoint))
    }

    /// GET /api/v1/providers
    ///
    /// every embed provider in picker order, the first one is the default
    pub async fn list_providers_endpoint(
        Extension(services): Extension<Services>,
    ) -> Json<ProvidersResponse> {
        Json(ProvidersResponse {
            providers: services
                .providers
                .all()
                .iter()
                .map(ProviderSummary::from)
                .collect(),
        })
    }

    /// GET /api/v1/providers/watch
    ///
    /// resolve what the player should mount for a piece of content
    ///
    /// params:
    /// - `provider` (optional, primary provider otherwise)
    /// - `content_id`
    /// - `media_type` (`movie` or `tv`)
    /// - `season`, `episode` (tv only, default to 1)
    ///
    /// response:
    /// ```json
    /// {
    ///   "provider": { "id": "vidlink", "shield_threshold": 2, ... },
    ///   "embed_url": "https://vidlink.pro/tv/1399/1/1?js=1&controls=0",
    ///   "proxy_url": "/api/v1/embed?url=https%3A%2F%2Fvidlink.pro%2F...",
    ///   "shield": { "key": {...}, "mount_id": "vidlink-1-1", "threshold": 2, "show_disclosure": true }
    /// }
    /// ```
    pub async fn watch_endpoint(
        Extension(services): Extension<Services>,
        ValidatedQuery(params): ValidatedQuery<WatchQuery>,
    ) -> AppResult<Json<WatchResponse>> {
        let provider = match params.provider.as_deref() {
            Some(id) => services
                .providers
                .get(id)
                .ok_or_else(|| Error::NotFound(format!("unknown provider: {}", id)))?,
            None => services
                .providers
                .primary()
                .ok_or_else(|| Error::NotFound("no providers configured".to_string()))?,
        };

        // movies never carry a season, tv falls back to the first episode like the picker does
        let (season, episode) = match params.media_type {
            MediaKind::Movie => (None, None),
            MediaKind::Tv => (
                Some(params.season.unwrap_or(1)),
                Some(params.episode.unwrap_or(1)),
            ),
        };

        let embed_url = provider.get_url(params.content_id, season, episode);
        let key = ShieldKey::new(provider.id, season, episode);
        debug!("resolved {} for {}", embed_url, key.mount_id());

        services.analytics.record(AnalyticsEvent::ContentPlay {
            content_id: params.content_id,
            kind: params.media_type,
            provider_id: provider.id.to_string(),
            season,
            episode,
        });

        info!(
            "watch resolved for content {} on {}",
            params.content_id, provider.id
        );

        Ok(Json(WatchResponse {
            provider: ProviderSummary::from(provider),
            proxy_url: UrlUtil::proxied(&embed_url),
            embed_url,
            shield: ShieldConfig {
                mount_id: key.mount_id(),
                key,
                threshold: provider.shield_threshold.max(1),
                show_disclosure: provider.show_disclosure,
            },
        }))
    }
}
