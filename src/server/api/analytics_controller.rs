use axum::{
    Extension, Json, Router,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    routing::post,
};
use tracing::debug;

use crate::server::{
    dtos::analytics_dto::{
        AcceptedResponse, AnalyticsEvent, DeviceType, HeartbeatRequest, PageViewRequest,
        PlayerEventRequest,
    },
    error::{AppResult, Error},
    extractors::ValidationExtractor,
    services::{Services, analytics_services::is_admin_path},
};

pub struct AnalyticsController;

impl AnalyticsController {
    pub fn app() -> Router {
        Router::new()
            .route("/page-view", post(Self::page_view_endpoint))
            .route("/heartbeat", post(Self::heartbeat_endpoint))
            .route("/events", post(Self::player_event_endpoint))
    }

    fn device(headers: &HeaderMap) -> DeviceType {
        DeviceType::from_user_agent(headers.get(USER_AGENT).and_then(|v| v.to_str().ok()))
    }

    /// POST /api/v1/analytics/page-view
    ///
    /// admin pages are accepted but never recorded
    pub async fn page_view_endpoint(
        Extension(services): Extension<Services>,
        headers: HeaderMap,
        ValidationExtractor(payload): ValidationExtractor<PageViewRequest>,
    ) -> (StatusCode, Json<AcceptedResponse>) {
        if is_admin_path(&payload.path) {
            debug!("skipping admin page view for {}", payload.session_id);
            return (StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: false }));
        }

        services.analytics.record(AnalyticsEvent::PageView {
            device: Self::device(&headers),
            session_id: payload.session_id,
            path: payload.path,
            movie_title: payload.movie_title,
            region: payload.region,
        });

        (StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true }))
    }

    /// POST /api/v1/analytics/heartbeat
    ///
    /// the watch page sends one of these every 30 seconds, keyed by session id
    pub async fn heartbeat_endpoint(
        Extension(services): Extension<Services>,
        headers: HeaderMap,
        ValidationExtractor(payload): ValidationExtractor<HeartbeatRequest>,
    ) -> (StatusCode, Json<AcceptedResponse>) {
        services.analytics.record(AnalyticsEvent::Heartbeat {
            device: Self::device(&headers),
            session_id: payload.session_id,
            current_path: payload.current_path,
            movie_title: payload.movie_title,
            region: payload.region,
        });

        (StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true }))
    }

    /// POST /api/v1/analytics/events
    ///
    /// ```json
    /// { "kind": "provider_switch", "provider_id": "vidlink" }
    /// { "kind": "episode_select", "content_id": 1399, "title": "...", "season": 1, "episode": 2 }
    /// ```
    pub async fn player_event_endpoint(
        Extension(services): Extension<Services>,
        ValidationExtractor(payload): ValidationExtractor<PlayerEventRequest>,
    ) -> AppResult<(StatusCode, Json<AcceptedResponse>)> {
        let event = match payload {
            PlayerEventRequest::ProviderSwitch { provider_id } => {
                let provider = services.providers.get(&provider_id).ok_or_else(|| {
                    Error::BadRequest(format!("unknown provider: {}", provider_id))
                })?;
                AnalyticsEvent::ProviderSwitch {
                    provider_name: provider.name.to_string(),
                    provider_id,
                }
            }
            PlayerEventRequest::EpisodeSelect {
                content_id,
                title,
                season,
                episode,
            } => AnalyticsEvent::EpisodeSelect {
                content_id,
                title,
                season,
                episode,
            },
        };

        services.analytics.record(event);

        Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { accepted: true })))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::AppConfig;
    use crate::server::services::analytics_services::MockAnalyticsSink;

    fn services_with(sink: MockAnalyticsSink) -> Services {
        let mut services = Services::new(Arc::new(AppConfig::default())).unwrap();
        services.analytics = Arc::new(sink);
        services
    }

    #[tokio::test]
    async fn provider_switch_is_recorded_with_the_display_name() {
        let mut sink = MockAnalyticsSink::new();
        sink.expect_record()
            .withf(|event| {
                *event
                    == AnalyticsEvent::ProviderSwitch {
                        provider_id: "vidlink".to_string(),
                        provider_name: "Server 3 (HD)".to_string(),
                    }
            })
            .times(1)
            .return_const(());

        let (status, Json(body)) = AnalyticsController::player_event_endpoint(
            Extension(services_with(sink)),
            ValidationExtractor(PlayerEventRequest::ProviderSwitch {
                provider_id: "vidlink".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(body.accepted);
    }

    #[tokio::test]
    async fn unknown_provider_switch_is_rejected_before_recording() {
        let mut sink = MockAnalyticsSink::new();
        sink.expect_record().times(0);

        let result = AnalyticsController::player_event_endpoint(
            Extension(services_with(sink)),
            ValidationExtractor(PlayerEventRequest::ProviderSwitch {
                provider_id: "nope".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(Error::BadRequest(_))));
    }
}
