use std::sync::Arc;

use tracing::info;

use crate::server::dtos::analytics_dto::AnalyticsEvent;

/// path prefix of the admin dashboard, it never shows up in traffic numbers
pub const ADMIN_PATH_PREFIX: &str = "/birthna";

pub type DynAnalyticsSink = Arc<dyn AnalyticsSink + Send + Sync>;

/// fire and forget, a failing sink must never fail the request that produced the event
#[cfg_attr(test, mockall::automock)]
pub trait AnalyticsSink {
    fn record(&self, event: AnalyticsEvent);
}

/// writes every event as a structured line under the `analytics` target, pipe that target
/// wherever the numbers need to end up
pub struct TracingAnalyticsSink;

impl AnalyticsSink for TracingAnalyticsSink {
    fn record(&self, event: AnalyticsEvent) {
        match event {
            AnalyticsEvent::ContentPlay {
                content_id,
                kind,
                provider_id,
                season,
                episode,
            } => info!(
                target: "analytics",
                event = "content_play",
                content_id,
                kind = ?kind,
                provider_id = %provider_id,
                season = ?season,
                episode = ?episode
            ),
            AnalyticsEvent::ProviderSwitch {
                provider_id,
                provider_name,
            } => info!(
                target: "analytics",
                event = "provider_switch",
                provider_id = %provider_id,
                provider_name = %provider_name
            ),
            AnalyticsEvent::EpisodeSelect {
                content_id,
                title,
                season,
                episode,
            } => info!(
                target: "analytics",
                event = "episode_select",
                content_id,
                title = %title,
                season,
                episode
            ),
            AnalyticsEvent::PageView {
                session_id,
                path,
                movie_title,
                device,
                region,
            } => info!(
                target: "analytics",
                event = "page_view",
                session_id = %session_id,
                path = %path,
                movie_title = ?movie_title,
                device = ?device,
                region = ?region
            ),
            AnalyticsEvent::Heartbeat {
                session_id,
                current_path,
                movie_title,
                device,
                region,
            } => info!(
                target: "analytics",
                event = "heartbeat",
                session_id = %session_id,
                current_path = %current_path,
                movie_title = %movie_title,
                device = ?device,
                region = ?region
            ),
        }
    }
}

pub fn is_admin_path(path: &str) -> bool {
    path.starts_with(ADMIN_PATH_PREFIX)
}
