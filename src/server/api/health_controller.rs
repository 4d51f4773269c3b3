use axum::Extension;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;
use tracing::warn;

use crate::server::dtos::health_dto::{
    EmbedHealth, HealthResponse, HealthStatus, MetadataHealth, ServiceHealthDetails,
};
use crate::server::services::Services;
use crate::server::{get_app_version, get_uptime_seconds};

/// health endpoint, nothing here is persisted so this only reports wiring
/// the embed side is the one that matters, metadata missing a key only degrades
pub async fn health_endpoint(
    Extension(services): Extension<Services>,
) -> (StatusCode, Json<HealthResponse>) {
    let provider_count = services.providers.all().len();
    let embed_health = EmbedHealth {
        status: if provider_count == 0 {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        },
        providers: provider_count,
        upstream_timeout_secs: services.config.upstream_timeout_secs,
        accept_invalid_certs: services.config.accept_invalid_certs,
    };

    let configured = services.metadata.is_configured();
    if !configured {
        warn!("metadata provider has no api key, lookups will 503");
    }
    let metadata_health = MetadataHealth {
        status: if configured {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        configured,
    };

    let overall_status = match (embed_health.status, metadata_health.status) {
        (HealthStatus::Unhealthy, _) => HealthStatus::Unhealthy,
        (_, HealthStatus::Degraded) => HealthStatus::Degraded,
        _ => HealthStatus::Healthy,
    };

    let response = HealthResponse {
        status: overall_status,
        timestamp: Utc::now(),
        uptime_seconds: get_uptime_seconds(),
        version: get_app_version().to_string(),
        environment: format!("{:?}", services.config.cargo_env).to_lowercase(),
        services: ServiceHealthDetails {
            embed: embed_health,
            metadata: metadata_health,
        },
    };

    let http_status = match overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (http_status, Json(response))
}
