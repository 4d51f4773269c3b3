mod api;
pub mod dtos;
pub mod error;
pub mod extractors;
pub mod services;
pub mod utils;

use std::future::ready;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use axum::Extension;
use axum::extract::MatchedPath;
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::method;
use axum::http::request::Parts as RequestParts;
use axum::http::{HeaderValue, Request};
use axum::middleware::{self, Next};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{BoxError, Json, Router, error_handling::HandleErrorLayer, http::StatusCode};
use lazy_static::lazy_static;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use serde_json::json;
use tower::{ServiceBuilder, buffer::BufferLayer, limit::RateLimitLayer};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::server::api::{
    analytics_controller::AnalyticsController, embed_controller::EmbedController,
    health_controller::health_endpoint, metadata_controller::MetadataController,
    provider_controller::ProviderController,
};
use crate::server::services::Services;

lazy_static! {
    static ref HTTP_TIMEOUT: u64 = 30;
    static ref EXPONENTIAL_SECONDS: &'static [f64] = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];
    static ref START_TIME: Instant = Instant::now();
}

pub fn get_uptime_seconds() -> u64 {
    START_TIME.elapsed().as_secs()
}

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// `*` lets everything through, otherwise the origin's host has to be (or end with) one of the
/// comma separated entries
fn origin_allowed(origin: &str, allowed: &[String]) -> bool {
    if allowed.iter().any(|a| a == "*") {
        return true;
    }

    let host = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))
        .unwrap_or(origin);

    allowed
        .iter()
        .any(|a| origin == a || host == a || host.ends_with(&format!(".{}", a)))
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

pub struct ApplicationServer;

impl ApplicationServer {
    pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
        lazy_static::initialize(&START_TIME);

        let recorder_handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(String::from("http_requests_duration_seconds")),
                *EXPONENTIAL_SECONDS,
            )
            .context("could not setup metric buckets")?
            .install_recorder()
            .context("couldn't install the metric recorder")?;

        let services = Services::new(config.clone()).context("couldn't build services")?;

        let router = Self::router(config.clone(), services)
            .route("/metrics", get(move || ready(recorder_handle.render())));

        let port = format!("0.0.0.0:{}", config.port);
        let listener = tokio::net::TcpListener::bind(&port)
            .await
            .with_context(|| format!("couldn't bind {}", port))?;

        info!("Setup completed, initialized server on port {port}");
        debug!("routes initialized, listening on port {}", &port);

        axum::serve(listener, router)
            .with_graceful_shutdown(Self::shutdown_signal())
            .await
            .context("axum serving failed")?;

        Ok(())
    }

    /// every route minus `/metrics`, the prometheus recorder is process global so only `serve`
    /// installs it
    pub fn router(config: Arc<AppConfig>, services: Services) -> Router {
        let mut allowed = split_origins(&config.cors_origin);
        allowed.extend(split_origins(&config.preview_cors_origin));

        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(
                move |origin: &HeaderValue, _request_parts: &RequestParts| {
                    origin_allowed(origin.to_str().unwrap_or(""), &allowed)
                },
            ))
            .allow_methods([
                method::Method::GET,
                method::Method::POST,
                method::Method::OPTIONS,
            ])
            .allow_headers([CONTENT_TYPE, ACCEPT]);

        // the embed route sets its own headers, it has to be frameable from anywhere
        let api_routes = Router::new()
            .nest("/providers", ProviderController::app())
            .nest("/metadata", MetadataController::app())
            .nest("/analytics", AnalyticsController::app())
            .route("/health", get(health_endpoint))
            .layer(cors);

        let embed_routes =
            Router::new().nest("/embed", EmbedController::app(config.open_embed_headers));

        let rate_limit = config.rate_limit_per_second.max(1);

        Router::new()
            .nest("/api/v1", api_routes.merge(embed_routes))
            .route("/", get(health_endpoint))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(HandleErrorLayer::new(Self::handle_timeout_error))
                    .timeout(Duration::from_secs(*HTTP_TIMEOUT))
                    .layer(Extension(services))
                    .layer(BufferLayer::new(1024))
                    .layer(RateLimitLayer::new(rate_limit, Duration::from_secs(1))),
            )
            .route_layer(middleware::from_fn(Self::track_metrics))
            .fallback(Self::handle_404)
    }

    async fn handle_timeout_error(err: BoxError) -> (StatusCode, Json<serde_json::Value>) {
        if err.is::<tower::timeout::error::Elapsed>() {
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(json!({
                    "error":
                        format!(
                            "request took longer than the configured {} second timeout",
                            *HTTP_TIMEOUT
                        )
                })),
            )
        } else {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("unhandled internal error: {}", err)
                })),
            )
        }
    }

    async fn track_metrics(request: Request<axum::body::Body>, next: Next) -> impl IntoResponse {
        let path = if let Some(matched_path) = request.extensions().get::<MatchedPath>() {
            matched_path.as_str().to_owned()
        } else {
            request.uri().path().to_owned()
        };
        let start = Instant::now();
        let method = request.method().clone();
        let response = next.run(request).await;
        let latency = start.elapsed().as_secs_f64();
        let status = response.status().as_u16().to_string();

        metrics::counter!("http_requests_total", "method" => method.to_string(), "path" => path.clone(), "status" => status.clone()).increment(1);

        metrics::histogram!("http_requests_duration_seconds", "method" => method.to_string(), "path" => path, "status" => status).record(latency);

        response
    }

    async fn shutdown_signal() {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("couldn't listen for SIGINT, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
        info!("signal shutdown");
    }

    async fn handle_404() -> impl IntoResponse {
        (
            StatusCode::NOT_FOUND,
            axum::response::Json(serde_json::json!({
            "errors":{
            "message": vec!(String::from("This resource doesn't exist.")),}
            })),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_allows_any_origin() {
        assert!(origin_allowed("https://anything.dev", &split_origins("*")));
    }

    #[test]
    fn listed_domains_and_subdomains_pass() {
        let allowed = split_origins("zion.tv, preview.zion.dev");
        assert!(origin_allowed("https://zion.tv", &allowed));
        assert!(origin_allowed("https://www.zion.tv", &allowed));
        assert!(origin_allowed("http://preview.zion.dev", &allowed));
        assert!(!origin_allowed("https://notzion.tv", &allowed));
        assert!(!origin_allowed("https://evil.dev", &allowed));
    }
}
