// the embed wrapper: the player iframe points here with the real player url in `?url=`
use std::io::Write;

use axum::{
    Extension, Router,
    extract::Query,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use flate2::{Compression, write::GzEncoder};
use serde::Deserialize;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{debug, error};

use crate::server::{
    error::{AppResult, Error},
    services::{Services, embed_services::EmbedOutcome},
};

const NO_SIGNAL_HTML: &str = r#"<div style="color:white;background:black;height:100vh;display:flex;align-items:center;justify-content:center;font-family:sans-serif;">No signal.</div>"#;

/// Supported compression encodings
#[derive(Debug, Clone, Copy, PartialEq)]
enum ContentEncoding {
    Zstd,
    Gzip,
    None,
}

impl ContentEncoding {
    /// pick from the client's Accept-Encoding, identity-only clients get identity
    fn from_accept_encoding(accept_encoding: Option<&str>) -> Self {
        match accept_encoding {
            Some(v) if v == "identity" || v.starts_with("identity,") => Self::None,
            Some(v) if v.contains("zstd") => Self::Zstd,
            Some(v) if v.contains("gzip") => Self::Gzip,
            _ => Self::None,
        }
    }

    fn as_header_value(&self) -> Option<&'static str> {
        match self {
            Self::Zstd => Some("zstd"),
            Self::Gzip => Some("gzip"),
            Self::None => None,
        }
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
        match self {
            Self::Zstd => zstd::encode_all(data, 3),
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Self::None => Ok(data.to_vec()),
        }
    }
}

#[derive(Deserialize)]
struct EmbedQuery {
    url: Option<String>,
}

pub struct EmbedController;

impl EmbedController {
    /// `open_headers` lets any origin fetch the page and any page frame it
    pub fn app(open_headers: bool) -> Router {
        let router = Router::new().route("/", get(Self::embed_get).options(Self::embed_options));

        if !open_headers {
            return router;
        }

        router
            .layer(SetResponseHeaderLayer::overriding(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("ALLOWALL"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static("frame-ancestors *"),
            ))
    }

    async fn embed_get(
        Extension(services): Extension<Services>,
        Query(params): Query<EmbedQuery>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        match services.embed.render(params.url.as_deref()).await? {
            EmbedOutcome::NoSignal => Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                NO_SIGNAL_HTML,
            )
                .into_response()),
            EmbedOutcome::Rendered(outcome) => Self::build_html_response(&outcome.html, &headers),
        }
    }

    async fn embed_options() -> impl IntoResponse {
        StatusCode::NO_CONTENT
    }

    /// rewritten page with optional compression, no cache headers because every load is
    /// fetched and rewritten from scratch
    fn build_html_response(html: &str, headers: &HeaderMap) -> AppResult<Response> {
        let encoding = ContentEncoding::from_accept_encoding(
            headers
                .get(header::ACCEPT_ENCODING)
                .and_then(|v| v.to_str().ok()),
        );

        let mut response_headers = HeaderMap::new();
        response_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );

        let body = encoding.compress(html.as_bytes()).map_err(|e| {
            error!("Failed to compress response with {:?}: {}", encoding, e);
            Error::InternalServerErrorWithContext("Failed to compress response".to_string())
        })?;

        if let Some(enc_header) = encoding.as_header_value() {
            debug!(
                "Compressed embed page with {} from {} to {} bytes",
                enc_header,
                html.len(),
                body.len()
            );
            response_headers.insert(
                header::CONTENT_ENCODING,
                HeaderValue::from_static(enc_header),
            );
        }

        response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));

        Ok((StatusCode::OK, response_headers, body).into_response())
    }
}
