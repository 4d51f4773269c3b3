use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::header;
use flate2::read::{GzDecoder, ZlibDecoder};
use tracing::{debug, error, warn};
use url::Url;

use crate::{
    config::AppConfig,
    server::{
        error::{AppResult, Error},
        utils::user_agent_utils::UserAgentUtil,
    },
};

const MAX_REDIRECTS: usize = 10;

/// player pages are a few hundred KB at most
const MAX_DECODED_BYTES: usize = 8 * 1024 * 1024;

/// what came back from the player host, `effective_url` is where the redirects ended up and is
/// the only thing relative links can be resolved against
#[derive(Debug, Clone)]
pub struct UpstreamPage {
    pub requested_url: Url,
    pub effective_url: Url,
    pub body: String,
}

pub type DynUpstreamFetcher = Arc<dyn UpstreamFetcher + Send + Sync>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpstreamFetcher {
    /// single GET, no retries. empty bodies count as a failure
    async fn fetch(&self, url: &Url) -> AppResult<UpstreamPage>;
}

pub struct ReqwestUpstreamFetcher {
    http_client: reqwest::Client,
}

impl ReqwestUpstreamFetcher {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        // embed hosts are not known for their certificate hygiene, this is a config flag so it
        // can be turned off but a few providers will go dark if it is
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()?;

        Ok(Self { http_client })
    }

    /// we ask for compressed content and decode it ourselves, same as the stream proxy
    fn decode_body(bytes: &[u8], content_encoding: Option<&str>) -> AppResult<Vec<u8>> {
        Self::decode_body_capped(bytes, content_encoding, MAX_DECODED_BYTES)
    }

    // a tiny gzip can inflate to gigabytes, the decoder is never read past the cap
    fn decode_body_capped(
        bytes: &[u8],
        content_encoding: Option<&str>,
        limit: usize,
    ) -> AppResult<Vec<u8>> {
        let unreadable = |e: std::io::Error| {
            error!("Failed to decompress upstream body: {}", e);
            Error::UpstreamUnavailable(format!("undecodable body: {}", e))
        };

        let mut decoded = Vec::new();
        let cap = limit as u64 + 1;

        match content_encoding {
            Some("zstd") => {
                zstd::stream::read::Decoder::new(bytes)
                    .map_err(unreadable)?
                    .take(cap)
                    .read_to_end(&mut decoded)
                    .map_err(unreadable)?;
            }
            Some("gzip") => {
                GzDecoder::new(bytes)
                    .take(cap)
                    .read_to_end(&mut decoded)
                    .map_err(unreadable)?;
            }
            Some("deflate") => {
                ZlibDecoder::new(bytes)
                    .take(cap)
                    .read_to_end(&mut decoded)
                    .map_err(unreadable)?;
            }
            _ => decoded.extend_from_slice(bytes),
        }

        if decoded.len() > limit {
            warn!("Upstream body is over the {} byte cap, dropping it", limit);
            return Err(Error::UpstreamUnavailable(format!(
                "body larger than {} bytes",
                limit
            )));
        }

        Ok(decoded)
    }
}

#[async_trait]
impl UpstreamFetcher for ReqwestUpstreamFetcher {
    async fn fetch(&self, url: &Url) -> AppResult<UpstreamPage> {
        let user_agent = UserAgentUtil::random();
        debug!("Fetching upstream {} as {}", url, user_agent);

        let response = self
            .http_client
            .get(url.clone())
            .header(header::USER_AGENT, user_agent)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(header::ACCEPT_ENCODING, "gzip, deflate, zstd")
            .send()
            .await
            .map_err(|e| {
                error!("Upstream request failed: {}", e);
                Error::UpstreamUnavailable(format!("request failed: {}", e))
            })?;

        let effective_url = response.url().clone();
        let status = response.status();

        // error pages are still pages, the player host sometimes 404s with a working player in
        // the body so these go through the rewrite like everything else
        if !status.is_success() {
            warn!("Upstream {} answered with {}", effective_url, status);
        }

        let content_encoding = response
            .headers()
            .get(header::CONTENT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_ascii_lowercase());

        let bytes = response.bytes().await.map_err(|e| {
            error!("Failed to read upstream response: {}", e);
            Error::UpstreamUnavailable(format!("failed to read body: {}", e))
        })?;

        let decoded = Self::decode_body(&bytes, content_encoding.as_deref())?;

        if decoded.is_empty() {
            return Err(Error::UpstreamUnavailable(format!(
                "empty body from {}",
                effective_url
            )));
        }

        debug!(
            "Fetched {} bytes ({} decoded) from {}",
            bytes.len(),
            decoded.len(),
            effective_url
        );

        Ok(UpstreamPage {
            requested_url: url.clone(),
            effective_url,
            body: String::from_utf8_lossy(&decoded).into_owned(),
        })
    }
}
