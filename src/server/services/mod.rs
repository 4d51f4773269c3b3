use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::{
    config::AppConfig,
    logger::{DynLogSink, TracingLogSink},
    player::providers::ProviderRegistry,
};

use self::{
    analytics_services::{DynAnalyticsSink, TracingAnalyticsSink},
    embed_services::{DynEmbedService, EmbedService},
    fetch_services::{DynUpstreamFetcher, ReqwestUpstreamFetcher},
    metadata_services::{DynMetadataService, TmdbMetadataService},
    rewrite_services::{ContentRewriter, RegexSignatureMatcher},
};

pub mod analytics_services;
pub mod embed_services;
pub mod fetch_services;
pub mod metadata_services;
pub mod rewrite_services;

// list of services that we are using, nothing in here holds per request state
#[derive(Clone)]
pub struct Services {
    pub embed: DynEmbedService,
    pub providers: Arc<ProviderRegistry>,
    pub metadata: DynMetadataService,
    pub analytics: DynAnalyticsSink,
    pub config: Arc<AppConfig>,
}

impl Services {
    pub fn new(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let fetcher = Arc::new(
            ReqwestUpstreamFetcher::new(&config).context("couldn't build the upstream client")?,
        ) as DynUpstreamFetcher;

        Self::with_fetcher(config, fetcher)
    }

    /// same as `new` but with the upstream side swapped out, tests point this at local servers
    pub fn with_fetcher(config: Arc<AppConfig>, fetcher: DynUpstreamFetcher) -> anyhow::Result<Self> {
        info!("starting embed services...");

        let matcher = RegexSignatureMatcher::with_extra(&config.extra_ad_signatures)
            .context("an ad signature didn't compile")?;
        info!("ad scrubber ok with {} signatures", matcher.signatures().len());

        let rewriter = Arc::new(ContentRewriter::new(Arc::new(matcher)));
        let log = Arc::new(TracingLogSink) as DynLogSink;
        let embed = Arc::new(EmbedService::new(fetcher, rewriter, log));

        let providers = Arc::new(ProviderRegistry::default());
        let metadata = Arc::new(
            TmdbMetadataService::new(&config).context("couldn't build the metadata client")?,
        ) as DynMetadataService;
        let analytics = Arc::new(TracingAnalyticsSink) as DynAnalyticsSink;

        info!(
            "{} providers registered, metadata provider configured: {}",
            providers.all().len(),
            metadata.is_configured()
        );

        Ok(Self {
            embed,
            providers,
            metadata,
            analytics,
            config,
        })
    }
}
