use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::player::{
    MediaKind,
    providers::{AdRisk, ProviderDescriptor},
    shield::ShieldKey,
};

/// what the server picker shows, the url template stays server side
#[derive(Debug, Serialize)]
pub struct ProviderSummary {
    pub id: String,
    pub name: String,
    pub note: String,
    pub recommended: bool,
    pub quality: String,
    pub ads: AdRisk,
    pub shield_threshold: u32,
    pub show_disclosure: bool,
}

impl From<&ProviderDescriptor> for ProviderSummary {
    fn from(provider: &ProviderDescriptor) -> Self {
        Self {
            id: provider.id.to_string(),
            name: provider.name.to_string(),
            note: provider.note.to_string(),
            recommended: provider.recommended,
            quality: provider.quality.to_string(),
            ads: provider.ad_risk,
            shield_threshold: provider.shield_threshold,
            show_disclosure: provider.show_disclosure,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderSummary>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WatchQuery {
    /// defaults to the primary provider
    pub provider: Option<String>,

    #[validate(range(min = 1, message = "content_id must be a positive id"))]
    pub content_id: u64,

    pub media_type: MediaKind,

    #[validate(range(min = 1, max = 999, message = "season must be between 1 and 999"))]
    pub season: Option<u32>,

    #[validate(range(min = 1, max = 9999, message = "episode must be between 1 and 9999"))]
    pub episode: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ShieldConfig {
    pub key: ShieldKey,
    /// changes whenever the iframe has to be remounted
    pub mount_id: String,
    pub threshold: u32,
    pub show_disclosure: bool,
}

#[derive(Debug, Serialize)]
pub struct WatchResponse {
    pub provider: ProviderSummary,
    /// the raw third party url, for debugging only
    pub embed_url: String,
    /// what the iframe should actually load
    pub proxy_url: String,
    pub shield: ShieldConfig,
}
