// third party embed players we know how to build urls for
use serde::Serialize;

/// builds an embed url from (content id, season, episode). these must stay pure, no network and
/// no state, the shield key and the proxied url are both derived from their output
pub type UrlTemplate = fn(u64, Option<u32>, Option<u32>) -> String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdRisk {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone)]
pub struct ProviderDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub note: &'static str,
    pub recommended: bool,
    pub quality: &'static str,
    pub ad_risk: AdRisk,
    /// clicks the shield eats before letting input through
    pub shield_threshold: u32,
    /// the "click twice" explainer, purely informational
    pub show_disclosure: bool,
    url_template: UrlTemplate,
}

impl ProviderDescriptor {
    pub fn get_url(&self, content_id: u64, season: Option<u32>, episode: Option<u32>) -> String {
        (self.url_template)(content_id, season, episode)
    }
}

fn embedmaster_url(id: u64, season: Option<u32>, episode: Option<u32>) -> String {
    let base = match (season, episode) {
        (Some(s), Some(e)) => format!("https://embedmaster.link/tv/{}/{}/{}", id, s, e),
        _ => format!("https://embedmaster.link/movie/{}", id),
    };
    format!("{}?js=1&controls=0", base)
}

fn vidsrc_me_url(id: u64, season: Option<u32>, episode: Option<u32>) -> String {
    let base = match (season, episode) {
        (Some(s), Some(e)) => format!(
            "https://vidsrc.me/embed/tv?tmdb={}&season={}&episode={}",
            id, s, e
        ),
        _ => format!("https://vidsrc.me/embed/movie?tmdb={}", id),
    };
    format!("{}&js=1", base)
}

fn vidlink_url(id: u64, season: Option<u32>, episode: Option<u32>) -> String {
    let base = match (season, episode) {
        (Some(s), Some(e)) => format!("https://vidlink.pro/tv/{}/{}/{}", id, s, e),
        _ => format!("https://vidlink.pro/movie/{}", id),
    };
    format!("{}?js=1&controls=0", base)
}

pub struct ProviderRegistry {
    providers: Vec<ProviderDescriptor>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new(vec![
            ProviderDescriptor {
                id: "embedmaster",
                name: "Server 1 (Fast)",
                note: "Primary - No Ads",
                recommended: true,
                quality: "high",
                ad_risk: AdRisk::None,
                shield_threshold: 1,
                show_disclosure: false,
                url_template: embedmaster_url,
            },
            ProviderDescriptor {
                id: "vidsrc_me",
                name: "Server 2 (Backup)",
                note: "Original Server",
                recommended: false,
                quality: "high",
                ad_risk: AdRisk::Medium,
                shield_threshold: 2,
                show_disclosure: true,
                url_template: vidsrc_me_url,
            },
            ProviderDescriptor {
                id: "vidlink",
                name: "Server 3 (HD)",
                note: "Modern Player",
                recommended: false,
                quality: "HD",
                ad_risk: AdRisk::Low,
                shield_threshold: 2,
                show_disclosure: true,
                url_template: vidlink_url,
            },
        ])
    }
}

impl ProviderRegistry {
    pub fn new(providers: Vec<ProviderDescriptor>) -> Self {
        Self { providers }
    }

    pub fn all(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    pub fn get(&self, id: &str) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.id == id)
    }

    /// the first entry is what the player opens with
    pub fn primary(&self) -> Option<&ProviderDescriptor> {
        self.providers.first()
    }
}
