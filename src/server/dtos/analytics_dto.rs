use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::player::MediaKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    /// same rough sniffing the frontend always did, it only needs to be right most of the time
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let ua = user_agent.unwrap_or("").to_ascii_lowercase();

        if ua.contains("mobi") || ua.contains("android") {
            DeviceType::Mobile
        } else if ua.contains("tablet") || ua.contains("ipad") {
            DeviceType::Tablet
        } else {
            DeviceType::Desktop
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PageViewRequest {
    #[validate(length(min = 1, max = 128, message = "session_id must be 1-128 characters"))]
    pub session_id: String,

    #[validate(length(min = 1, max = 2048, message = "path cannot be empty"))]
    pub path: String,

    #[serde(default)]
    #[validate(length(max = 512))]
    pub movie_title: Option<String>,

    #[serde(default)]
    #[validate(length(max = 256))]
    pub region: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct HeartbeatRequest {
    #[validate(length(min = 1, max = 128, message = "session_id must be 1-128 characters"))]
    pub session_id: String,

    #[validate(length(min = 1, max = 2048, message = "current_path cannot be empty"))]
    pub current_path: String,

    #[validate(length(min = 1, max = 512, message = "movie_title cannot be empty"))]
    pub movie_title: String,

    #[serde(default)]
    #[validate(length(max = 256))]
    pub region: Option<String>,
}

/// player interactions that aren't page loads
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerEventRequest {
    ProviderSwitch {
        provider_id: String,
    },
    EpisodeSelect {
        content_id: u64,
        title: String,
        season: u32,
        episode: u32,
    },
}

// the derive only handles structs, so the tagged enum checks its fields by hand
impl Validate for PlayerEventRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let mut reject = |field: &'static str, code: &'static str, message: &'static str| {
            let mut error = ValidationError::new(code);
            error.message = Some(Cow::from(message));
            errors.add(field, error);
        };

        match self {
            PlayerEventRequest::ProviderSwitch { provider_id } => {
                if provider_id.is_empty() || provider_id.len() > 64 {
                    reject("provider_id", "length", "provider_id must be 1-64 characters");
                }
            }
            PlayerEventRequest::EpisodeSelect {
                content_id,
                title,
                season,
                episode,
            } => {
                if *content_id == 0 {
                    reject("content_id", "range", "content_id must be a positive id");
                }
                if title.is_empty() || title.chars().count() > 512 {
                    reject("title", "length", "title must be 1-512 characters");
                }
                if *season == 0 {
                    reject("season", "range", "season must be 1 or higher");
                }
                if *episode == 0 {
                    reject("episode", "range", "episode must be 1 or higher");
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub accepted: bool,
}

/// everything the sink can be handed
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent {
    ContentPlay {
        content_id: u64,
        kind: MediaKind,
        provider_id: String,
        season: Option<u32>,
        episode: Option<u32>,
    },
    ProviderSwitch {
        provider_id: String,
        provider_name: String,
    },
    EpisodeSelect {
        content_id: u64,
        title: String,
        season: u32,
        episode: u32,
    },
    PageView {
        session_id: String,
        path: String,
        movie_title: Option<String>,
        device: DeviceType,
        region: Option<String>,
    },
    Heartbeat {
        session_id: String,
        current_path: String,
        movie_title: String,
        device: DeviceType,
        region: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode_select(title: String, season: u32) -> PlayerEventRequest {
        PlayerEventRequest::EpisodeSelect {
            content_id: 1399,
            title,
            season,
            episode: 1,
        }
    }

    #[test]
    fn episode_select_limits_title_and_season() {
        assert!(episode_select("Winter Is Coming".to_string(), 1).validate().is_ok());

        let errors = episode_select("x".repeat(513), 0).validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("title"));
        assert!(fields.contains_key("season"));
    }

    #[test]
    fn provider_switch_needs_an_id() {
        let event = PlayerEventRequest::ProviderSwitch {
            provider_id: String::new(),
        };

        assert!(event.validate().is_err());
    }

    #[test]
    fn device_is_sniffed_from_user_agent() {
        assert_eq!(
            DeviceType::from_user_agent(Some("Mozilla/5.0 (Linux; Android 14) Mobile")),
            DeviceType::Mobile
        );
        assert_eq!(
            DeviceType::from_user_agent(Some("Mozilla/5.0 (iPad; CPU OS 17_0)")),
            DeviceType::Tablet
        );
        assert_eq!(DeviceType::from_user_agent(None), DeviceType::Desktop);
    }
}
