// player side state: which provider/season/episode is mounted and the click shield in front of it
//
// this is the reducer the watch page runs, the server only hands out the config it needs
pub mod providers;
pub mod shield;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::providers::{ProviderDescriptor, ProviderRegistry};
use self::shield::{ClickOutcome, ShieldKey, ShieldState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchAction {
    SelectProvider(String),
    SelectSeason(u32),
    SelectEpisode(u32),
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// identity key changed, the iframe and shield start over
    Remounted,
    Unchanged,
    Click(ClickOutcome),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("no providers configured")]
    NoProviders,

    #[error("season must be 1 or higher")]
    InvalidSeason,

    #[error("episode must be 1 or higher")]
    InvalidEpisode,
}

#[derive(Debug, Clone)]
pub struct WatchSession {
    content_id: u64,
    kind: MediaKind,
    provider: ProviderDescriptor,
    season: u32,
    episode: u32,
    shield: ShieldState,
}

impl WatchSession {
    /// opens on the registry's primary provider, season 1 episode 1
    pub fn open(
        registry: &ProviderRegistry,
        content_id: u64,
        kind: MediaKind,
    ) -> Result<Self, SessionError> {
        let provider = registry.primary().ok_or(SessionError::NoProviders)?.clone();

        Ok(Self {
            content_id,
            kind,
            shield: ShieldState::armed(provider.shield_threshold),
            provider,
            season: 1,
            episode: 1,
        })
    }

    pub fn key(&self) -> ShieldKey {
        let (season, episode) = self.season_episode();
        ShieldKey::new(self.provider.id, season, episode)
    }

    pub fn embed_url(&self) -> String {
        let (season, episode) = self.season_episode();
        self.provider.get_url(self.content_id, season, episode)
    }

    pub fn shield(&self) -> &ShieldState {
        &self.shield
    }

    pub fn provider(&self) -> &ProviderDescriptor {
        &self.provider
    }

    pub fn apply(
        &mut self,
        registry: &ProviderRegistry,
        action: WatchAction,
    ) -> Result<Transition, SessionError> {
        let before = self.key();

        match action {
            WatchAction::Click => return Ok(Transition::Click(self.shield.click())),
            WatchAction::SelectProvider(id) => {
                self.provider = registry
                    .get(&id)
                    .ok_or(SessionError::UnknownProvider(id))?
                    .clone();
            }
            WatchAction::SelectSeason(0) => return Err(SessionError::InvalidSeason),
            WatchAction::SelectEpisode(0) => return Err(SessionError::InvalidEpisode),
            // picking a season always starts it from the first episode
            WatchAction::SelectSeason(season) => {
                self.season = season;
                self.episode = 1;
            }
            WatchAction::SelectEpisode(episode) => self.episode = episode,
        }

        if self.key() == before {
            return Ok(Transition::Unchanged);
        }

        self.shield = ShieldState::armed(self.provider.shield_threshold);
        Ok(Transition::Remounted)
    }

    // movies never carry season/episode, switching "seasons" on a movie is a no-op
    fn season_episode(&self) -> (Option<u32>, Option<u32>) {
        match self.kind {
            MediaKind::Tv => (Some(self.season), Some(self.episode)),
            MediaKind::Movie => (None, None),
        }
    }
}
