use serde::{Deserialize, Serialize};

/// the slice of `/tv/{id}/season/{n}` that the episode picker cares about
#[derive(Debug, Deserialize)]
pub struct TmdbSeasonResponse {
    #[serde(default)]
    pub episodes: Vec<TmdbEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbEpisode {
    pub episode_number: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    /// "YYYY-MM-DD", missing or empty for anything unannounced
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub episode_number: u32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: String,
    pub still_path: Option<String>,
    pub runtime: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SeasonEpisodesResponse {
    pub tv_id: u64,
    pub season: u32,
    pub episodes: Vec<EpisodeSummary>,
}
