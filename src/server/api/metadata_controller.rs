use axum::{Extension, Json, Router, extract::Path, routing::get};
use serde_json::Value;
use tracing::info;

use crate::{
    player::MediaKind,
    server::{
        dtos::metadata_dto::SeasonEpisodesResponse,
        error::{AppResult, Error},
        services::Services,
    },
};

pub struct MetadataController;

impl MetadataController {
    pub fn app() -> Router {
        Router::new()
            .route("/{media_type}/{id}", get(Self::details_endpoint))
            .route(
                "/tv/{id}/season/{season}/episodes",
                get(Self::season_episodes_endpoint),
            )
    }

    /// GET /api/v1/metadata/{movie|tv}/{id}
    ///
    /// straight pass through of the provider's details object
    pub async fn details_endpoint(
        Extension(services): Extension<Services>,
        Path((media_type, id)): Path<(MediaKind, u64)>,
    ) -> AppResult<Json<Value>> {
        let details = services.metadata.details(media_type, id).await?;
        Ok(Json(details))
    }

    /// GET /api/v1/metadata/tv/{id}/season/{season}/episodes
    ///
    /// only episodes that have already aired, unannounced ones would just be dead buttons
    pub async fn season_episodes_endpoint(
        Extension(services): Extension<Services>,
        Path((id, season)): Path<(u64, u32)>,
    ) -> AppResult<Json<SeasonEpisodesResponse>> {
        if season == 0 {
            // specials are hidden in the picker
            return Err(Error::BadRequest("season must be 1 or higher".to_string()));
        }

        let episodes = services.metadata.season_episodes(id, season).await?;
        info!(
            "{} aired episodes for tv {} season {}",
            episodes.len(),
            id,
            season
        );

        Ok(Json(SeasonEpisodesResponse {
            tv_id: id,
            season,
            episodes,
        }))
    }
}
