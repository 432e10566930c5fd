use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use cyberguard_application::commands::entity_commands;
use cyberguard_application::queries::{entity_queries, EntityView};
use cyberguard_application::AppState;
use cyberguard_domain::{Entity, EntityId, RegistryStats};

use crate::error::HttpError;

#[derive(Deserialize)]
pub struct ScoreUpdate {
    pub risk_score: i64,
}

#[derive(Serialize)]
pub struct LoadSummary {
    pub loaded: usize,
}

pub async fn list_entities(State(state): State<AppState>) -> Result<Json<Vec<EntityView>>, HttpError> {
    let entities = entity_queries::list_entities(&state).await?;
    Ok(Json(entities))
}

pub async fn replace_entities(
    State(state): State<AppState>,
    Json(payload): Json<Vec<Entity>>,
) -> Result<Json<LoadSummary>, HttpError> {
    let loaded = entity_commands::load_entities(&state, payload).await?;
    Ok(Json(LoadSummary { loaded }))
}

pub async fn reload_entities(State(state): State<AppState>) -> Result<Json<LoadSummary>, HttpError> {
    let loaded = entity_commands::reload_entities(&state).await?;
    Ok(Json(LoadSummary { loaded }))
}

pub async fn get_entity(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<EntityView>, HttpError> {
    let entity = entity_queries::get_entity(&state, EntityId(id)).await?;
    Ok(Json(entity))
}

pub async fn update_entity_score(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<ScoreUpdate>,
) -> Result<Json<EntityView>, HttpError> {
    let entity =
        entity_commands::update_entity_score(&state, EntityId(id), payload.risk_score).await?;
    Ok(Json(EntityView::from(entity)))
}

pub async fn registry_stats(State(state): State<AppState>) -> Result<Json<RegistryStats>, HttpError> {
    let stats = entity_queries::registry_stats(&state).await?;
    Ok(Json(stats))
}
