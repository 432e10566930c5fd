use cyberguard_domain::{Entity, EntityId};
use tracing::info;

use crate::{AppError, AppState};

/// Replaces the registry contents. Rejected seeds leave the registry as it was.
pub async fn load_entities(state: &AppState, entities: Vec<Entity>) -> Result<usize, AppError> {
    for entity in &entities {
        if entity.name.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "entity {} has an empty name",
                entity.id
            )));
        }
        if entity.address.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "entity {} has an empty address",
                entity.id
            )));
        }
    }
    state.dashboard.load_entities(entities).await
}

pub async fn reload_entities(state: &AppState) -> Result<usize, AppError> {
    let source = state.seed_source.describe();
    let seed = state.seed_source.load_seed().await?;
    info!("reloading {} entities from {}", seed.len(), source);
    load_entities(state, seed).await
}

pub async fn update_entity_score(
    state: &AppState,
    id: EntityId,
    score: i64,
) -> Result<Entity, AppError> {
    state.dashboard.update_score(id, score).await
}
