use serde::Serialize;

use cyberguard_domain::{Entity, EntityId, RegistryStats, RiskLevel};

use crate::{AppError, AppState};

/// Entity as shown on the dashboard, with its derived risk level.
#[derive(Debug, Clone, Serialize)]
pub struct EntityView {
    #[serde(flatten)]
    pub entity: Entity,
    pub risk_level: RiskLevel,
}

impl From<Entity> for EntityView {
    fn from(entity: Entity) -> Self {
        let risk_level = entity.risk_level();
        Self { entity, risk_level }
    }
}

impl std::ops::Deref for EntityView {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        &self.entity
    }
}

pub async fn list_entities(state: &AppState) -> Result<Vec<EntityView>, AppError> {
    let entities = state.dashboard.list_entities().await?;
    Ok(entities.into_iter().map(EntityView::from).collect())
}

pub async fn get_entity(state: &AppState, id: EntityId) -> Result<EntityView, AppError> {
    state.dashboard.get_entity(id).await.map(EntityView::from)
}

pub async fn registry_stats(state: &AppState) -> Result<RegistryStats, AppError> {
    state.dashboard.stats().await
}
