use std::collections::HashMap;

use crate::entities::Entity;
use crate::error::RiskError;
use crate::value_objects::{EntityId, RiskScore};

/// Authoritative list of monitored entities, kept in load order.
#[derive(Debug, Default, Clone)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    index: HashMap<EntityId, usize>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `seed`. On a duplicate id nothing changes.
    pub fn load(&mut self, seed: Vec<Entity>) -> Result<usize, RiskError> {
        let mut index = HashMap::with_capacity(seed.len());
        for (pos, entity) in seed.iter().enumerate() {
            if index.insert(entity.id, pos).is_some() {
                return Err(RiskError::DuplicateEntity(entity.id));
            }
        }
        self.entities = seed;
        self.index = index;
        Ok(self.entities.len())
    }

    pub fn list(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, id: EntityId) -> Result<&Entity, RiskError> {
        self.index
            .get(&id)
            .and_then(|pos| self.entities.get(*pos))
            .ok_or(RiskError::EntityNotFound(id))
    }

    pub fn update_score(&mut self, id: EntityId, new_score: i64) -> Result<&Entity, RiskError> {
        let pos = *self.index.get(&id).ok_or(RiskError::EntityNotFound(id))?;
        let score = RiskScore::new(new_score)?;
        let entity = self
            .entities
            .get_mut(pos)
            .ok_or(RiskError::EntityNotFound(id))?;
        entity.risk_score = score;
        Ok(&*entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
