use async_trait::async_trait;

use crate::entities::Entity;

/// Supplies the initial set of monitored entities.
#[async_trait]
pub trait SeedSource: Send + Sync {
    async fn load_seed(&self) -> anyhow::Result<Vec<Entity>>;
    fn describe(&self) -> String;
}
