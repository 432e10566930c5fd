use async_trait::async_trait;

use crate::entities::{Entity, ModelProposal};

/// External predictor for one entity snapshot. Implementations place no
/// constraint on the range of returned scores; the caller normalizes them.
#[async_trait]
pub trait ScoringModel: Send + Sync {
    fn name(&self) -> &str;
    async fn analyze(&self, entity: &Entity) -> anyhow::Result<ModelProposal>;
}
