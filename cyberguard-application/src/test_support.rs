use std::sync::Arc;

use async_trait::async_trait;
use cyberguard_domain::{
    Entity, ModelProposal, RiskScore, RuntimeConfig, ScoringModel, SeedSource, Trend,
};

use crate::AppState;

pub(crate) struct StaticSeed(pub Vec<Entity>);

#[async_trait]
impl SeedSource for StaticSeed {
    async fn load_seed(&self) -> anyhow::Result<Vec<Entity>> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static seed".to_string()
    }
}

/// Predicts `current + 5` after a short delay.
pub(crate) struct StepModel;

#[async_trait]
impl ScoringModel for StepModel {
    fn name(&self) -> &str {
        "step"
    }

    async fn analyze(&self, entity: &Entity) -> anyhow::Result<ModelProposal> {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        Ok(ModelProposal {
            current_score: None,
            predicted_score: i64::from(entity.risk_score.value()) + 5,
            factors: Vec::new(),
            trend: Some(Trend::Increasing),
            recommendations: Vec::new(),
        })
    }
}

pub(crate) fn sample_entities() -> Vec<Entity> {
    [
        (1u64, "Database Server", "192.168.1.100", 42),
        (2, "Web Server", "192.168.1.200", 75),
        (3, "Email Server", "192.168.1.150", 28),
        (4, "File Server", "192.168.1.120", 58),
        (5, "Domain Controller", "192.168.1.10", 85),
    ]
    .into_iter()
    .map(|(id, name, address, score)| {
        Entity::new(id, name, address, RiskScore::new(score).expect("score"))
    })
    .collect()
}

pub(crate) fn test_state(seed: Vec<Entity>) -> AppState {
    AppState::new(
        RuntimeConfig::default(),
        Arc::new(StaticSeed(seed)),
        Arc::new(StepModel),
    )
}
