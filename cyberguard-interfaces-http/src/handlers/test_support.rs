use std::sync::Arc;

use async_trait::async_trait;
use cyberguard_application::commands::reload_entities;
use cyberguard_application::AppState;
use cyberguard_domain::{
    Entity, ModelProposal, RiskScore, RuntimeConfig, ScoringModel, SeedSource,
};

struct FixedSeed;

#[async_trait]
impl SeedSource for FixedSeed {
    async fn load_seed(&self) -> anyhow::Result<Vec<Entity>> {
        Ok([
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
        .collect())
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

struct PlusFive;

#[async_trait]
impl ScoringModel for PlusFive {
    fn name(&self) -> &str {
        "plus-five"
    }

    async fn analyze(&self, entity: &Entity) -> anyhow::Result<ModelProposal> {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        Ok(ModelProposal {
            predicted_score: i64::from(entity.risk_score.value()) + 5,
            ..ModelProposal::default()
        })
    }
}

pub(crate) async fn seeded_state() -> AppState {
    let state = AppState::new(
        RuntimeConfig::default(),
        Arc::new(FixedSeed),
        Arc::new(PlusFive),
    );
    reload_entities(&state).await.expect("seed");
    state
}
