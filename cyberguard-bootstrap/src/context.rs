use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use cyberguard_application::commands::reload_entities;
use cyberguard_application::AppState;
use cyberguard_domain::{ScoringModel, ScoringModelKind};
use cyberguard_infrastructure::{
    AppConfig, RemoteScoringModel, RuleBasedScoringModel, SeedFileRepository,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    /// Wires the ports, starts the dashboard actor and loads the seed.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let seed_source = Arc::new(SeedFileRepository::new(&config.seed_path));
        let model = build_model(config)?;

        let state = AppState::new(runtime_config, seed_source, model);
        let loaded = reload_entities(&state)
            .await
            .with_context(|| format!("failed to load seed from {}", config.seed_path))?;
        info!(
            "registry ready: {} entities, scoring model '{}'",
            loaded, state.model_name
        );

        Ok(Self { state })
    }
}

fn build_model(config: &AppConfig) -> Result<Arc<dyn ScoringModel>> {
    match config.scoring_model {
        ScoringModelKind::Rules => Ok(Arc::new(RuleBasedScoringModel::new(
            Duration::from_millis(config.model_latency_ms),
        ))),
        ScoringModelKind::Remote => {
            let url = config
                .remote_model_url
                .as_deref()
                .context("remote_model_url is not set")?;
            let model = RemoteScoringModel::new(
                url,
                Duration::from_secs(config.request_timeout_seconds),
            )?;
            info!("remote scoring model at {}", model.endpoint());
            Ok(Arc::new(model))
        }
    }
}
