use std::sync::Arc;

use cyberguard_domain::{RuntimeConfig, ScoringModel, SeedSource};

use crate::ops::{AnalysisStreamHub, DashboardHandle};
use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub dashboard: DashboardHandle,
    pub seed_source: Arc<dyn SeedSource>,
    pub metrics: Arc<Metrics>,
    pub analysis_hub: Arc<AnalysisStreamHub>,
    pub model_name: String,
}

impl AppState {
    /// Starts the dashboard actor. Must be called inside a tokio runtime.
    pub fn new(
        config: RuntimeConfig,
        seed_source: Arc<dyn SeedSource>,
        model: Arc<dyn ScoringModel>,
    ) -> Self {
        let metrics = Arc::new(Metrics::default());
        let analysis_hub = Arc::new(AnalysisStreamHub::default());
        let model_name = model.name().to_string();
        let dashboard =
            DashboardHandle::spawn(&config, model, metrics.clone(), analysis_hub.clone());
        Self {
            config,
            dashboard,
            seed_source,
            metrics,
            analysis_hub,
            model_name,
        }
    }
}
