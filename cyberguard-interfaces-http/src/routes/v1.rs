use axum::routing::{get, post, put};
use axum::Router;

use cyberguard_application::AppState;

use crate::handlers::{analysis_handlers, entity_handlers, ops_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/entities",
            get(entity_handlers::list_entities).put(entity_handlers::replace_entities),
        )
        .route("/v1/entities/reload", post(entity_handlers::reload_entities))
        .route("/v1/entities/:id", get(entity_handlers::get_entity))
        .route(
            "/v1/entities/:id/score",
            put(entity_handlers::update_entity_score),
        )
        .route("/v1/stats", get(entity_handlers::registry_stats))
        .route(
            "/v1/analysis",
            get(analysis_handlers::current_analysis).post(analysis_handlers::start_analysis),
        )
        .route(
            "/v1/analysis/history",
            get(analysis_handlers::analysis_history),
        )
        .route("/v1/analysis/bulk", post(analysis_handlers::bulk_assess))
        .route("/v1/analysis/ws", get(analysis_handlers::analysis_feed))
        .route("/v1/ops/health/live", get(ops_handlers::health_live))
        .route("/v1/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v1/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
