use cyberguard_domain::{AnalysisRequest, EntityAssessment, EntityId};

use crate::{AppError, AppState};

/// Selects `entity_id` for analysis. Any running request for another entity
/// is cancelled; the returned request is `Running` unless it failed on entry.
pub async fn start_analysis(
    state: &AppState,
    entity_id: EntityId,
) -> Result<AnalysisRequest, AppError> {
    state.dashboard.start_analysis(entity_id).await
}

/// Scores every registered entity in one pass. The current request, the
/// history and registry scores are left as they are.
pub async fn bulk_assess(state: &AppState) -> Result<Vec<EntityAssessment>, AppError> {
    state.dashboard.bulk_assess().await
}
