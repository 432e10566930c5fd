use cyberguard_domain::AnalysisRequest;

use crate::{AppError, AppState};

const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 200;

/// `None` while the session is idle.
pub async fn current_analysis(state: &AppState) -> Result<Option<AnalysisRequest>, AppError> {
    state.dashboard.current_analysis().await
}

pub async fn analysis_history(
    state: &AppState,
    limit: Option<usize>,
) -> Result<Vec<AnalysisRequest>, AppError> {
    let limit = limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    if limit == 0 {
        return Ok(Vec::new());
    }
    state.dashboard.analysis_history(limit).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::commands::{reload_entities, start_analysis};
    use crate::test_support::{sample_entities, test_state};
    use cyberguard_domain::{EntityId, ErrorKind};

    #[tokio::test]
    async fn idle_session_has_no_current_request() {
        let state = test_state(sample_entities());
        assert!(current_analysis(&state).await.expect("current").is_none());
        assert!(analysis_history(&state, None).await.expect("history").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn history_is_newest_first_and_limited() {
        let state = test_state(sample_entities());
        reload_entities(&state).await.expect("reload");

        start_analysis(&state, EntityId(1)).await.expect("start 1");
        start_analysis(&state, EntityId(2)).await.expect("start 2");
        tokio::time::sleep(Duration::from_millis(50)).await;

        let history = analysis_history(&state, None).await.expect("history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].entity_id, EntityId(2));
        assert!(history[0].analysis().is_some());
        assert_eq!(history[1].failure().map(|f| f.kind), Some(ErrorKind::Cancelled));

        let limited = analysis_history(&state, Some(1)).await.expect("history");
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].entity_id, EntityId(2));

        let empty = analysis_history(&state, Some(0)).await.expect("history");
        assert!(empty.is_empty());
    }
}
