// Bulk assessment
//
// Scores a registry snapshot in one pass. Runs beside the analysis session:
// it never touches the current request, the history or registry scores.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{AnalysisFailure, ModelProposal, RiskAnalysis};
use crate::error::RiskError;
use crate::services::EntityRegistry;
use crate::value_objects::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityAssessment {
    pub entity_id: EntityId,
    #[serde(flatten)]
    pub outcome: AssessmentOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AssessmentOutcome {
    Completed { analysis: RiskAnalysis },
    Failed { failure: AnalysisFailure },
}

impl EntityAssessment {
    pub fn analysis(&self) -> Option<&RiskAnalysis> {
        match &self.outcome {
            AssessmentOutcome::Completed { analysis } => Some(analysis),
            AssessmentOutcome::Failed { .. } => None,
        }
    }

    pub fn failure(&self) -> Option<&AnalysisFailure> {
        match &self.outcome {
            AssessmentOutcome::Completed { .. } => None,
            AssessmentOutcome::Failed { failure } => Some(failure),
        }
    }
}

/// Normalizes scored proposals against the registry as it stands now.
/// Output keeps the order of `results`; an entity removed since the
/// snapshot was taken fails with `EntityNotFound`.
pub fn resolve_bulk(
    results: Vec<(EntityId, Result<ModelProposal, RiskError>)>,
    registry: &EntityRegistry,
    model: &str,
    now: DateTime<Utc>,
) -> Vec<EntityAssessment> {
    results
        .into_iter()
        .map(|(entity_id, result)| {
            let outcome = result
                .and_then(|proposal| {
                    let live = registry.get(entity_id)?.risk_score;
                    Ok(proposal.into_analysis(entity_id, live, model, now))
                })
                .map(|analysis| AssessmentOutcome::Completed { analysis })
                .unwrap_or_else(|err| AssessmentOutcome::Failed {
                    failure: AnalysisFailure::from(&err),
                });
            EntityAssessment { entity_id, outcome }
        })
        .collect()
}
