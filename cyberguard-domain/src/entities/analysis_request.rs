// Analysis request entity
// One unit of analysis work and its lifecycle state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::RiskAnalysis;
use crate::error::{ErrorKind, RiskError};
use crate::value_objects::{EntityId, RequestId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub id: RequestId,
    pub entity_id: EntityId,
    #[serde(flatten)]
    pub state: AnalysisState,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnalysisState {
    Running,
    Completed { analysis: RiskAnalysis },
    Failed { failure: AnalysisFailure },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub user_visible: bool,
}

impl From<&RiskError> for AnalysisFailure {
    fn from(err: &RiskError) -> Self {
        let kind = err.kind();
        Self {
            kind,
            message: err.to_string(),
            user_visible: kind.is_user_visible(),
        }
    }
}

impl AnalysisRequest {
    pub fn running(entity_id: EntityId, now: DateTime<Utc>) -> Self {
        Self {
            id: RequestId::new(),
            entity_id,
            state: AnalysisState::Running,
            started_at: now,
            finished_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, AnalysisState::Running)
    }

    pub fn analysis(&self) -> Option<&RiskAnalysis> {
        match &self.state {
            AnalysisState::Completed { analysis } => Some(analysis),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&AnalysisFailure> {
        match &self.state {
            AnalysisState::Failed { failure } => Some(failure),
            _ => None,
        }
    }

    pub(crate) fn complete(&mut self, analysis: RiskAnalysis, now: DateTime<Utc>) {
        self.state = AnalysisState::Completed { analysis };
        self.finished_at = Some(now);
    }

    pub(crate) fn fail(&mut self, err: &RiskError, now: DateTime<Utc>) {
        self.state = AnalysisState::Failed {
            failure: AnalysisFailure::from(err),
        };
        self.finished_at = Some(now);
    }
}
