// Domain errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::value_objects::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RiskError {
    #[error("duplicate entity id {0}")]
    DuplicateEntity(EntityId),
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),
    #[error("risk score {0} is outside [0, 100]")]
    InvalidScore(i64),
    #[error("analysis already in progress for entity {0}")]
    AnalysisAlreadyInProgress(EntityId),
    #[error("analysis cancelled")]
    Cancelled,
    #[error("analysis timed out after {0}ms")]
    Timeout(u64),
    #[error("scoring model error: {0}")]
    Model(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DuplicateEntity,
    EntityNotFound,
    InvalidScore,
    AnalysisAlreadyInProgress,
    Cancelled,
    Timeout,
    ModelError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DuplicateEntity => "duplicate_entity",
            ErrorKind::EntityNotFound => "entity_not_found",
            ErrorKind::InvalidScore => "invalid_score",
            ErrorKind::AnalysisAlreadyInProgress => "analysis_already_in_progress",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ModelError => "model_error",
        }
    }

    /// Cancellation is the normal result of re-selection and stays out of error UI.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ErrorKind::Cancelled)
    }
}

impl RiskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RiskError::DuplicateEntity(_) => ErrorKind::DuplicateEntity,
            RiskError::EntityNotFound(_) => ErrorKind::EntityNotFound,
            RiskError::InvalidScore(_) => ErrorKind::InvalidScore,
            RiskError::AnalysisAlreadyInProgress(_) => ErrorKind::AnalysisAlreadyInProgress,
            RiskError::Cancelled => ErrorKind::Cancelled,
            RiskError::Timeout(_) => ErrorKind::Timeout,
            RiskError::Model(_) => ErrorKind::ModelError,
        }
    }
}
