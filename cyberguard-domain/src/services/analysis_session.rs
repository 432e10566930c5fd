use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::entities::{AnalysisRequest, Entity, ModelProposal, ScorePolicy};
use crate::error::{ErrorKind, RiskError};
use crate::services::EntityRegistry;
use crate::value_objects::{EntityId, RequestId};

/// Work order for the scoring model: which request it belongs to and the
/// entity snapshot taken when the request entered `Running`.
#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub request_id: RequestId,
    pub entity: Entity,
}

#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub request: AnalysisRequest,
    pub cancelled: Option<AnalysisRequest>,
    /// `None` when the request failed before reaching the model.
    pub ticket: Option<AnalysisTicket>,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Applied(AnalysisRequest),
    Discarded { request_id: RequestId, reason: ErrorKind },
}

/// State machine for the single outstanding analysis request.
///
/// `Idle` is represented by the absence of a current request. Only the
/// current request can transition; results for anything else are discarded.
#[derive(Debug)]
pub struct AnalysisSession {
    current: Option<AnalysisRequest>,
    /// Audit log of finished requests. Never read back into `current`.
    history: VecDeque<AnalysisRequest>,
    history_limit: usize,
    policy: ScorePolicy,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new(ScorePolicy::default(), 32)
    }
}

impl AnalysisSession {
    pub fn new(policy: ScorePolicy, history_limit: usize) -> Self {
        Self {
            current: None,
            history: VecDeque::with_capacity(history_limit),
            history_limit,
            policy,
        }
    }

    pub fn current(&self) -> Option<&AnalysisRequest> {
        self.current.as_ref()
    }

    pub fn selected_entity(&self) -> Option<EntityId> {
        self.current.as_ref().map(|request| request.entity_id)
    }

    /// Finished requests, newest first.
    pub fn history(&self, limit: usize) -> Vec<AnalysisRequest> {
        self.history.iter().take(limit).cloned().collect()
    }

    pub fn start(
        &mut self,
        entity_id: EntityId,
        registry: &EntityRegistry,
        now: DateTime<Utc>,
    ) -> Result<StartOutcome, RiskError> {
        if let Some(current) = &self.current {
            if current.is_running() && current.entity_id == entity_id {
                return Err(RiskError::AnalysisAlreadyInProgress(entity_id));
            }
        }

        let cancelled = match self.current.as_mut() {
            Some(current) if current.is_running() => {
                current.fail(&RiskError::Cancelled, now);
                Some(current.clone())
            }
            _ => None,
        };
        if let Some(request) = &cancelled {
            self.record(request.clone());
        }

        let mut request = AnalysisRequest::running(entity_id, now);
        let ticket = match registry.get(entity_id) {
            Ok(entity) => Some(AnalysisTicket {
                request_id: request.id,
                entity: entity.clone(),
            }),
            Err(err) => {
                request.fail(&err, now);
                self.record(request.clone());
                None
            }
        };
        self.current = Some(request.clone());

        Ok(StartOutcome {
            request,
            cancelled,
            ticket,
        })
    }

    /// Apply a scoring model result. `current_score` is read from `registry`
    /// at this point, never taken from the proposal.
    pub fn complete(
        &mut self,
        request_id: RequestId,
        outcome: anyhow::Result<ModelProposal>,
        model: &str,
        registry: &mut EntityRegistry,
        now: DateTime<Utc>,
    ) -> Resolution {
        let Some(current) = self.running_mut(request_id) else {
            return self.discard(request_id);
        };
        let entity_id = current.entity_id;

        let result = outcome
            .map_err(|err| RiskError::Model(format!("{err:#}")))
            .and_then(|proposal| {
                let live = registry.get(entity_id)?.risk_score;
                Ok(proposal.into_analysis(entity_id, live, model, now))
            })
            .and_then(|analysis| {
                if self.policy == ScorePolicy::ApplyPredicted {
                    registry.update_score(entity_id, i64::from(analysis.predicted_score.value()))?;
                }
                Ok(analysis)
            });

        let Some(current) = self.running_mut(request_id) else {
            return self.discard(request_id);
        };
        match result {
            Ok(analysis) => current.complete(analysis, now),
            Err(err) => current.fail(&err, now),
        }
        let snapshot = current.clone();
        self.record(snapshot.clone());
        Resolution::Applied(snapshot)
    }

    /// Force the current request to `Failed{Timeout}`. Returns `None` if the
    /// request is no longer current or already finished.
    pub fn expire(
        &mut self,
        request_id: RequestId,
        timeout_ms: u64,
        now: DateTime<Utc>,
    ) -> Option<AnalysisRequest> {
        let current = self.running_mut(request_id)?;
        current.fail(&RiskError::Timeout(timeout_ms), now);
        let snapshot = current.clone();
        self.record(snapshot.clone());
        Some(snapshot)
    }

    fn running_mut(&mut self, request_id: RequestId) -> Option<&mut AnalysisRequest> {
        self.current
            .as_mut()
            .filter(|request| request.id == request_id && request.is_running())
    }

    fn discard(&self, request_id: RequestId) -> Resolution {
        let reason = self
            .current
            .iter()
            .chain(self.history.iter())
            .find(|request| request.id == request_id)
            .and_then(|request| request.failure().map(|failure| failure.kind))
            .unwrap_or(ErrorKind::Cancelled);
        Resolution::Discarded { request_id, reason }
    }

    fn record(&mut self, request: AnalysisRequest) {
        if self.history_limit == 0 {
            return;
        }
        self.history.push_front(request);
        self.history.truncate(self.history_limit);
    }
}
