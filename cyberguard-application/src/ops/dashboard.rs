//! Serialized control context for the dashboard.
//!
//! One task owns the entity registry and the analysis session. Every
//! registry mutation and every request transition is a message on the
//! actor's channel, including scoring model results and deadlines, so the
//! domain state needs no locks.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use cyberguard_domain::{
    AnalysisRequest, AnalysisSession, AnalysisTicket, Entity, EntityAssessment, EntityId,
    EntityRegistry, ModelProposal, RegistryStats, RequestId, Resolution, RiskError,
    RuntimeConfig, ScoringModel,
};

use crate::{AnalysisStreamHub, AppError, Metrics};

const COMMAND_BUFFER: usize = 256;

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Load {
        seed: Vec<Entity>,
        reply: Reply<Result<usize, AppError>>,
    },
    List {
        reply: Reply<Vec<Entity>>,
    },
    Get {
        id: EntityId,
        reply: Reply<Result<Entity, AppError>>,
    },
    UpdateScore {
        id: EntityId,
        score: i64,
        reply: Reply<Result<Entity, AppError>>,
    },
    Stats {
        reply: Reply<RegistryStats>,
    },
    StartAnalysis {
        entity_id: EntityId,
        reply: Reply<Result<AnalysisRequest, AppError>>,
    },
    CurrentAnalysis {
        reply: Reply<Option<AnalysisRequest>>,
    },
    History {
        limit: usize,
        reply: Reply<Vec<AnalysisRequest>>,
    },
    ModelResolved {
        request_id: RequestId,
        result: anyhow::Result<ModelProposal>,
    },
    Deadline {
        request_id: RequestId,
    },
    BulkScored {
        results: Vec<(EntityId, Result<ModelProposal, RiskError>)>,
        reply: Reply<Vec<EntityAssessment>>,
    },
}

/// Cloneable front door to the dashboard actor.
#[derive(Clone)]
pub struct DashboardHandle {
    tx: mpsc::Sender<Command>,
    model: Arc<dyn ScoringModel>,
    timeout: Duration,
}

impl DashboardHandle {
    pub fn spawn(
        config: &RuntimeConfig,
        model: Arc<dyn ScoringModel>,
        metrics: Arc<Metrics>,
        hub: Arc<AnalysisStreamHub>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let actor = DashboardActor {
            registry: EntityRegistry::new(),
            session: AnalysisSession::new(config.score_policy, config.history_limit),
            model: model.clone(),
            timeout: config.analysis_timeout(),
            metrics,
            hub,
            loopback: tx.downgrade(),
            deadline: None,
        };
        tokio::spawn(actor.run(rx));
        Self {
            tx,
            model,
            timeout: config.analysis_timeout(),
        }
    }

    pub async fn load_entities(&self, seed: Vec<Entity>) -> Result<usize, AppError> {
        self.call(|reply| Command::Load { seed, reply }).await?
    }

    pub async fn list_entities(&self) -> Result<Vec<Entity>, AppError> {
        self.call(|reply| Command::List { reply }).await
    }

    pub async fn get_entity(&self, id: EntityId) -> Result<Entity, AppError> {
        self.call(|reply| Command::Get { id, reply }).await?
    }

    pub async fn update_score(&self, id: EntityId, score: i64) -> Result<Entity, AppError> {
        self.call(|reply| Command::UpdateScore { id, score, reply })
            .await?
    }

    pub async fn stats(&self) -> Result<RegistryStats, AppError> {
        self.call(|reply| Command::Stats { reply }).await
    }

    /// Returns once the request is recorded as `Running` (or failed on entry);
    /// the model result arrives later.
    pub async fn start_analysis(&self, entity_id: EntityId) -> Result<AnalysisRequest, AppError> {
        self.call(|reply| Command::StartAnalysis { entity_id, reply })
            .await?
    }

    pub async fn current_analysis(&self) -> Result<Option<AnalysisRequest>, AppError> {
        self.call(|reply| Command::CurrentAnalysis { reply }).await
    }

    pub async fn analysis_history(&self, limit: usize) -> Result<Vec<AnalysisRequest>, AppError> {
        self.call(|reply| Command::History { limit, reply }).await
    }

    /// Scores every registered entity concurrently, outside the analysis
    /// session. Each model call gets the analysis timeout; results are
    /// normalized against the registry once all calls have settled and
    /// nothing is written back.
    pub async fn bulk_assess(&self) -> Result<Vec<EntityAssessment>, AppError> {
        let snapshot = self.list_entities().await?;
        let timeout_ms = timeout_millis(self.timeout);

        let tasks: Vec<_> = snapshot
            .into_iter()
            .map(|entity| {
                let model = self.model.clone();
                let timeout = self.timeout;
                let entity_id = entity.id;
                let task = tokio::spawn(async move {
                    match tokio::time::timeout(timeout, model.analyze(&entity)).await {
                        Ok(Ok(proposal)) => Ok(proposal),
                        Ok(Err(err)) => Err(RiskError::Model(format!("{err:#}"))),
                        Err(_) => Err(RiskError::Timeout(timeout_ms)),
                    }
                });
                (entity_id, task)
            })
            .collect();

        let mut results = Vec::with_capacity(tasks.len());
        for (entity_id, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(err) => Err(RiskError::Model(format!("scoring task failed: {err}"))),
            };
            results.push((entity_id, result));
        }

        self.call(|reply| Command::BulkScored { results, reply })
            .await
    }

    pub fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }

    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, AppError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| AppError::Internal(anyhow!("dashboard actor stopped")))?;
        rx.await
            .map_err(|_| AppError::Internal(anyhow!("dashboard actor dropped the reply")))
    }
}

struct DashboardActor {
    registry: EntityRegistry,
    session: AnalysisSession,
    model: Arc<dyn ScoringModel>,
    timeout: Duration,
    metrics: Arc<Metrics>,
    hub: Arc<AnalysisStreamHub>,
    loopback: mpsc::WeakSender<Command>,
    deadline: Option<JoinHandle<()>>,
}

impl DashboardActor {
    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(command) = rx.recv().await {
            self.handle(command);
        }
        self.clear_deadline();
        info!("dashboard actor stopped");
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Load { seed, reply } => {
                let _ = reply.send(self.load(seed));
            }
            Command::List { reply } => {
                let _ = reply.send(self.registry.list().to_vec());
            }
            Command::Get { id, reply } => {
                let result = self.registry.get(id).cloned().map_err(AppError::from);
                let _ = reply.send(result);
            }
            Command::UpdateScore { id, score, reply } => {
                let result = self
                    .registry
                    .update_score(id, score)
                    .cloned()
                    .map_err(AppError::from);
                if let Ok(entity) = &result {
                    info!("entity {} risk score set to {}", entity.id, entity.risk_score);
                }
                let _ = reply.send(result);
            }
            Command::Stats { reply } => {
                let _ = reply.send(cyberguard_domain::summarize(self.registry.list()));
            }
            Command::StartAnalysis { entity_id, reply } => {
                let _ = reply.send(self.start_analysis(entity_id));
            }
            Command::CurrentAnalysis { reply } => {
                let _ = reply.send(self.session.current().cloned());
            }
            Command::History { limit, reply } => {
                let _ = reply.send(self.session.history(limit));
            }
            Command::ModelResolved { request_id, result } => {
                self.resolve(request_id, result);
            }
            Command::Deadline { request_id } => {
                self.expire(request_id);
            }
            Command::BulkScored { results, reply } => {
                let _ = reply.send(self.resolve_bulk(results));
            }
        }
    }

    fn resolve_bulk(
        &self,
        results: Vec<(EntityId, Result<ModelProposal, RiskError>)>,
    ) -> Vec<EntityAssessment> {
        let assessments = cyberguard_domain::resolve_bulk(
            results,
            &self.registry,
            self.model.name(),
            Utc::now(),
        );
        let failed = assessments.iter().filter(|a| a.failure().is_some()).count();
        self.metrics.record_bulk(assessments.len());
        info!(
            "bulk assessment scored {} entities ({} failed)",
            assessments.len() - failed,
            failed
        );
        assessments
    }

    fn load(&mut self, seed: Vec<Entity>) -> Result<usize, AppError> {
        match self.registry.load(seed) {
            Ok(count) => {
                self.metrics.record_load();
                info!("registry loaded with {} entities", count);
                Ok(count)
            }
            Err(err) => {
                warn!("registry load rejected: {}", err);
                Err(err.into())
            }
        }
    }

    fn start_analysis(&mut self, entity_id: EntityId) -> Result<AnalysisRequest, AppError> {
        let outcome = self
            .session
            .start(entity_id, &self.registry, Utc::now())?;

        if let Some(cancelled) = &outcome.cancelled {
            self.clear_deadline();
            self.metrics.record_failed(cyberguard_domain::ErrorKind::Cancelled);
            info!(
                "analysis {} for entity {} cancelled by selection of entity {}",
                cancelled.id, cancelled.entity_id, entity_id
            );
            self.hub.publish(cancelled);
        }

        self.metrics.record_started();
        match outcome.ticket {
            Some(ticket) => {
                info!("analysis {} started for entity {}", ticket.request_id, entity_id);
                self.dispatch(ticket);
            }
            None => {
                if let Some(failure) = outcome.request.failure() {
                    self.metrics.record_failed(failure.kind);
                    warn!("analysis {} failed on entry: {}", outcome.request.id, failure.message);
                }
            }
        }
        self.hub.publish(&outcome.request);
        Ok(outcome.request)
    }

    fn dispatch(&mut self, ticket: AnalysisTicket) {
        let Some(tx) = self.loopback.upgrade() else {
            return;
        };
        let request_id = ticket.request_id;

        let model = self.model.clone();
        let model_tx = tx.clone();
        tokio::spawn(async move {
            let result = model.analyze(&ticket.entity).await;
            let _ = model_tx
                .send(Command::ModelResolved { request_id, result })
                .await;
        });

        let timeout = self.timeout;
        let deadline = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx.send(Command::Deadline { request_id }).await;
        });
        self.deadline = Some(deadline);
    }

    fn resolve(&mut self, request_id: RequestId, result: anyhow::Result<ModelProposal>) {
        let model = self.model.name().to_string();
        let resolution = self.session.complete(
            request_id,
            result,
            &model,
            &mut self.registry,
            Utc::now(),
        );
        match resolution {
            Resolution::Applied(request) => {
                self.clear_deadline();
                match (request.analysis(), request.failure()) {
                    (Some(analysis), _) => {
                        self.metrics.record_completed();
                        info!(
                            "analysis {} completed for entity {}: current={} predicted={} trend={:?}",
                            request.id,
                            request.entity_id,
                            analysis.current_score,
                            analysis.predicted_score,
                            analysis.trend
                        );
                    }
                    (None, Some(failure)) => {
                        self.metrics.record_failed(failure.kind);
                        warn!("analysis {} failed: {}", request.id, failure.message);
                    }
                    (None, None) => {}
                }
                self.hub.publish(&request);
            }
            Resolution::Discarded { request_id, reason } => {
                self.metrics.record_discarded();
                debug!(
                    "discarded model result for request {} ({})",
                    request_id,
                    reason.as_str()
                );
            }
        }
    }

    fn expire(&mut self, request_id: RequestId) {
        let timeout_ms = timeout_millis(self.timeout);
        if let Some(request) = self.session.expire(request_id, timeout_ms, Utc::now()) {
            self.deadline = None;
            self.metrics.record_failed(cyberguard_domain::ErrorKind::Timeout);
            warn!(
                "analysis {} for entity {} timed out after {}ms",
                request.id, request.entity_id, timeout_ms
            );
            self.hub.publish(&request);
        }
    }

    fn clear_deadline(&mut self) {
        if let Some(handle) = self.deadline.take() {
            handle.abort();
        }
    }
}

fn timeout_millis(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use cyberguard_domain::{
        AnalysisState, ErrorKind, ProposedFactor, RiskError, RiskScore, ScorePolicy, Trend,
    };

    struct ScriptedModel {
        delays: HashMap<u64, Duration>,
        failing: Option<u64>,
        predicted: i64,
        impact: i64,
    }

    impl ScriptedModel {
        fn new(predicted: i64) -> Self {
            Self {
                delays: HashMap::new(),
                failing: None,
                predicted,
                impact: 85,
            }
        }

        fn impact(mut self, impact: i64) -> Self {
            self.impact = impact;
            self
        }

        fn delay(mut self, id: u64, millis: u64) -> Self {
            self.delays.insert(id, Duration::from_millis(millis));
            self
        }

        fn failing(mut self, id: u64) -> Self {
            self.failing = Some(id);
            self
        }
    }

    #[async_trait]
    impl ScoringModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn analyze(&self, entity: &Entity) -> anyhow::Result<ModelProposal> {
            let delay = self
                .delays
                .get(&entity.id.0)
                .copied()
                .unwrap_or(Duration::from_millis(100));
            tokio::time::sleep(delay).await;
            if self.failing == Some(entity.id.0) {
                anyhow::bail!("scoring backend unavailable");
            }
            Ok(ModelProposal {
                current_score: Some(7),
                predicted_score: self.predicted,
                factors: vec![ProposedFactor {
                    factor: "Open Ports".to_string(),
                    impact: self.impact,
                    recommendation: "Close unnecessary ports 22, 445".to_string(),
                }],
                trend: Some(Trend::Increasing),
                recommendations: vec!["Update firewall rules to restrict access".to_string()],
            })
        }
    }

    fn dashboard_seed() -> Vec<Entity> {
        [
            (1u64, "Database Server", "192.168.1.100", 42),
            (2, "Web Server", "192.168.1.200", 75),
            (3, "Email Server", "192.168.1.150", 28),
            (4, "File Server", "192.168.1.120", 58),
            (5, "Domain Controller", "192.168.1.10", 85),
        ]
        .into_iter()
        .map(|(id, name, ip, score)| {
            Entity::new(id, name, ip, RiskScore::new(score).expect("score"))
        })
        .collect()
    }

    async fn spawn_with(model: ScriptedModel, timeout_ms: u64) -> (DashboardHandle, Arc<Metrics>) {
        let config = RuntimeConfig {
            analysis_timeout_ms: timeout_ms,
            score_policy: ScorePolicy::Retain,
            history_limit: 8,
            ..RuntimeConfig::default()
        };
        let metrics = Arc::new(Metrics::default());
        let handle = DashboardHandle::spawn(
            &config,
            Arc::new(model),
            metrics.clone(),
            Arc::new(AnalysisStreamHub::default()),
        );
        handle.load_entities(dashboard_seed()).await.expect("load");
        (handle, metrics)
    }

    fn kind_of(request: &AnalysisRequest) -> Option<ErrorKind> {
        request.failure().map(|failure| failure.kind)
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_analysis_reports_registry_score() {
        let (dashboard, metrics) = spawn_with(ScriptedModel::new(90), 3_000).await;

        let stats = dashboard.stats().await.expect("stats");
        assert_eq!(stats.total, 5);
        assert_eq!(stats.average_risk, 58);
        assert_eq!(stats.critical, 1);

        let started = dashboard.start_analysis(EntityId(5)).await.expect("start");
        assert!(started.is_running());
        assert!(dashboard.current_analysis().await.expect("current").expect("some").is_running());

        tokio::time::sleep(Duration::from_secs(1)).await;
        let current = dashboard.current_analysis().await.expect("current").expect("some");
        let analysis = current.analysis().expect("completed");
        assert_eq!(analysis.current_score.value(), 85);
        assert_eq!(analysis.predicted_score.value(), 90);
        assert_eq!(analysis.trend, Trend::Increasing);
        assert_eq!(analysis.model, "scripted");
        assert_eq!(metrics.snapshot().analyses_completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reselection_cancels_and_ignores_late_result() {
        let model = ScriptedModel::new(99).delay(1, 800).delay(2, 200);
        let (dashboard, metrics) = spawn_with(model, 3_000).await;

        let a = dashboard.start_analysis(EntityId(1)).await.expect("start a");
        let b = dashboard.start_analysis(EntityId(2)).await.expect("start b");
        assert!(b.is_running());

        let history = dashboard.analysis_history(10).await.expect("history");
        assert_eq!(history[0].id, a.id);
        assert_eq!(kind_of(&history[0]), Some(ErrorKind::Cancelled));

        tokio::time::sleep(Duration::from_secs(2)).await;
        let current = dashboard.current_analysis().await.expect("current").expect("some");
        assert_eq!(current.id, b.id);
        assert_eq!(current.analysis().expect("completed").current_score.value(), 75);
        assert_eq!(
            dashboard.get_entity(EntityId(1)).await.expect("get").risk_score.value(),
            42
        );

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cancellations, 1);
        assert_eq!(snapshot.analyses_completed, 1);
        assert_eq!(snapshot.discarded_completions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_applied_once() {
        let model = ScriptedModel::new(20).delay(4, 5_000);
        let (dashboard, metrics) = spawn_with(model, 1_000).await;

        dashboard.start_analysis(EntityId(4)).await.expect("start");
        tokio::time::sleep(Duration::from_secs(2)).await;
        let current = dashboard.current_analysis().await.expect("current").expect("some");
        assert_eq!(kind_of(&current), Some(ErrorKind::Timeout));
        assert!(current.failure().expect("failure").user_visible);

        tokio::time::sleep(Duration::from_secs(10)).await;
        let later = dashboard.current_analysis().await.expect("current").expect("some");
        assert_eq!(later, current);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.analyses_completed, 0);
        assert_eq!(snapshot.discarded_completions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn same_entity_restart_is_rejected_while_running() {
        let (dashboard, _) = spawn_with(ScriptedModel::new(50).delay(3, 500), 3_000).await;

        dashboard.start_analysis(EntityId(3)).await.expect("start");
        let err = dashboard
            .start_analysis(EntityId(3))
            .await
            .expect_err("in progress");
        assert!(matches!(
            err,
            AppError::Risk(RiskError::AnalysisAlreadyInProgress(EntityId(3)))
        ));

        tokio::time::sleep(Duration::from_secs(1)).await;
        let retry = dashboard.start_analysis(EntityId(3)).await.expect("retry after completion");
        assert!(retry.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn model_error_surfaces_as_failed_state() {
        let (dashboard, metrics) = spawn_with(ScriptedModel::new(50).failing(2), 3_000).await;

        dashboard.start_analysis(EntityId(2)).await.expect("start");
        tokio::time::sleep(Duration::from_secs(1)).await;
        let current = dashboard.current_analysis().await.expect("current").expect("some");
        assert_eq!(kind_of(&current), Some(ErrorKind::ModelError));
        assert!(current
            .failure()
            .expect("failure")
            .message
            .contains("scoring backend unavailable"));
        assert_eq!(metrics.snapshot().model_errors, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn registry_errors_are_returned_synchronously() {
        let (dashboard, _) = spawn_with(ScriptedModel::new(50), 3_000).await;

        let mut seed = dashboard_seed();
        seed.push(seed[0].clone());
        let err = dashboard.load_entities(seed).await.expect_err("duplicate");
        assert!(matches!(err, AppError::Risk(RiskError::DuplicateEntity(EntityId(1)))));
        assert_eq!(dashboard.list_entities().await.expect("list").len(), 5);

        let err = dashboard.update_score(EntityId(2), 250).await.expect_err("invalid");
        assert!(matches!(err, AppError::Risk(RiskError::InvalidScore(250))));
        let err = dashboard.get_entity(EntityId(99)).await.expect_err("missing");
        assert!(matches!(err, AppError::Risk(RiskError::EntityNotFound(EntityId(99)))));
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_entity_fails_without_model_call() {
        let (dashboard, metrics) = spawn_with(ScriptedModel::new(50), 3_000).await;

        let request = dashboard.start_analysis(EntityId(77)).await.expect("start");
        assert!(matches!(request.state, AnalysisState::Failed { .. }));
        assert_eq!(kind_of(&request), Some(ErrorKind::EntityNotFound));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(metrics.snapshot().discarded_completions, 0);
        assert_eq!(metrics.snapshot().timeouts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transitions_are_published_to_subscribers() {
        let config = RuntimeConfig::default();
        let hub = Arc::new(AnalysisStreamHub::default());
        let mut rx = hub.subscribe();
        let dashboard = DashboardHandle::spawn(
            &config,
            Arc::new(ScriptedModel::new(60)),
            Arc::new(Metrics::default()),
            hub,
        );
        dashboard.load_entities(dashboard_seed()).await.expect("load");

        dashboard.start_analysis(EntityId(1)).await.expect("start");
        let running = rx.recv().await.expect("running event");
        assert!(running.request.is_running());
        let completed = rx.recv().await.expect("completed event");
        assert!(completed.request.analysis().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn bulk_assessment_scores_every_entity_beside_the_session() {
        let model = ScriptedModel::new(140).impact(-5).failing(3).delay(4, 5_000);
        let (dashboard, metrics) = spawn_with(model, 3_000).await;

        let (assessments, updated) = tokio::join!(dashboard.bulk_assess(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            dashboard.update_score(EntityId(2), 91).await
        });
        let assessments = assessments.expect("bulk");
        assert_eq!(updated.expect("update").risk_score.value(), 91);

        let ids: Vec<u64> = assessments.iter().map(|a| a.entity_id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let db = assessments[0].analysis().expect("completed");
        assert_eq!(db.current_score.value(), 42);
        assert_eq!(db.predicted_score.value(), 100);
        assert_eq!(db.factors[0].impact.value(), 0);
        assert_eq!(db.model, "scripted");

        let web = assessments[1].analysis().expect("completed");
        assert_eq!(web.current_score.value(), 91);

        let failure = assessments[2].failure().expect("model error");
        assert_eq!(failure.kind, ErrorKind::ModelError);
        assert!(failure.message.contains("scoring backend unavailable"));
        assert_eq!(
            assessments[3].failure().map(|f| f.kind),
            Some(ErrorKind::Timeout)
        );
        assert!(assessments[4].analysis().is_some());

        assert!(dashboard.current_analysis().await.expect("current").is_none());
        assert!(dashboard.analysis_history(10).await.expect("history").is_empty());
        let db_entity = dashboard.get_entity(EntityId(1)).await.expect("entity");
        assert_eq!(db_entity.risk_score.value(), 42);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.bulk_assessments, 1);
        assert_eq!(snapshot.bulk_entities, 5);
        assert_eq!(snapshot.analyses_started, 0);
    }
}
