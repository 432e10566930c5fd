use std::sync::atomic::{AtomicU64, Ordering};

use cyberguard_domain::ErrorKind;

#[derive(Debug, Default)]
pub struct Metrics {
    registry_loads: AtomicU64,
    analyses_started: AtomicU64,
    analyses_completed: AtomicU64,
    analyses_failed: AtomicU64,
    cancellations: AtomicU64,
    timeouts: AtomicU64,
    model_errors: AtomicU64,
    discarded_completions: AtomicU64,
    bulk_assessments: AtomicU64,
    bulk_entities: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub registry_loads: u64,
    pub analyses_started: u64,
    pub analyses_completed: u64,
    pub analyses_failed: u64,
    pub cancellations: u64,
    pub timeouts: u64,
    pub model_errors: u64,
    pub discarded_completions: u64,
    pub bulk_assessments: u64,
    pub bulk_entities: u64,
}

impl Metrics {
    pub fn record_load(&self) {
        self.registry_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_started(&self) {
        self.analyses_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.analyses_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self, kind: ErrorKind) {
        self.analyses_failed.fetch_add(1, Ordering::Relaxed);
        match kind {
            ErrorKind::Cancelled => {
                self.cancellations.fetch_add(1, Ordering::Relaxed);
            }
            ErrorKind::Timeout => {
                self.timeouts.fetch_add(1, Ordering::Relaxed);
            }
            ErrorKind::ModelError => {
                self.model_errors.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
    }

    pub fn record_discarded(&self) {
        self.discarded_completions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bulk(&self, entities: usize) {
        self.bulk_assessments.fetch_add(1, Ordering::Relaxed);
        self.bulk_entities.fetch_add(entities as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            registry_loads: self.registry_loads.load(Ordering::Relaxed),
            analyses_started: self.analyses_started.load(Ordering::Relaxed),
            analyses_completed: self.analyses_completed.load(Ordering::Relaxed),
            analyses_failed: self.analyses_failed.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            model_errors: self.model_errors.load(Ordering::Relaxed),
            discarded_completions: self.discarded_completions.load(Ordering::Relaxed),
            bulk_assessments: self.bulk_assessments.load(Ordering::Relaxed),
            bulk_entities: self.bulk_entities.load(Ordering::Relaxed),
        }
    }

    pub fn render_prometheus(&self) -> String {
        let s = self.snapshot();

        format!(
            "# TYPE cyberguard_registry_loads_total counter\n\
cyberguard_registry_loads_total {}\n\
# TYPE cyberguard_analyses_started_total counter\n\
cyberguard_analyses_started_total {}\n\
# TYPE cyberguard_analyses_completed_total counter\n\
cyberguard_analyses_completed_total {}\n\
# TYPE cyberguard_analyses_failed_total counter\n\
cyberguard_analyses_failed_total {}\n\
# TYPE cyberguard_analysis_cancellations_total counter\n\
cyberguard_analysis_cancellations_total {}\n\
# TYPE cyberguard_analysis_timeouts_total counter\n\
cyberguard_analysis_timeouts_total {}\n\
# TYPE cyberguard_model_errors_total counter\n\
cyberguard_model_errors_total {}\n\
# TYPE cyberguard_discarded_completions_total counter\n\
cyberguard_discarded_completions_total {}\n\
# TYPE cyberguard_bulk_assessments_total counter\n\
cyberguard_bulk_assessments_total {}\n\
# TYPE cyberguard_bulk_entities_scored_total counter\n\
cyberguard_bulk_entities_scored_total {}\n",
            s.registry_loads,
            s.analyses_started,
            s.analyses_completed,
            s.analyses_failed,
            s.cancellations,
            s.timeouts,
            s.model_errors,
            s.discarded_completions,
            s.bulk_assessments,
            s.bulk_entities
        )
    }
}
