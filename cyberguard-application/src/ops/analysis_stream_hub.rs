use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use cyberguard_domain::AnalysisRequest;

const CHANNEL_BUFFER: usize = 64;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisEvent {
    pub request: AnalysisRequest,
    pub emitted_at: DateTime<Utc>,
}

/// Fan-out of analysis transitions to presentation subscribers. Publishing
/// never blocks; lagging receivers lose the oldest events.
pub struct AnalysisStreamHub {
    tx: broadcast::Sender<AnalysisEvent>,
}

impl Default for AnalysisStreamHub {
    fn default() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_BUFFER);
        Self { tx }
    }
}

impl AnalysisStreamHub {
    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.tx.subscribe()
    }

    pub fn publish(&self, request: &AnalysisRequest) {
        let _ = self.tx.send(AnalysisEvent {
            request: request.clone(),
            emitted_at: Utc::now(),
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
