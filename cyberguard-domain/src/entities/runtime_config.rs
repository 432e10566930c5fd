// Runtime configuration handed to the application and interface layers

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolicy {
    /// Completed analyses leave the registry untouched.
    #[default]
    Retain,
    /// A completed analysis writes its predicted score back to the registry.
    ApplyPredicted,
}

impl ScorePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScorePolicy::Retain => "retain",
            ScorePolicy::ApplyPredicted => "apply_predicted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringModelKind {
    #[default]
    Rules,
    Remote,
}

impl ScoringModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringModelKind::Rules => "rules",
            ScoringModelKind::Remote => "remote",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub analysis_timeout_ms: u64,
    pub score_policy: ScorePolicy,
    pub history_limit: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl RuntimeConfig {
    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_millis(self.analysis_timeout_ms)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            analysis_timeout_ms: 3_000,
            score_policy: ScorePolicy::Retain,
            history_limit: 32,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}
