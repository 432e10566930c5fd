// Risk level value object

use serde::{Deserialize, Serialize};

use super::RiskScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const CRITICAL_THRESHOLD: u8 = 80;
    pub const HIGH_THRESHOLD: u8 = 60;
    pub const MEDIUM_THRESHOLD: u8 = 40;

    pub fn from_score(score: RiskScore) -> Self {
        match score.value() {
            s if s >= Self::CRITICAL_THRESHOLD => RiskLevel::Critical,
            s if s >= Self::HIGH_THRESHOLD => RiskLevel::High,
            s if s >= Self::MEDIUM_THRESHOLD => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}
