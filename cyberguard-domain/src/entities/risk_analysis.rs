// Risk analysis entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{EntityId, RiskLevel, RiskScore, Trend};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub factor: String,
    pub impact: RiskScore,
    pub recommendation: String,
}

/// Accepted analysis result. Every score is within [0, 100] and
/// `current_score` always comes from the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    pub entity_id: EntityId,
    pub current_score: RiskScore,
    pub predicted_score: RiskScore,
    pub risk_level: RiskLevel,
    pub factors: Vec<RiskFactor>,
    pub trend: Trend,
    pub recommendations: Vec<String>,
    pub model: String,
    pub analyzed_at: DateTime<Utc>,
}

/// What a scoring model hands back before normalization. Scores are raw
/// integers and may fall outside [0, 100].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelProposal {
    #[serde(default)]
    pub current_score: Option<i64>,
    pub predicted_score: i64,
    #[serde(default)]
    pub factors: Vec<ProposedFactor>,
    #[serde(default)]
    pub trend: Option<Trend>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedFactor {
    pub factor: String,
    pub impact: i64,
    pub recommendation: String,
}

impl ModelProposal {
    /// Normalize a proposal against the registry's live score.
    pub fn into_analysis(
        self,
        entity_id: EntityId,
        live_score: RiskScore,
        model: &str,
        analyzed_at: DateTime<Utc>,
    ) -> RiskAnalysis {
        let predicted_score = RiskScore::clamped(self.predicted_score);
        let trend = self
            .trend
            .unwrap_or_else(|| Trend::between(live_score, predicted_score));
        let factors = self
            .factors
            .into_iter()
            .map(|factor| RiskFactor {
                factor: factor.factor,
                impact: RiskScore::clamped(factor.impact),
                recommendation: factor.recommendation,
            })
            .collect();
        RiskAnalysis {
            entity_id,
            current_score: live_score,
            predicted_score,
            risk_level: RiskLevel::from_score(live_score),
            factors,
            trend,
            recommendations: self.recommendations,
            model: model.to_string(),
            analyzed_at,
        }
    }
}
