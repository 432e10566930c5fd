// Trend value object

use serde::{Deserialize, Serialize};

use super::RiskScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    /// Score movement (in points) below which the trend reads as stable.
    pub const DEADBAND: i64 = 2;

    pub fn between(current: RiskScore, predicted: RiskScore) -> Self {
        let delta = i64::from(predicted.value()) - i64::from(current.value());
        if delta > Self::DEADBAND {
            Trend::Increasing
        } else if delta < -Self::DEADBAND {
            Trend::Decreasing
        } else {
            Trend::Stable
        }
    }
}
