// Risk score value object
//
// Always within [0, 100]. Construction either validates (`new`) or
// normalizes (`clamped`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RiskError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct RiskScore(u8);

impl RiskScore {
    pub const MIN: RiskScore = RiskScore(0);
    pub const MAX: RiskScore = RiskScore(100);

    pub fn new(value: i64) -> Result<Self, RiskError> {
        if (i64::from(Self::MIN.0)..=i64::from(Self::MAX.0)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(RiskError::InvalidScore(value))
        }
    }

    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(i64::from(Self::MIN.0), i64::from(Self::MAX.0)) as u8)
    }

    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }
        Self::clamped(value.round() as i64)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_critical(self) -> bool {
        self.0 >= super::RiskLevel::CRITICAL_THRESHOLD
    }
}

impl TryFrom<i64> for RiskScore {
    type Error = RiskError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RiskScore> for u8 {
    fn from(score: RiskScore) -> Self {
        score.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_out_of_range() {
        assert!(RiskScore::new(0).is_ok());
        assert!(RiskScore::new(100).is_ok());
        assert!(matches!(RiskScore::new(101), Err(RiskError::InvalidScore(101))));
        assert!(matches!(RiskScore::new(-1), Err(RiskError::InvalidScore(-1))));
    }

    #[test]
    fn clamped_normalizes() {
        assert_eq!(RiskScore::clamped(-20).value(), 0);
        assert_eq!(RiskScore::clamped(130).value(), 100);
        assert_eq!(RiskScore::clamped(57).value(), 57);
        assert_eq!(RiskScore::from_f64(57.5).value(), 58);
        assert_eq!(RiskScore::from_f64(f64::NAN).value(), 0);
        assert_eq!(RiskScore::from_f64(1e12).value(), 100);
    }

    #[test]
    fn deserialization_validates_range() {
        let ok: RiskScore = serde_json::from_str("85").expect("in range");
        assert_eq!(ok.value(), 85);
        assert!(serde_json::from_str::<RiskScore>("101").is_err());
        assert!(serde_json::from_str::<RiskScore>("-3").is_err());
    }
}
