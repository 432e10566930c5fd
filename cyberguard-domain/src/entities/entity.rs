// Entity
// A monitored network asset and its last-known risk score

use serde::{Deserialize, Serialize};

use crate::value_objects::{EntityId, RiskLevel, RiskScore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub address: String,
    pub risk_score: RiskScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telemetry: Option<EntityTelemetry>,
}

impl Entity {
    pub fn new(
        id: impl Into<EntityId>,
        name: impl Into<String>,
        address: impl Into<String>,
        risk_score: RiskScore,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            risk_score,
            telemetry: None,
        }
    }

    pub fn with_telemetry(mut self, telemetry: EntityTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }
}

/// Observed posture signals used by scoring models. Every field is optional in
/// seed files; missing values read as the healthy default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTelemetry {
    pub open_ports: u32,
    pub failed_logins: u32,
    pub patch_level: f64,
    pub antivirus_enabled: bool,
    pub encryption_level: f64,
    pub anomaly_score: f64,
}

impl Default for EntityTelemetry {
    fn default() -> Self {
        Self {
            open_ports: 0,
            failed_logins: 0,
            patch_level: 1.0,
            antivirus_enabled: true,
            encryption_level: 1.0,
            anomaly_score: 0.0,
        }
    }
}
