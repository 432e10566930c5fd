use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use cyberguard_domain::{Entity, ModelProposal, ProposedFactor, RiskScore, ScoringModel};

use super::ANOMALY_RECOMMENDATION;

const ASSESS_PATH: &str = "/api/assess-entity";

/// Delegates scoring to an HTTP risk assessor.
pub struct RemoteScoringModel {
    client: Client,
    endpoint: String,
}

impl RemoteScoringModel {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build scoring client")?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), ASSESS_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Serialize)]
pub struct AssessRequest<'a> {
    pub entity_id: u64,
    pub name: &'a str,
    pub ip: &'a str,
    pub risk_score: u8,
    pub open_ports: u32,
    pub failed_logins: u32,
    pub patch_level: f64,
    pub antivirus_status: u8,
    pub encryption_level: f64,
    pub data_transfer_anomaly: f64,
}

impl<'a> AssessRequest<'a> {
    pub fn from_entity(entity: &'a Entity) -> Self {
        let telemetry = entity.telemetry.clone().unwrap_or_default();
        Self {
            entity_id: entity.id.0,
            name: &entity.name,
            ip: &entity.address,
            risk_score: entity.risk_score.value(),
            open_ports: telemetry.open_ports,
            failed_logins: telemetry.failed_logins,
            patch_level: telemetry.patch_level,
            antivirus_status: u8::from(telemetry.antivirus_enabled),
            encryption_level: telemetry.encryption_level,
            data_transfer_anomaly: telemetry.anomaly_score,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssessResponse {
    pub risk_assessment: RiskAssessment,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    #[serde(default)]
    pub is_anomaly: bool,
    #[serde(default)]
    pub risk_factors: Vec<AssessedFactor>,
}

#[derive(Debug, Deserialize)]
pub struct AssessedFactor {
    pub factor: String,
    pub impact: f64,
    #[serde(default)]
    pub recommendation: String,
}

impl AssessResponse {
    pub fn into_proposal(self, current: i64) -> Result<ModelProposal> {
        let assessment = self.risk_assessment;
        if !assessment.risk_score.is_finite() {
            return Err(anyhow!("assessor returned a non-finite risk score"));
        }
        let mut factors = assessment.risk_factors;
        factors.sort_by(|a, b| b.impact.total_cmp(&a.impact));

        let mut recommendations = self.recommendations;
        if assessment.is_anomaly && !recommendations.iter().any(|r| r == ANOMALY_RECOMMENDATION) {
            recommendations.push(ANOMALY_RECOMMENDATION.to_string());
        }

        Ok(ModelProposal {
            current_score: Some(current),
            predicted_score: score_of(assessment.risk_score),
            factors: factors
                .into_iter()
                .map(|factor| ProposedFactor {
                    factor: factor.factor,
                    impact: score_of(factor.impact),
                    recommendation: factor.recommendation,
                })
                .collect(),
            trend: None,
            recommendations,
        })
    }
}

fn score_of(value: f64) -> i64 {
    i64::from(RiskScore::from_f64(value).value())
}

#[async_trait]
impl ScoringModel for RemoteScoringModel {
    fn name(&self) -> &str {
        "remote"
    }

    async fn analyze(&self, entity: &Entity) -> Result<ModelProposal> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&AssessRequest::from_entity(entity))
            .send()
            .await?;
        if !response.status().is_success() {
            anyhow::bail!("risk assessor responded {}", response.status());
        }
        let body: AssessResponse = response
            .json()
            .await
            .context("invalid risk assessor response")?;
        body.into_proposal(i64::from(entity.risk_score.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyberguard_domain::{EntityTelemetry, RiskScore};

    #[test]
    fn request_flattens_telemetry() {
        let entity = Entity::new(2u64, "Web Server", "192.168.1.200", RiskScore::new(75).expect("score"))
            .with_telemetry(EntityTelemetry {
                open_ports: 35,
                antivirus_enabled: false,
                ..EntityTelemetry::default()
            });
        let json = serde_json::to_value(AssessRequest::from_entity(&entity)).expect("json");
        assert_eq!(json["entity_id"], 2);
        assert_eq!(json["ip"], "192.168.1.200");
        assert_eq!(json["risk_score"], 75);
        assert_eq!(json["open_ports"], 35);
        assert_eq!(json["antivirus_status"], 0);
        assert_eq!(json["patch_level"], 1.0);
    }

    #[test]
    fn response_maps_to_sorted_proposal() {
        let body = r#"{
            "entity_id": 2,
            "risk_assessment": {
                "risk_score": 87.46,
                "risk_category": "Critical",
                "is_anomaly": true,
                "anomaly_score": -0.12,
                "confidence": 91.0,
                "risk_factors": [
                    {"factor": "Weak encryption", "impact": 40.0, "recommendation": "Implement stronger encryption protocols"},
                    {"factor": "Antivirus disabled", "impact": 80, "recommendation": "Enable and update antivirus protection"}
                ]
            },
            "recommendations": ["Immediate security audit required"],
            "timestamp": "2024-01-01 00:00:00"
        }"#;
        let response: AssessResponse = serde_json::from_str(body).expect("decode");
        assert!(response.risk_assessment.is_anomaly);
        let proposal = response.into_proposal(75).expect("proposal");
        assert_eq!(proposal.predicted_score, 87);
        assert_eq!(proposal.factors[0].factor, "Antivirus disabled");
        assert_eq!(proposal.factors[1].impact, 40);
        assert_eq!(
            proposal.recommendations,
            vec!["Immediate security audit required", ANOMALY_RECOMMENDATION]
        );
        assert!(proposal.trend.is_none());
    }

    #[test]
    fn assessor_scores_are_normalized() {
        let body = r#"{
            "risk_assessment": {
                "risk_score": 131.2,
                "is_anomaly": false,
                "risk_factors": [
                    {"factor": "Weak encryption", "impact": -12.0},
                    {"factor": "Outdated patches", "impact": 250.4}
                ]
            },
            "recommendations": [
                "Immediate security audit required",
                "Investigate anomalous behavior patterns"
            ]
        }"#;
        let response: AssessResponse = serde_json::from_str(body).expect("decode");
        let proposal = response.into_proposal(90).expect("proposal");
        assert_eq!(proposal.predicted_score, 100);
        assert_eq!(proposal.factors[0].impact, 100);
        assert_eq!(proposal.factors[1].impact, 0);
        assert_eq!(proposal.recommendations.len(), 2);
    }

    #[test]
    fn anomaly_recommendation_is_not_duplicated() {
        let body = r#"{
            "risk_assessment": {"risk_score": 64.0, "is_anomaly": true},
            "recommendations": ["Investigate anomalous behavior patterns"]
        }"#;
        let response: AssessResponse = serde_json::from_str(body).expect("decode");
        let proposal = response.into_proposal(50).expect("proposal");
        assert_eq!(proposal.recommendations, vec![ANOMALY_RECOMMENDATION]);
    }

    #[test]
    fn endpoint_joins_base_url() {
        let model = RemoteScoringModel::new("http://127.0.0.1:5000/", Duration::from_secs(3))
            .expect("client");
        assert_eq!(model.endpoint(), "http://127.0.0.1:5000/api/assess-entity");
    }

    #[tokio::test]
    async fn unreachable_assessor_is_a_model_error() {
        let model = RemoteScoringModel::new("http://127.0.0.1:9", Duration::from_millis(500))
            .expect("client");
        let entity = Entity::new(1u64, "Database Server", "192.168.1.100", RiskScore::new(42).expect("score"));
        assert!(model.analyze(&entity).await.is_err());
    }
}
