use std::time::Duration;

use async_trait::async_trait;

use cyberguard_domain::{
    Entity, EntityTelemetry, ModelProposal, ProposedFactor, RiskScore, ScoringModel,
};

pub const ANOMALY_RECOMMENDATION: &str = "Investigate anomalous behavior patterns";
const ANOMALY_THRESHOLD: f64 = 0.5;

/// Deterministic scorer driven by entity telemetry.
pub struct RuleBasedScoringModel {
    latency: Duration,
}

impl RuleBasedScoringModel {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for RuleBasedScoringModel {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[async_trait]
impl ScoringModel for RuleBasedScoringModel {
    fn name(&self) -> &str {
        "rules"
    }

    async fn analyze(&self, entity: &Entity) -> anyhow::Result<ModelProposal> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(score_entity(entity))
    }
}

pub fn score_entity(entity: &Entity) -> ModelProposal {
    let telemetry = entity.telemetry.clone().unwrap_or_default();
    let current = i64::from(entity.risk_score.value());
    let factors = identify_factors(&telemetry);

    let predicted = if factors.is_empty() {
        current
    } else {
        let mean = factors.iter().map(|(_, impact)| impact).sum::<f64>() / factors.len() as f64;
        current + ((mean - current as f64) / 4.0).round() as i64
    };
    let predicted = RiskScore::clamped(predicted);

    let mut recommendations = tier_recommendations(predicted);
    if telemetry.anomaly_score >= ANOMALY_THRESHOLD {
        recommendations.push(ANOMALY_RECOMMENDATION.to_string());
    }

    ModelProposal {
        current_score: Some(current),
        predicted_score: i64::from(predicted.value()),
        factors: factors.into_iter().map(|(factor, _)| factor).collect(),
        trend: None,
        recommendations,
    }
}

/// Factors sorted by impact, highest first. The raw impact is kept for the
/// mean so rounding does not skew the prediction.
fn identify_factors(telemetry: &EntityTelemetry) -> Vec<(ProposedFactor, f64)> {
    let mut factors = Vec::new();
    let mut push = |factor: &str, impact: f64, recommendation: &str| {
        factors.push((
            ProposedFactor {
                factor: factor.to_string(),
                impact: impact.round() as i64,
                recommendation: recommendation.to_string(),
            },
            impact,
        ));
    };

    if telemetry.open_ports > 20 {
        push(
            "High number of open ports",
            (f64::from(telemetry.open_ports) / 50.0 * 100.0).min(100.0),
            "Close unnecessary ports and implement port scanning protection",
        );
    }
    if telemetry.failed_logins > 50 {
        push(
            "Excessive failed login attempts",
            f64::from(telemetry.failed_logins).min(100.0),
            "Implement account lockout policies and monitor for brute force attacks",
        );
    }
    if telemetry.patch_level < 0.8 {
        push(
            "Outdated software/patches",
            (1.0 - telemetry.patch_level.max(0.0)) * 100.0,
            "Update system patches and implement automated patching",
        );
    }
    if !telemetry.antivirus_enabled {
        push(
            "Antivirus disabled",
            80.0,
            "Enable and update antivirus protection",
        );
    }
    if telemetry.encryption_level < 0.7 {
        push(
            "Weak encryption",
            (1.0 - telemetry.encryption_level.max(0.0)) * 80.0,
            "Implement stronger encryption protocols",
        );
    }
    if telemetry.anomaly_score >= ANOMALY_THRESHOLD {
        push(
            "Anomalous behavior detected",
            telemetry.anomaly_score.min(1.0) * 100.0,
            ANOMALY_RECOMMENDATION,
        );
    }

    factors.sort_by(|a, b| b.1.total_cmp(&a.1));
    factors
}

pub fn tier_recommendations(predicted: RiskScore) -> Vec<String> {
    let lines: [&str; 4] = match predicted.value() {
        81.. => [
            "Immediate security audit required",
            "Isolate system until vulnerabilities are patched",
            "Enable advanced threat detection",
            "Implement emergency response procedures",
        ],
        61..=80 => [
            "Schedule security assessment within 24 hours",
            "Review and update security policies",
            "Enable additional monitoring",
            "Conduct penetration testing",
        ],
        41..=60 => [
            "Regular security monitoring recommended",
            "Update security configurations",
            "Review access controls",
            "Schedule routine maintenance",
        ],
        _ => [
            "Maintain current security posture",
            "Continue regular updates",
            "Monitor for changes",
            "Document security baseline",
        ],
    };
    lines.iter().map(|line| line.to_string()).collect()
}
