use serde::{Deserialize, Serialize};

use crate::entities::Entity;
use crate::value_objects::RiskLevel;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelBreakdown {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total: usize,
    pub average_risk: u8,
    pub critical: usize,
    pub by_level: LevelBreakdown,
}

pub fn entity_count(entities: &[Entity]) -> usize {
    entities.len()
}

/// Mean score rounded half-up; 0 for an empty slice.
pub fn average_risk(entities: &[Entity]) -> u8 {
    if entities.is_empty() {
        return 0;
    }
    let sum: u64 = entities
        .iter()
        .map(|e| u64::from(e.risk_score.value()))
        .sum();
    let n = entities.len() as u64;
    ((2 * sum + n) / (2 * n)) as u8
}

pub fn critical_count(entities: &[Entity]) -> usize {
    entities.iter().filter(|e| e.risk_score.is_critical()).count()
}

pub fn summarize(entities: &[Entity]) -> RegistryStats {
    let mut by_level = LevelBreakdown::default();
    for entity in entities {
        match entity.risk_level() {
            RiskLevel::Low => by_level.low += 1,
            RiskLevel::Medium => by_level.medium += 1,
            RiskLevel::High => by_level.high += 1,
            RiskLevel::Critical => by_level.critical += 1,
        }
    }
    RegistryStats {
        total: entity_count(entities),
        average_risk: average_risk(entities),
        critical: critical_count(entities),
        by_level,
    }
}
