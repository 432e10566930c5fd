use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use cyberguard_domain::{RuntimeConfig, ScorePolicy, ScoringModelKind};

pub const CONFIG_PATH_ENV: &str = "CYBERGUARD_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./cyberguard.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub seed_path: String,
    pub analysis_timeout_ms: u64,
    pub scoring_model: ScoringModelKind,
    pub remote_model_url: Option<String>,
    pub model_latency_ms: u64,
    pub score_policy: ScorePolicy,
    pub history_limit: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub log_format: LogFormat,
    pub log_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            bind_addr: runtime.bind_addr,
            seed_path: "./entities.yaml".to_string(),
            analysis_timeout_ms: runtime.analysis_timeout_ms,
            scoring_model: ScoringModelKind::Rules,
            remote_model_url: None,
            model_latency_ms: 1_500,
            score_policy: runtime.score_policy,
            history_limit: runtime.history_limit,
            max_body_bytes: runtime.max_body_bytes,
            request_timeout_seconds: runtime.request_timeout_seconds,
            log_format: LogFormat::Text,
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads from `CYBERGUARD_CONFIG`, falling back to `./cyberguard.toml`.
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path)).await
    }

    pub async fn load_from(file_path: &Path) -> Result<Self> {
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            Self::parse(&content)?
        } else {
            warn!("{} not found, using defaults", file_path.display());
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| anyhow!("invalid config: {}", err))
    }

    pub fn normalize(&mut self) {
        self.bind_addr = self.bind_addr.trim().to_string();
        if let Some(url) = &self.remote_model_url {
            let trimmed = url.trim().trim_end_matches('/');
            self.remote_model_url = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
        if let Some(dir) = &self.log_dir {
            if dir.trim().is_empty() {
                self.log_dir = None;
            }
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.seed_path = resolve_path(base, &self.seed_path);
        if let Some(dir) = &self.log_dir {
            self.log_dir = Some(resolve_path(base, dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        if self.seed_path.trim().is_empty() {
            return Err(anyhow!("seed_path must not be empty"));
        }
        if self.analysis_timeout_ms == 0 {
            return Err(anyhow!("analysis_timeout_ms must be greater than 0"));
        }
        if self.scoring_model == ScoringModelKind::Remote && self.remote_model_url.is_none() {
            return Err(anyhow!("remote_model_url is required when scoring_model = \"remote\""));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            analysis_timeout_ms: self.analysis_timeout_ms,
            score_policy: self.score_policy,
            history_limit: self.history_limit,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("CYBERGUARD_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("CYBERGUARD_SEED_PATH") {
            self.seed_path = value;
        }
        if let Ok(value) = env::var("CYBERGUARD_ANALYSIS_TIMEOUT_MS") {
            self.analysis_timeout_ms = value.parse().unwrap_or(self.analysis_timeout_ms);
        }
        if let Ok(value) = env::var("CYBERGUARD_SCORING_MODEL") {
            self.scoring_model = parse_model_kind(&value).unwrap_or(self.scoring_model);
        }
        if let Ok(value) = env::var("CYBERGUARD_REMOTE_MODEL_URL") {
            self.remote_model_url = Some(value);
        }
        if let Ok(value) = env::var("CYBERGUARD_MODEL_LATENCY_MS") {
            self.model_latency_ms = value.parse().unwrap_or(self.model_latency_ms);
        }
        if let Ok(value) = env::var("CYBERGUARD_SCORE_POLICY") {
            self.score_policy = parse_score_policy(&value).unwrap_or(self.score_policy);
        }
        if let Ok(value) = env::var("CYBERGUARD_HISTORY_LIMIT") {
            self.history_limit = value.parse().unwrap_or(self.history_limit);
        }
        if let Ok(value) = env::var("CYBERGUARD_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("CYBERGUARD_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("CYBERGUARD_LOG_FORMAT") {
            self.log_format = parse_log_format(&value).unwrap_or(self.log_format);
        }
        if let Ok(value) = env::var("CYBERGUARD_LOG_DIR") {
            self.log_dir = Some(value);
        }
    }
}

fn resolve_path(base: &Path, value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return trimmed.to_string();
    }
    let path = Path::new(trimmed);
    if path.is_absolute() {
        trimmed.to_string()
    } else {
        base.join(path).to_string_lossy().to_string()
    }
}

fn parse_model_kind(value: &str) -> Option<ScoringModelKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "rules" => Some(ScoringModelKind::Rules),
        "remote" => Some(ScoringModelKind::Remote),
        _ => None,
    }
}

fn parse_score_policy(value: &str) -> Option<ScorePolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "retain" => Some(ScorePolicy::Retain),
        "apply_predicted" => Some(ScorePolicy::ApplyPredicted),
        _ => None,
    }
}

fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value.trim().to_ascii_lowercase().as_str() {
        "text" => Some(LogFormat::Text),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}
