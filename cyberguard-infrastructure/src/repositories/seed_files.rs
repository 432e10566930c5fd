use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use cyberguard_domain::{Entity, SeedSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFormat {
    Json,
    Yaml,
    Toml,
}

impl SeedFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(SeedFormat::Json),
            "yaml" | "yml" => Ok(SeedFormat::Yaml),
            "toml" => Ok(SeedFormat::Toml),
            other => Err(anyhow!(
                "unsupported seed file extension '{}' for {}",
                other,
                path.display()
            )),
        }
    }
}

/// Either a bare list or `entities = [...]`; TOML only allows the latter.
#[derive(Deserialize)]
#[serde(untagged)]
enum SeedDocument {
    List(Vec<Entity>),
    Wrapped { entities: Vec<Entity> },
}

impl SeedDocument {
    fn into_entities(self) -> Vec<Entity> {
        match self {
            SeedDocument::List(entities) | SeedDocument::Wrapped { entities } => entities,
        }
    }
}

pub fn parse_seed(content: &str, format: SeedFormat) -> Result<Vec<Entity>> {
    let document: SeedDocument = match format {
        SeedFormat::Json => serde_json::from_str(content)?,
        SeedFormat::Yaml => serde_yaml::from_str(content)?,
        SeedFormat::Toml => toml::from_str(content)?,
    };
    Ok(document.into_entities())
}

pub struct SeedFileRepository {
    path: PathBuf,
}

impl SeedFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SeedSource for SeedFileRepository {
    async fn load_seed(&self) -> Result<Vec<Entity>> {
        let format = SeedFormat::from_path(&self.path)?;
        if !self.path.exists() {
            warn!("seed file {} not found, starting with an empty registry", self.path.display());
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).await?;
        parse_seed(&content, format)
            .map_err(|err| anyhow!("failed to parse {}: {}", self.path.display(), err))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
