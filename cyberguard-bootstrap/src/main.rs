use anyhow::Result;
use clap::Parser;
use tracing::info;

use cyberguard_infrastructure::{AppConfig, CONFIG_PATH_ENV};

#[derive(Parser, Debug)]
#[command(name = "cyberguard-backend")]
#[command(about = "CyberGuard risk dashboard backend", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// Seed file with the monitored entities (overrides `seed_path`)
    #[arg(short, long)]
    seed: Option<String>,

    /// Listen address (overrides `bind_addr`)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var(CONFIG_PATH_ENV, config);
    }
    if let Some(seed) = args.seed {
        std::env::set_var("CYBERGUARD_SEED_PATH", seed);
    }
    if let Some(bind) = args.bind {
        std::env::set_var("CYBERGUARD_BIND_ADDR", bind);
    }

    let config = AppConfig::load().await?;
    let _log_guard = cyberguard_bootstrap::logging::init(config.log_format, config.log_dir.as_deref())?;
    info!(
        "starting cyberguard-backend (model={}, policy={})",
        config.scoring_model.as_str(),
        config.score_policy.as_str()
    );

    cyberguard_bootstrap::run_standalone(config).await
}
