//! NWS hazard map generator.
//!
//! Downloads the current NWS watch/warning/advisory polygons and writes one
//! PNG map per configured hazard:
//! - Alerts are filtered by phenomenon/significance and by the target region
//! - Every map shares the same view and backdrop layers
//! - A failing hazard does not stop the others unless configured to

use std::path::PathBuf;

use alert_mapper::{run, AppConfig};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "alert-mapper")]
#[command(about = "Render per-hazard maps of current NWS alerts")]
struct Args {
    /// Configuration file
    #[arg(long, env = "ALERT_MAPPER_CONFIG", default_value = "config/alert-mapper.yaml")]
    config: PathBuf,

    /// Output directory (overrides the configuration)
    #[arg(long, env = "ALERT_MAPPER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Reuse previously extracted alert files instead of downloading
    #[arg(long)]
    skip_download: bool,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    let mut config = AppConfig::load(&args.config)
        .with_context(|| format!("Cannot start with config {}", args.config.display()))?;
    if let Some(dir) = args.output_dir {
        config.output.directory = dir;
    }

    info!(
        config = %args.config.display(),
        hazards = config.hazards.len(),
        output = %config.output.directory.display(),
        "Starting alert map run"
    );

    let summary = run(&config, args.skip_download).await?;

    for (name, reason) in &summary.failed {
        warn!(hazard = %name, reason = %reason, "Map not produced");
    }

    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}
