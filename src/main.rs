use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epg_merge::{config::defaults::DEFAULT_CONFIG_FILE, Config, Pipeline};

#[derive(Parser)]
#[command(name = "epg-merge")]
#[command(version)]
#[command(about = "Merge remote XMLTV guides into one filtered EPG and build a matching M3U playlist")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path (skipped when missing)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Public base URL the EPG is served from (overrides BASE_URL)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Directory input and output file names resolve against (overrides BASE_DIR)
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_filter = format!("epg_merge={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Starting epg-merge v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(Some(cli.config.as_path()))?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(base_dir) = cli.base_dir {
        config.base_dir = base_dir;
    }
    config.validate()?;

    info!(
        "Using mapping {} and EPG sources {}",
        config.mapping_path().display(),
        config.epg_sources_path().display()
    );

    Pipeline::new(config)?.run().await?;
    Ok(())
}
