use anyhow::{Context, Result};
use clap::Parser;
use marketsync_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use marketsync_core::metrics::init_metrics;
use marketsync_core::shutdown::{install_signal_handlers, ShutdownCoordinator};
use marketsync_core::Config;
use std::sync::Arc;
use tracing::{info, warn};

mod cli;
mod session;

use cli::{expand_path, Args};
use session::{load_fixture, Session};

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(expand_path(path)?).context("loading config file")?,
        None => Config::from_env().context("reading MARKETSYNC_* environment")?,
    };
    if let Some(data_dir) = &args.data_dir {
        config.store.data_dir = expand_path(data_dir)?;
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    // Initialize logging
    let mut log_config = LogConfig::from_config(&config.logging)?;
    if let Some(level) = &args.log_level {
        let fallback = log_config.level;
        log_config.level = level.parse::<LogLevel>().unwrap_or_else(|e| {
            eprintln!("{}, using '{}'", e, fallback);
            fallback
        });
    }
    init_logging_with_config(log_config)?;
    init_metrics();

    info!(command = ?args.command, "marketsync started");

    let shutdown = Arc::new(ShutdownCoordinator::new());
    if let Err(e) = install_signal_handlers(shutdown.clone()) {
        warn!(error = %e, "Signal handlers unavailable");
    }

    let fixture = match &args.fixture {
        Some(path) => load_fixture(Some(&expand_path(path)?))?,
        None => load_fixture(None)?,
    };

    let session = Session::open(config, fixture, shutdown);
    session.bootstrap().await?;
    session.run(args.command).await?;
    println!("{}", session.render()?);

    Ok(())
}
