//! `aurelia-store` binary.

use anyhow::{Context, Result};
use aurelia_store::cli::Cli;
use aurelia_store::logging::init_logging;
use aurelia_store::{StoreConfig, StoreRuntime};
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;

    let config = StoreConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if cli.check_config {
        config.validate().context("validating configuration")?;
        info!("[store] Configuration is valid");
        return Ok(());
    }

    let runtime = StoreRuntime::new(config)?;
    runtime
        .run(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("[store] Ctrl-C received"),
                Err(e) => {
                    error!(error = %e, "[store] Cannot listen for Ctrl-C, running until killed");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await?;
    Ok(())
}
