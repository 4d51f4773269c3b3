use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;

use tracing::info;

use api::{AppConfig, ApplicationServer, Logger};

// edge only, nothing here is persisted so there is no database or redis to wait on
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Arc::new(AppConfig::parse());

    // init logger and sentry, guards are kept alive to flush logs and maintain sentry connection
    let _guards = Logger::init(config.cargo_env, config.sentry_dsn.clone());

    info!("logger and env prepped, starting embed edge server...");

    if config.accept_invalid_certs {
        info!("upstream certificate verification is disabled (ACCEPT_INVALID_CERTS=true)");
    }

    ApplicationServer::serve(config)
        .await
        .context("edge server failed to start")?;

    Ok(())
}
