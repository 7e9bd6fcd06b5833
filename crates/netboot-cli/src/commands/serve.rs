//! serve command - run the HTTP auth service

use anyhow::Result;
use netboot_core::config::ServiceConfig;
use netboot_server::NetbootServer;
use tracing::info;

pub async fn execute(config: ServiceConfig) -> Result<()> {
    info!("Starting netboot auth {}", netboot_core::VERSION);

    NetbootServer::new(config).run().await?;
    Ok(())
}
