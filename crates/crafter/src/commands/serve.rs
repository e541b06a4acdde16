//! Local UI server command.

use anyhow::{Context, Result};

use crafter_client::GenerationClient;
use crafter_server::AppServer;

use crate::config::ConfigFile;

/// Run the serve command.
pub async fn run(config: &ConfigFile, port: Option<u16>, open: bool) -> Result<()> {
    let client_config = config.generation.client_config()?;
    let client = GenerationClient::gemini(client_config).context("Failed to create generation client")?;

    let mut server_config = config.server.server_config();
    if let Some(port) = port {
        server_config.port = port;
    }
    server_config.open = server_config.open && open;

    tracing::info!("Using model {}", client.model());

    AppServer::new(server_config, client, config.preview)
        .start()
        .await?;

    Ok(())
}
