//! Write a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    tracing::info!("Created {}", config_path.display());
    tracing::info!("Set GEMINI_API_KEY and run 'crafter serve' to start.");

    Ok(())
}

pub const DEFAULT_CONFIG: &str = r#"# crafter configuration

[generation]
# Model used for generation
model = "gemini-2.5-flash"

# Generation API endpoint
base_url = "https://generativelanguage.googleapis.com/v1beta"

# Environment variable holding the API key
api_key_env = "GEMINI_API_KEY"

# Attempts per generation, including the first call
max_attempts = 3

# Delay before retry n is base_delay_ms * n
base_delay_ms = 2000

# Request timeout
timeout_secs = 120

[server]
host = "127.0.0.1"
port = 7878

# Open the browser on start
open = true

[preview]
# Recreate the preview after every successful generation
remount_on_generate = false
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use tempfile::tempdir;

    #[tokio::test]
    async fn writes_loadable_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crafter.toml");

        run(&path, false).await.unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.generation.model, "gemini-2.5-flash");
        assert_eq!(config.server.port, 7878);
    }

    #[tokio::test]
    async fn keeps_existing_config_without_yes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("crafter.toml");
        fs::write(&path, "[server]\nport = 9000\n").unwrap();

        run(&path, false).await.unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[server]\nport = 9000\n");

        run(&path, true).await.unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
    }
}
