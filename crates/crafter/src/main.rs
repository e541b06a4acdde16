//! crafter CLI - describe a UI component, generate it, preview it.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "crafter")]
#[command(about = "Generate UI components from a description and preview them")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to crafter.toml config file
    #[arg(short, long, default_value = "crafter.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default crafter.toml
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        yes: bool,
    },

    /// List supported frameworks
    Frameworks,

    /// Generate a component once and print or export it
    Generate {
        /// Target framework id
        #[arg(short, long, default_value = "html-css")]
        framework: String,

        /// Write the exported file into this directory
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Component description
        #[arg(required = true)]
        description: Vec<String>,
    },

    /// Start the local UI server
    Serve {
        /// Port to listen on (defaults to config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Frameworks => {
            commands::frameworks::run();
        }
        Commands::Generate {
            framework,
            out,
            description,
        } => {
            let config = config::load_config(&cli.config)?;
            commands::generate::run(&config, &framework, out, &description.join(" ")).await?;
        }
        Commands::Serve { port, no_open } => {
            let config = config::load_config(&cli.config)?;
            commands::serve::run(&config, port, !no_open).await?;
        }
    }

    Ok(())
}
