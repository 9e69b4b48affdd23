//! rcon-cli - Command-line interface for RCON servers
//!
//! Provides one-shot commands, script execution and a REPL.

mod commands;
mod config;
mod repl;

use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Config;
use rcon_client::Client;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rcon-cli")]
#[command(about = "Command-line interface for RCON servers")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, env = "RCON_CONFIG")]
    config: Option<PathBuf>,

    /// Server address (rcon://host:port, host:port or host)
    #[arg(short, long)]
    address: Option<String>,

    /// RCON password (prefer RCON_PASSWORD or the config file)
    #[arg(short, long)]
    password: Option<String>,

    /// Connection timeout in seconds
    #[arg(long)]
    connect_timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Start interactive REPL
    Repl,

    /// Send a single command
    Exec {
        /// Command words, joined with spaces
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Send every line of a file over one connection
    Script {
        /// File with one command per line ('#' starts a comment)
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    };
    if let Some(address) = cli.address {
        config.address = address;
    }
    if let Some(password) = cli.password {
        config.password = Some(password);
    }
    if let Some(secs) = cli.connect_timeout {
        config.connect_timeout_secs = secs;
    }

    let connection_config = match config.connection_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    };
    tracing::debug!(addr = %connection_config.addr, "configuration loaded");

    let client = Client::new(connection_config);

    match cli.command {
        Some(Commands::Repl) | None => {
            repl::run(client).await?;
        }
        Some(cmd) => {
            if let Err(e) = commands::execute(&client, cmd).await {
                eprintln!("{}: {}", "Error".red(), e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
