//! Command execution.

use crate::Commands;
use colored::Colorize;
use rcon_client::Client;
use std::path::Path;

/// Executes a one-shot or script command, printing responses to stdout.
pub async fn execute(client: &Client, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Repl => unreachable!(),

        Commands::Exec { command } => {
            let response = client.send(&command.join(" ")).await?;
            println!("{}", format_response(&response));
            Ok(())
        }

        Commands::Script { path } => run_script(client, &path).await,
    }
}

async fn run_script(client: &Client, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read script '{}': {}", path.display(), e))?;
    let lines = script_commands(&content);
    tracing::debug!(path = %path.display(), commands = lines.len(), "running script");

    let conn = client.connect().await?;
    let mut outcome = Ok(());
    for line in lines {
        println!("{} {}", ">".cyan(), line);
        match conn.send_command(line).await {
            Ok(response) => println!("{}", format_response(&response)),
            Err(e) => {
                outcome = Err(e.into());
                break;
            }
        }
    }

    let _ = conn.close().await;
    outcome
}

/// Returns the commands in a script: trimmed, non-empty lines not starting with '#'.
pub fn script_commands(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
}

/// Formats a server response for display.
pub fn format_response(response: &str) -> String {
    if response.is_empty() {
        "(no response)".dimmed().to_string()
    } else {
        response.to_string()
    }
}
