//! Interactive REPL.

use crate::commands::format_response;
use colored::Colorize;
use rcon_client::{Client, Connection};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};

const HELP_TEXT: &str = r#"
Lines are sent to the server as commands. Local commands:
  .help                         Show this help
  .quit, .exit                  Exit the REPL
  .reconnect                    Drop the connection and log in again
"#;

/// What a REPL line asks for.
#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
    Empty,
    Help,
    Quit,
    Reconnect,
    Command(&'a str),
}

fn parse_line(line: &str) -> ReplInput<'_> {
    let line = line.trim();
    match line {
        "" => ReplInput::Empty,
        ".help" => ReplInput::Help,
        ".quit" | ".exit" => ReplInput::Quit,
        ".reconnect" => ReplInput::Reconnect,
        _ => ReplInput::Command(line),
    }
}

pub async fn run(client: Client) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "rcon-cli".bold().cyan());
    println!("Connecting to {}...", client.config().addr);

    let mut conn = client.connect().await?;
    println!("{} {}", "Connected to".green(), conn.peer());

    // Create readline editor
    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();
    let mut rl: Editor<(), DefaultHistory> = Editor::with_config(config)?;

    // Load history
    let history_path = std::env::var("HOME")
        .map(|h| std::path::PathBuf::from(h).join(".rcon_history"))
        .unwrap_or_else(|_| ".rcon_history".into());
    let _ = rl.load_history(&history_path);

    println!("Type '.help' for help.\n");

    loop {
        let prompt = format!("{} ", "rcon>".cyan());
        match rl.readline(&prompt) {
            Ok(line) => match parse_line(&line) {
                ReplInput::Empty => continue,
                ReplInput::Help => println!("{}", HELP_TEXT),
                ReplInput::Quit => break,
                ReplInput::Reconnect => {
                    let _ = conn.close().await;
                    match client.connect().await {
                        Ok(fresh) => {
                            conn = fresh;
                            println!("{}\n", "Reconnected.".green());
                        }
                        Err(e) => println!("{}: {}\n", "Error".red(), e),
                    }
                }
                ReplInput::Command(command) => {
                    if let Err(e) = ensure_open(&client, &mut conn).await {
                        println!("{}: {}\n", "Error".red(), e);
                        continue;
                    }
                    match conn.send_command(command).await {
                        Ok(response) => println!("{}\n", format_response(&response)),
                        Err(e) => println!("{}: {}\n", "Error".red(), e),
                    }
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                println!("{}: {:?}", "Error".red(), err);
                break;
            }
        }
    }

    // Save history
    let _ = rl.save_history(&history_path);

    // Disconnect
    let _ = conn.close().await;
    println!("{}", "Disconnected.".dimmed());

    Ok(())
}

/// Replaces a connection the server has closed with a fresh one.
async fn ensure_open(
    client: &Client,
    conn: &mut Connection,
) -> Result<(), rcon_client::ClientError> {
    if conn.is_closed() {
        println!("{}", "Connection lost, reconnecting...".yellow());
        *conn = client.connect().await?;
    }
    Ok(())
}
