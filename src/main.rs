mod config;
mod gateway;
mod github;
mod lookup;
mod report;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span};
use tracing_subscriber::EnvFilter;

use lookup::{GatewayClient, SearchState};

/// contrib-tracker: look up the issues and pull requests a GitHub user has
/// authored. `serve` runs the JSON gateway, `lookup` queries it and renders
/// a summary.
#[derive(Parser, Debug)]
#[command(name = "contrib-tracker", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the gateway serving GET /api/github?username=<login>
    Serve {
        /// Address to listen on (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Fetch a user's contributions from a running gateway and render them
    Lookup {
        /// GitHub username. When omitted, usernames are read from stdin,
        /// one per line, and only the newest search is shown.
        username: Option<String>,

        /// Gateway base URL (overrides client.gateway_url)
        #[arg(short, long)]
        gateway: Option<String>,

        /// Optional output file path for markdown report
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let mut config = config::Config::load()?;

    match cli.command {
        Command::Serve { bind } => {
            if bind.is_some() {
                config.server.bind = bind;
            }
            let addr = config.server.bind_addr()?;
            let _span = info_span!("serve", %addr).entered();
            gateway::serve(&config.github, addr).await?;
        }
        Command::Lookup {
            username,
            gateway,
            output,
        } => {
            if gateway.is_some() {
                config.client.gateway_url = gateway;
            }
            let gateway_url = config.client.gateway_url();
            debug!(gateway_url, "using gateway");
            let client = Arc::new(GatewayClient::new(gateway_url)?);

            let (tx, rx) = mpsc::channel(16);
            match username {
                Some(username) => {
                    tx.send(username).await?;
                    drop(tx);
                }
                None => {
                    tokio::spawn(async move {
                        let mut lines = BufReader::new(tokio::io::stdin()).lines();
                        while let Ok(Some(line)) = lines.next_line().await {
                            if tx.send(line).await.is_err() {
                                break;
                            }
                        }
                    });
                }
            }

            let session = lookup::run(client, rx, |state| render(state, output.as_deref())).await;
            if let SearchState::Failed { message, .. } = session.state() {
                return Err(message.clone().into());
            }
        }
    }

    Ok(())
}

fn render(state: &SearchState, output: Option<&std::path::Path>) {
    match state {
        SearchState::Idle => {}
        SearchState::Loading { username } => {
            eprintln!("Fetching contributions for {username}...");
        }
        SearchState::Loaded {
            username,
            contributions,
        } => {
            let built_report = report::build(username, contributions.clone());
            if let Err(err) = report::output(&built_report, output) {
                error!(error = %err, "failed to write report");
            }
        }
        SearchState::Failed { username, message } => {
            eprintln!("{} {}: {}", "error:".red().bold(), username, message);
        }
    }
}
