mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use client::PortalClient;
use committee_portal::config;
use output::{OutputConfig, OutputFormat};
use std::process;

/// Command line client for the committee portal
#[derive(Parser, Debug)]
#[clap(name = "portal-cli", about = "Manage the committee portal from the terminal")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "PORTAL_URL", global = true)]
    server_url: Option<String>,

    /// User to act as, sent in the X-User-Id header
    #[clap(long, env = "PORTAL_USER_ID", global = true)]
    user_id: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Track inventory and reconcile it against transactions
    #[command(subcommand)]
    Inventory(commands::inventory::InventoryCommands),
    /// Record income and expenses
    #[command(subcommand)]
    Treasury(commands::treasury::TreasuryCommands),
    /// Handle reimbursement requests and receipts
    #[command(subcommand)]
    Purchase(commands::purchase::PurchaseCommands),
    /// Read and answer committee mail
    #[command(subcommand)]
    Mail(commands::mail::MailCommands),
    /// Maintain the FAQ
    #[command(subcommand)]
    Faq(commands::faq::FaqCommands),
    /// Run polls
    #[command(subcommand)]
    Poll(commands::poll::PollCommands),
    /// Manage users and roles
    #[command(subcommand)]
    User(commands::user::UserCommands),
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > default (port based on debug/release)
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    let config_path = config::get_config_dir_path().map(|dir| dir.join("config.toml"));
    if let Some(path) = config_path {
        if let Ok(update) = config::config_from_file(Some(path)) {
            if let Some(url) = update.server_url {
                return url;
            }
            if let Some(port) = update.port {
                return format!("http://localhost:{}", port);
            }
        }
    }

    let port = if cfg!(debug_assertions) { 3001 } else { 3000 };
    format!("http://localhost:{}", port)
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!(
            "Could not connect to server. Is committee-portal running?\n  {}",
            err_string
        );
    }

    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let server_url = resolve_server_url(cli.server_url);
    let client = PortalClient::new(server_url, cli.user_id);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Inventory(cmd) => commands::inventory::execute(&client, cmd, &output_config).await,
        Commands::Treasury(cmd) => commands::treasury::execute(&client, cmd, &output_config).await,
        Commands::Purchase(cmd) => commands::purchase::execute(&client, cmd, &output_config).await,
        Commands::Mail(cmd) => commands::mail::execute(&client, cmd, &output_config).await,
        Commands::Faq(cmd) => commands::faq::execute(&client, cmd, &output_config).await,
        Commands::Poll(cmd) => commands::poll::execute(&client, cmd, &output_config).await,
        Commands::User(cmd) => commands::user::execute(&client, cmd, &output_config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
