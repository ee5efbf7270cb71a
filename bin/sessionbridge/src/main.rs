mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sessionbridge")]
#[command(about = "Correlates CRM and professional-network browser sessions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bridge daemon against a Chrome remote-debugging endpoint
    Run,

    /// Show a summary of the stored platform state (values redacted)
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the current configuration
    Show,
    /// Set a configuration value (e.g. webhook.endpoint)
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match cli.command {
        Commands::Run => commands::run_cmd::execute().await,
        Commands::Status => commands::status::execute().await,
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config_cmd::show(),
            ConfigCommands::Set { key, value } => commands::config_cmd::set(&key, &value),
        },
    }
}
