//! Quotebook CLI
//!
//! Command-line interface for Quotebook - a local quote collection with
//! remote sync.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quotebook_core::{Config, QuoteBook};

mod commands;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "quotebook")]
#[command(about = "Quotebook - Collect, browse and sync quotes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to an alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a random quote (default)
    Show {
        /// Only pick from this category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Add a new quote
    Add {
        /// Quote text
        text: String,
        /// Quote category
        category: String,
    },
    /// List quotes
    #[command(alias = "ls")]
    List {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// List all categories
    Categories,
    /// Show or change the selected category
    Category {
        /// Category to select ("all" for every quote)
        name: Option<String>,
    },
    /// Export quotes to a JSON file
    Export {
        /// Destination file (defaults to quotes.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import quotes from a JSON file
    Import {
        /// File containing a JSON array of quotes
        path: PathBuf,
    },
    /// Delete all quotes
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Sync once with the remote server
    Sync,
    /// Sync periodically until interrupted
    Watch {
        /// Seconds between syncs (defaults to sync_interval_secs)
        #[arg(short, long)]
        interval: Option<u64>,
    },
    /// Show status (counts, storage, sync settings)
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, remote_url, push_url, sync_enabled, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the quote book
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config);

    let book = QuoteBook::open_with_config(config);

    let command = cli.command.unwrap_or(Commands::Show { category: None });
    match command {
        Commands::Show { category } => commands::quote::show(&book, category, &output).await,
        Commands::Add { text, category } => {
            commands::quote::add(&book, text, category, &output).await
        }
        Commands::List { category } => commands::quote::list(&book, category, &output).await,
        Commands::Categories => commands::quote::categories(&book, &output).await,
        Commands::Category { name } => commands::quote::category(&book, name, &output).await,
        Commands::Export { output: path } => {
            commands::transfer::export(&book, path, &output).await
        }
        Commands::Import { path } => commands::transfer::import(&book, path, &output).await,
        Commands::Clear { yes } => commands::transfer::clear(&book, yes, &output).await,
        Commands::Sync => commands::sync::sync(&book, &output).await,
        Commands::Watch { interval } => commands::sync::watch(&book, interval, &output).await,
        Commands::Status => commands::status::show(&book, &output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize file-based logging when QUOTEBOOK_LOG is set
///
/// Log output goes to a file so it never mixes with command output.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("QUOTEBOOK_LOG") else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "quotebook_core={},quotebook_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
