//! vejman-sync - Vejman permit folder synchronization
//!
//! Runs the dispatcher pass (reconcile open cases, sweep stale folders) or a
//! one-off purge of a folder tree.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vejman_sync::Config;

#[derive(Parser, Debug)]
#[command(name = "vejman-sync")]
#[command(author, version, about = "Vejman case folder synchronization", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// TOML configuration file; environment variables are used when omitted
    #[arg(long, global = true, env = "VEJMAN_SYNC_CONFIG")]
    config: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Reconcile open cases, enqueue them and sweep stale folders
    Dispatch,

    /// Only remove folders whose cases have not been seen within the retention window
    Sweep,

    /// Recursively delete a folder tree, retrying with a fresh session
    Purge {
        /// Folder to delete (defaults to the configured top folder)
        #[arg(long)]
        path: Option<String>,

        /// Delete only the contents and leave the emptied folder in place
        #[arg(long)]
        keep_root: bool,

        /// Attempts before giving up (defaults to PURGE_MAX_ATTEMPTS)
        #[arg(long)]
        max_attempts: Option<u32>,
    },
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vejman_sync=info,vejman_sync_cli=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn load_config(path: Option<&str>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Dispatch => commands::dispatch::run(&config).await,
        Commands::Sweep => commands::sweep::run(&config).await,
        Commands::Purge {
            path,
            keep_root,
            max_attempts,
        } => {
            let path = path.unwrap_or_else(|| config.sharepoint_top_folder.clone());
            let max_attempts = max_attempts.unwrap_or(config.purge_max_attempts);
            commands::purge::run(&config, &path, keep_root, max_attempts).await
        }
    }
}
