//! certdb CLI - collect a certificate stream and inspect the stores

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::StoreArgs;

#[derive(Parser)]
#[command(name = "certdb")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream certificate updates into a store until Ctrl-C or disconnect
    Collect {
        /// Websocket endpoint of the certificate stream
        #[arg(short, long, env = "CERTSTREAM_WEBSOCKET_URL")]
        endpoint: String,

        /// Log progress every N certificate updates
        #[arg(long, default_value_t = 1000)]
        progress_interval: u64,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show size, entry count and longest domain per store
    Stats {
        /// Which store(s) to inspect
        #[arg(long, value_enum, default_value = "both")]
        store: commands::stats::StoreChoice,

        /// Path to SQLite database file
        #[arg(long, default_value = "certstream.db")]
        sqlite_path: std::path::PathBuf,

        /// Path to LMDB directory
        #[arg(long, default_value = "certstream_lmdb")]
        lmdb_path: std::path::PathBuf,
    },

    /// Look up stored certificates
    #[command(subcommand)]
    Query(QueryCommands),
}

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Show the record stored for an exact domain
    Get {
        domain: String,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Find domains containing a substring (case-insensitive)
    Search {
        needle: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// List the most recently updated certificates
    Recent {
        /// Maximum number of results
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        #[command(flatten)]
        store: StoreArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    // Execute command
    match cli.command {
        Commands::Collect {
            endpoint,
            progress_interval,
            store,
        } => {
            commands::collect::execute(endpoint, progress_interval, store).await?;
        }
        Commands::Stats {
            store,
            sqlite_path,
            lmdb_path,
        } => {
            commands::stats::execute(store, sqlite_path, lmdb_path);
        }
        Commands::Query(query_cmd) => {
            commands::query::execute(query_cmd)?;
        }
    }

    Ok(())
}
