//! Lattice CLI - Command-line interface for Lattice
//!
//! This is the main entry point for exploring a federated room graph:
//! one-shot snapshot queries, and a live watch mode that follows the
//! delta feed.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "lattice")]
#[command(version)]
#[command(about = "Live graph explorer for federated room networks", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the full graph snapshot and print it as JSON
    Fetch {
        /// Bulk snapshot URL
        url: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the spaces in the graph
    Spaces {
        /// Bulk snapshot URL
        url: String,
    },

    /// Search rooms by name, alias, or topic
    Search {
        /// Bulk snapshot URL
        url: String,

        /// Search query
        query: String,

        /// Maximum results to return
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show per-room link counts
    Links {
        /// Bulk snapshot URL
        url: String,

        /// Maximum rows to print
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Follow the live graph: seed from the snapshot, then stream deltas
    Watch {
        /// Bulk snapshot URL
        url: String,

        /// Push channel URL
        channel: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        Commands::Fetch { url, output } => commands::fetch(&url, output.as_deref()).await,
        Commands::Spaces { url } => commands::spaces(&url).await,
        Commands::Search { url, query, limit } => commands::search(&url, &query, limit).await,
        Commands::Links { url, limit } => commands::links(&url, limit).await,
        Commands::Watch { url, channel } => commands::watch(&url, &channel).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
