//! dirlru CLI - the daemon and its client
//!
//! `dirlru serve` watches directory trees and remembers the five
//! directories that changed last; `dirlru query` asks a running daemon
//! for that list.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "dirlru")]
#[command(author = "dirlru Contributors")]
#[command(version)]
#[command(about = "Remembers which directories changed last", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch directory trees and answer queries
    Serve {
        /// Roots to watch (defaults to $HOME and /media)
        roots: Vec<PathBuf>,

        /// Socket to answer queries on (defaults to ~/.watchsock)
        #[arg(long, env = "DIRLRU_SOCKET")]
        socket: Option<PathBuf>,

        /// File with glob patterns of directories to skip (defaults to ~/.watch-ignore)
        #[arg(long, env = "DIRLRU_IGNORE_FILE")]
        ignore_file: Option<PathBuf>,
    },

    /// Print the recently changed directories, most recent first
    Query {
        /// Socket of the running daemon (defaults to ~/.watchsock)
        #[arg(long, env = "DIRLRU_SOCKET")]
        socket: Option<PathBuf>,

        /// Show paths below $HOME relative to it
        #[arg(short, long)]
        relative: bool,

        /// Print a JSON array instead of one path per line
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging; stdout belongs to query output
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let home = dirs::home_dir();
    let result = match cli.command {
        Commands::Serve {
            roots,
            socket,
            ignore_file,
        } => match config::DaemonConfig::resolve(roots, socket, ignore_file, home) {
            Ok(config) => commands::serve(config).await,
            Err(e) => Err(e.into()),
        },
        Commands::Query {
            socket,
            relative,
            json,
        } => commands::query(socket, home, relative, json).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
