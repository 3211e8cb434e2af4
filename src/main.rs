//! ADP CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "adp")]
#[command(about = "Extract @ai-metadata annotations and build a knowledge graph", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan files for metadata blocks and summarise them
    Scan {
        /// File or directory to scan
        path: PathBuf,

        /// Only scan the top-level directory
        #[arg(long)]
        no_recursive: bool,

        /// Write a JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Schema name or schema definition file
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Validate the metadata blocks of one file
    Validate {
        /// File to validate
        file: PathBuf,

        /// Schema name or schema definition file
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Build the knowledge graph and export it as JSON
    Graph {
        /// File or directory to scan
        path: PathBuf,

        /// Output file for the graph export
        #[arg(short, long, default_value = "adp-graph.json")]
        output: PathBuf,

        /// Only scan the top-level directory
        #[arg(long)]
        no_recursive: bool,

        /// Schema name or schema definition file
        #[arg(short, long)]
        schema: Option<String>,
    },
    /// Write a default .adp.toml into a directory
    Init {
        /// Directory to initialise
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("adp={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("ADP v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Scan { path, no_recursive, output, schema } => {
            commands::scan(&path, !no_recursive, output.as_deref(), schema.as_deref())
        }
        Commands::Validate { file, schema } => commands::validate(&file, schema.as_deref()),
        Commands::Graph { path, output, no_recursive, schema } => {
            commands::graph(&path, &output, !no_recursive, schema.as_deref())
        }
        Commands::Init { path, force } => commands::init(&path, force),
    }
}
