//! Leafcheck CLI - plant disease diagnosis from leaf photos.
//!
//! Classifies a photo of a single leaf into one of 38 crop/disease categories
//! and prints the most likely conditions with treatment and prevention advice.
//!
//! # Usage
//!
//! ```bash
//! # Diagnose a photo
//! leafcheck diagnose leaf.jpg
//!
//! # Machine-readable output
//! leafcheck diagnose leaf.jpg --format json -k 5
//!
//! # Disease information for a category
//! leafcheck lookup Tomato___Late_blight
//!
//! # Guided mode
//! leafcheck
//! ```

use clap::{CommandFactory, Parser, Subcommand};

mod cli;
mod logging;

/// Leafcheck - plant disease diagnosis from leaf photos.
#[derive(Parser, Debug)]
#[command(name = "leafcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Diagnose one or more leaf photos
    Diagnose(cli::diagnose::DiagnoseArgs),

    /// Show disease information for a category label
    Lookup(cli::lookup::LookupArgs),

    /// List the supported crop/disease categories
    Labels(cli::labels::LabelsArgs),

    /// Inspect the classifier model artifact
    Model(cli::model::ModelArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match leafcheck_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `leafcheck config path`."
            );
            leafcheck_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Leafcheck v{}", leafcheck_core::VERSION);

    match cli.command {
        Some(Commands::Diagnose(args)) => cli::diagnose::execute(args, config).await,
        Some(Commands::Lookup(args)) => cli::lookup::execute(args, config),
        Some(Commands::Labels(args)) => cli::labels::execute(args),
        Some(Commands::Model(args)) => cli::model::execute(args, config),
        Some(Commands::Config(args)) => cli::config::execute(args),
        None if console::Term::stderr().is_term() => cli::interactive::run(config).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
