//! Transport diagnostics CLI.
//!
//! # Commands
//! - `defaults`: print the embedded default configuration
//! - `resolve`: resolve transport settings from the defaults, optionally
//!   overridden by a TOML file, and print them

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use transport_diagnostics::config::{defaults, loader};
use transport_diagnostics::observability::logging::{
    init_logging, transport_filter_directives, BOOTSTRAP_DIRECTIVES,
};
use transport_diagnostics::TransportSettings;

#[derive(Parser)]
#[command(name = "transport-diag")]
#[command(about = "Inspect diagnostic transport settings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the embedded default configuration
    Defaults,
    /// Resolve and print transport settings
    Resolve {
        /// TOML file layered over the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print as JSON instead of debug output
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Defaults => {
            print!("{}", defaults::default_diagnostic_source());
        }
        Commands::Resolve { config, json } => {
            let logging = init_logging(BOOTSTRAP_DIRECTIVES)?;

            let root = match &config {
                Some(path) => loader::load_config(path)?,
                None => loader::load_defaults()?,
            };
            let settings = TransportSettings::from_root(&root)?;

            logging.apply(&transport_filter_directives(&settings))?;
            tracing::info!(
                hostname = %settings.hostname(),
                port = settings.port(),
                tls = settings.tls().is_enabled(),
                allocator_dumps = settings.enable_buffer_pool_dumps(),
                sample_rate = settings.buffer_pool_dump_sample_rate(),
                "Configuration loaded"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                println!("{settings:#?}");
            }
        }
    }

    Ok(())
}
