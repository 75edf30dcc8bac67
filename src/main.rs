//! Stackstrap - OpenStack management-topology bootstrapper
//!
//! This is the main entry point for the stackstrap CLI.

mod cli;

use cli::Cli;
use colored::Colorize;
use stackstrap::prelude::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    init_logging(cli.verbosity());

    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.verbosity() >= 2 {
        eprintln!("Stackstrap v{VERSION}");
    }

    match run(&cli).await {
        Ok(topology) => {
            println!("{}", "Management topology is in place".green().bold());
            for (label, id) in topology.entries() {
                println!("  {:<24} {}", label.cyan(), id);
            }
        }
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: &Cli) -> Result<Topology> {
    let config = Config::load(&cli.config_file)?;
    let client = NeutronClient::connect(&config).await?;
    Bootstrapper::new(&client, &config.management).run().await
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(verbosity >= 3))
        .with(env_filter)
        .init();
}
