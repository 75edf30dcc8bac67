//! CLI argument parsing for the stackstrap binary.

use std::path::PathBuf;

use clap::Parser;

/// Stackstrap - bootstraps an OpenStack management topology
///
/// Provisions the management network, subnet, external network, router and
/// security groups described by the configuration file, creating each
/// resource or verifying an operator-provisioned one.
#[derive(Parser, Debug, Clone)]
#[command(name = "stackstrap")]
#[command(author = "Stackstrap Contributors")]
#[command(version)]
#[command(about = "Bootstraps an OpenStack management topology", long_about = None)]
pub struct Cli {
    /// Path to the bootstrap configuration file (YAML, JSON or TOML)
    #[arg(value_name = "CONFIG_FILE")]
    pub config_file: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get effective verbosity level.
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_config_file_and_flags() {
        let cli = Cli::try_parse_from(["stackstrap", "-vv", "--no-color", "config.yaml"]).unwrap();
        assert_eq!(cli.config_file, PathBuf::from("config.yaml"));
        assert_eq!(cli.verbosity(), 2);
        assert!(cli.no_color);
    }

    #[test]
    fn test_config_file_is_required() {
        assert!(Cli::try_parse_from(["stackstrap"]).is_err());
    }
}
