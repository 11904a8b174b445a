//! Config command - show the effective configuration

use std::path::PathBuf;

use clap::Parser;

use super::super::output::write_output;

use crate::config::ScoringConfig;
use crate::error::Result;

/// Show the effective configuration as TOML
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration file to show instead of the default one
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the default config file location and exit
    #[arg(long)]
    pub path: bool,
}

/// Run the config command.
///
/// # Errors
///
/// A config file that exists but cannot be read or parsed.
pub fn run(args: ConfigArgs) -> Result<()> {
    if args.path {
        let location = match ScoringConfig::default_path() {
            Some(path) => format!("{}\n", path.display()),
            None => "no config directory on this platform\n".to_string(),
        };
        return write_output(&location, None);
    }

    let config = match &args.config {
        Some(path) => ScoringConfig::from_toml_file(path)?,
        None => ScoringConfig::load_default()?,
    };
    write_output(&config.to_toml_string()?, None)
}
