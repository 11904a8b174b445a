//! CLI library modules for the coref-scorer binary.
//!
//! Kept in the library so the argument parser and commands can be tested
//! without spawning the binary.

pub mod commands;
pub mod output;
pub mod parser;

pub use parser::{Cli, Commands, OutputFormat};

use crate::error::Result;

/// Dispatch a parsed command line.
///
/// # Errors
///
/// Whatever the selected command returns.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Score(args) => commands::score::run(args),
        Commands::Align(args) => commands::align::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
