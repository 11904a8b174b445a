//! CLI argument parsing and structure definitions

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use super::commands;
use crate::config::ScoringConfig;
use crate::error::Result;
use crate::metrics::Metric;

/// Coreference scorer - MUC, B³, CEAF, BLANC, Krippendorff's alpha
#[derive(Parser, Debug)]
#[command(name = "coref-scorer")]
#[command(
    author,
    version,
    about = "Coreference scorer - MUC, B³, CEAF, BLANC, Krippendorff's alpha",
    long_about = r#"
coref-scorer - score coreference output against gold annotations

INPUTS:
  • Flat clusterings: one `<mention_id> <cluster_id>` pair per line,
    key and response sharing mention IDs (file or directory pairs)
  • Annotated documents: JSON / JSON Lines with gold and response mention
    spans, aligned under a matching policy before scoring

EXAMPLES:
  coref-scorer score --key gold.txt --response system.txt
  coref-scorer score --key gold/ --response system/ -m muc -m ceaf --per-doc
  coref-scorer align --input docs.jsonl --policy ace --format json
  coref-scorer config
"#
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Log level selected by `-v` / `-q`.
    #[must_use]
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Off;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score flat clusterings that share mention IDs
    #[command(visible_alias = "s")]
    Score(commands::ScoreArgs),

    /// Align span-annotated documents, then score them
    #[command(visible_alias = "a")]
    Align(commands::AlignArgs),

    /// Show the effective configuration
    Config(commands::ConfigArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Text,
    /// JSON report
    Json,
}

/// Options shared by the scoring commands.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Configuration file (default: <config_dir>/coref-scorer/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Metric to compute (repeatable; overrides the config)
    #[arg(short, long = "metric", value_enum, value_name = "METRIC")]
    pub metrics: Vec<Metric>,

    /// Fail on the first document that cannot be scored
    #[arg(long)]
    pub strict: bool,

    /// Print per-document diagnostics
    #[arg(long)]
    pub per_doc: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl CommonArgs {
    /// Configuration from `--config` (or the default file), with flags
    /// applied on top.
    ///
    /// # Errors
    ///
    /// [`Error::Config`](crate::Error::Config) or
    /// [`Error::Io`](crate::Error::Io) from loading the file.
    pub fn resolve_config(&self) -> Result<ScoringConfig> {
        let mut config = match &self.config {
            Some(path) => ScoringConfig::from_toml_file(path)?,
            None => ScoringConfig::load_default()?,
        };
        if !self.metrics.is_empty() {
            config = config.with_metrics(self.metrics.iter().copied());
        }
        if self.strict {
            config = config.strict();
        }
        if self.per_doc {
            config = config.with_per_document(true);
        }
        Ok(config)
    }
}
