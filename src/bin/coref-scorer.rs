//! coref-scorer - Coreference scoring CLI
//!
//! Scores a system's mention clustering against gold annotations with MUC,
//! B³, CEAF, BLANC and Krippendorff's alpha.
//!
//! # Usage
//!
//! ```bash
//! # Two flat clusterings sharing mention IDs
//! coref-scorer score --key gold.txt --response system.txt
//!
//! # A corpus of same-named files, per-document diagnostics
//! coref-scorer score --key gold/ --response system/ --per-doc
//!
//! # Span-annotated documents under ACE matching
//! coref-scorer align --input docs.jsonl --policy ace --format json
//! ```
//!
//! Logging goes to stderr; `-v`/`-q` adjust it and `RUST_LOG` overrides
//! per module.

use std::process::ExitCode;

use clap::Parser;

use coref_scorer::cli::output::color;
use coref_scorer::cli::{run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", color("31", "error:"), e);
            ExitCode::FAILURE
        }
    }
}
