//! Score command - flat clusterings that share mention IDs

use std::path::PathBuf;

use clap::Parser;

use super::super::output::{render_report, write_output};
use super::super::parser::CommonArgs;

use crate::aggregate::{CorpusReport, CorpusScorer};
use crate::error::{Error, Result};
use crate::io::{self, FilePair};

/// Score a response clustering against a key clustering
///
/// With two files, they form a single document. With two directories,
/// same-named files are paired and the corpus is scored as a whole.
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Key (gold) clustering file or directory
    #[arg(short, long, value_name = "PATH")]
    pub key: PathBuf,

    /// Response (system) clustering file or directory
    #[arg(short, long, value_name = "PATH")]
    pub response: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run the score command.
///
/// # Errors
///
/// Unreadable input, a bad configuration, or (with `--strict`) the first
/// document that fails to score.
pub fn run(args: ScoreArgs) -> Result<()> {
    let config = args.common.resolve_config()?;
    let scorer = CorpusScorer::from_config(&config);

    let report = if args.key.is_dir() {
        score_directories(&scorer, &args)?
    } else if args.response.is_dir() {
        return Err(Error::invalid_input(format!(
            "{} is a directory but {} is not",
            args.response.display(),
            args.key.display()
        )));
    } else {
        let pair = io::load_pair(&args.key, &args.response)?;
        scorer.score_pairs(&[pair])?
    };

    let rendered = render_report(&report, args.common.format)?;
    write_output(&rendered, args.common.output.as_deref())
}

fn score_directories(scorer: &CorpusScorer, args: &ScoreArgs) -> Result<CorpusReport> {
    let files = io::pair_directories(&args.key, &args.response)?;
    if files.is_empty() {
        log::warn!(
            "no matching files in {} and {}",
            args.key.display(),
            args.response.display()
        );
    } else {
        log::info!("scoring {} document pairs", files.len());
    }
    scorer.score_each(
        &files,
        |file: &FilePair| Some(file.name.clone()),
        |file: &FilePair| scorer.score_document(&file.load()?),
    )
}
