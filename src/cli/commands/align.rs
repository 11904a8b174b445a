//! Align command - span-annotated documents, aligned then scored

use std::path::PathBuf;

use clap::Parser;

use super::super::output::{render_report, write_output};
use super::super::parser::CommonArgs;

use crate::aggregate::CorpusScorer;
use crate::align::{Aligner, MatchPolicy};
use crate::error::Result;
use crate::io;

/// Align response mentions to gold mentions, then score
#[derive(Parser, Debug)]
pub struct AlignArgs {
    /// Annotated documents (JSON array or JSON Lines)
    #[arg(short, long, value_name = "PATH")]
    pub input: PathBuf,

    /// Mention matching policy (overrides the config)
    #[arg(short, long, value_enum)]
    pub policy: Option<MatchPolicy>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Run the align command.
///
/// # Errors
///
/// Unreadable or malformed input, a bad configuration, or (with
/// `--strict`) the first document that fails to align or score.
pub fn run(args: AlignArgs) -> Result<()> {
    let mut config = args.common.resolve_config()?;
    if let Some(policy) = args.policy {
        config = config.with_policy(policy);
    }

    let documents = io::read_documents(&args.input)?;
    log::info!(
        "aligning {} documents under the {} policy",
        documents.len(),
        config.policy
    );

    let report = CorpusScorer::from_config(&config)
        .align_and_score(&Aligner::new(config.policy), &documents)?;

    let rendered = render_report(&report, args.common.format)?;
    write_output(&rendered, args.common.output.as_deref())
}
