//! # coref-scorer
//!
//! Scoring for coreference resolution: compare a system's mention clustering
//! (the *response*) against gold annotations (the *key*).
//!
//! - **Alignment**: match independently numbered response mentions to gold
//!   mentions under MUC, ACE or UW span/head conventions
//! - **Metrics**: MUC, B³ (standard and twins-only), CEAF (φ4 and φ3),
//!   BLANC, Krippendorff's alpha and the CoNLL composite
//! - **Aggregation**: micro/macro corpus averages with per-document
//!   diagnostics
//!
//! ## Quick Start
//!
//! ```rust
//! use coref_scorer::metrics::{b_cubed, ceaf, muc};
//! use coref_scorer::{DocumentPair, MentionPartition, Role};
//!
//! let mut pair = DocumentPair::new(
//!     MentionPartition::from_chains(Role::Key, [vec![1, 2, 3], vec![4]]),
//!     MentionPartition::from_chains(Role::Response, [vec![1, 2], vec![3, 4]]),
//! );
//! // key and response share mention IDs here
//! pair.align_by_id();
//!
//! let muc = muc::score(&pair).unwrap();
//! let b3 = b_cubed::score(&pair).unwrap();
//! let ceaf = ceaf::entity_score(&pair).unwrap();
//! assert!((muc.recall - 0.5).abs() < 1e-9);
//! assert!((b3.precision - 0.75).abs() < 1e-9);
//! assert!((ceaf.recall - 0.7333).abs() < 1e-3);
//! ```
//!
//! ## Span-annotated input
//!
//! ```rust
//! use coref_scorer::align::{Aligner, AnnotatedDocument, GoldMention, MatchPolicy, ResponseMention};
//! use coref_scorer::aggregate::CorpusScorer;
//!
//! let doc = AnnotatedDocument::new("The dog saw the cat. It ran.")
//!     .with_gold(GoldMention::new(1, (0, 7), 1))
//!     .with_gold(GoldMention::new(2, (21, 23), 1))
//!     .with_response(ResponseMention::new(1, (4, 7), 1))
//!     .with_response(ResponseMention::new(2, (21, 23), 1));
//!
//! let report = CorpusScorer::default()
//!     .align_and_score(&Aligner::new(MatchPolicy::Muc), &[doc])
//!     .unwrap();
//! assert!((report.conll_f1.unwrap() - 1.0).abs() < 1e-9);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Adds |
//! |---------|---------|------|
//! | `cli` | yes | the `coref-scorer` binary |
//! | `parallel` | no | rayon-parallel corpus scoring |

#![warn(missing_docs)]

pub mod aggregate;
pub mod align;
pub mod assignment;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
mod error;
pub mod io;
pub mod metrics;

pub use coref_scorer_core::{ClusterId, DocumentPair, MentionId, MentionPartition, Role, Span};
pub use error::{Error, Result};

pub use aggregate::{CorpusReport, CorpusScorer, DocumentReport, ErrorPolicy};
pub use align::{Aligner, AlignmentStats, MatchPolicy};
pub use assignment::{Assignment, AssignmentSolver};
pub use config::ScoringConfig;
pub use metrics::{CorefScores, Metric, MetricScore, RawScore};

/// Prelude for common imports.
///
/// ```rust
/// use coref_scorer::prelude::*;
/// ```
pub mod prelude {
    pub use crate::aggregate::{CorpusReport, CorpusScorer, ErrorPolicy};
    pub use crate::align::{Aligner, AnnotatedDocument, GoldMention, MatchPolicy, ResponseMention};
    pub use crate::config::ScoringConfig;
    pub use crate::metrics::{CorefScores, Metric};
    pub use crate::{DocumentPair, Error, MentionPartition, Result, Role};
}
