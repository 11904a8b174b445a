//! Coreference metric engines.
//!
//! Every engine consumes an aligned [`DocumentPair`] and works only through
//! the match maps: a key mention and a response mention are the same mention
//! when, and only when, they are each other's twin.
//!
//! # Metric Summary
//!
//! | Metric | Focus | Averaging |
//! |--------|-------|-----------|
//! | **MUC** | Links; key singletons ignored | micro |
//! | **B³** | Mentions; unmatched mentions scored as singletons | micro |
//! | **B³ twins-only** | Mentions; only twins in the precision pass | micro |
//! | **CEAF** (φ4) | Entities; optimal cluster alignment | macro |
//! | **CEAF-m** (φ3) | Mentions under the optimal cluster alignment | macro |
//! | **BLANC** | Rand index over coreference / non-coreference links | micro |
//! | **Krippendorff's α** | Agreement on a unified cluster inventory | macro, single score |
//! | **CoNLL** | Mean of MUC, B³ and CEAF F1 | report only |
//!
//! Precision is always the recall computation with the two partitions'
//! roles swapped, so `precision(A, B) == recall(B, A)` holds by
//! construction for the link and mention metrics.
//!
//! # References
//!
//! - MUC: Vilain et al., 1995
//! - B³: Bagga & Baldwin, 1998
//! - CEAF: Luo, 2005
//! - BLANC: Recasens & Hovy, 2010
//! - α for coreference: Passonneau, 2004
//!
//! # Example
//!
//! ```rust
//! use coref_scorer::metrics::{b_cubed, muc};
//! use coref_scorer::{DocumentPair, MentionPartition, Role};
//!
//! let mut pair = DocumentPair::new(
//!     MentionPartition::from_chains(Role::Key, [vec![1, 2, 3], vec![4]]),
//!     MentionPartition::from_chains(Role::Response, [vec![1, 2], vec![3, 4]]),
//! );
//! pair.align_by_id();
//!
//! let scores = b_cubed::score(&pair).unwrap();
//! assert!((scores.precision - 0.75).abs() < 1e-9);
//!
//! let raw = muc::score_raw(&pair).unwrap();
//! assert_eq!(raw.numerator.recall, 1.0);
//! assert_eq!(raw.denominator.recall, 2.0);
//! ```

pub mod alpha;
pub mod b_cubed;
pub mod blanc;
pub mod ceaf;
pub mod muc;

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use coref_scorer_core::{DocumentPair, MentionPartition, Role};

use crate::assignment::AssignmentSolver;
use crate::error::{Error, Result};

pub use blanc::LinkCounts;

// =============================================================================
// Metric selection
// =============================================================================

/// A scoring metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Metric {
    /// Link-based MUC.
    Muc,
    /// Mention-based B-cubed.
    BCubed,
    /// B-cubed restricted to twins in the precision pass.
    BCubedTwinsOnly,
    /// Entity-based CEAF (φ4).
    Ceaf,
    /// Mention-based CEAF (φ3).
    CeafM,
    /// BLANC (Rand index).
    Blanc,
    /// Krippendorff's alpha.
    KrippendorffAlpha,
}

/// How per-document results combine across a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Averaging {
    /// Sum raw counts across documents, divide once.
    Micro,
    /// Mean of per-document precision and recall.
    Macro,
    /// Mean of per-document single scores.
    MacroSingle,
}

impl Metric {
    /// Every metric, in report order.
    pub const ALL: [Metric; 7] = [
        Metric::Muc,
        Metric::BCubed,
        Metric::BCubedTwinsOnly,
        Metric::Ceaf,
        Metric::CeafM,
        Metric::Blanc,
        Metric::KrippendorffAlpha,
    ];

    /// The metrics whose F1 scores make up the CoNLL composite.
    pub const CONLL: [Metric; 3] = [Metric::Muc, Metric::BCubed, Metric::Ceaf];

    /// Canonical name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Metric::Muc => "muc",
            Metric::BCubed => "b-cubed",
            Metric::BCubedTwinsOnly => "b-cubed-twins-only",
            Metric::Ceaf => "ceaf",
            Metric::CeafM => "ceaf-m",
            Metric::Blanc => "blanc",
            Metric::KrippendorffAlpha => "krippendorff-alpha",
        }
    }

    /// Corpus averaging style.
    #[must_use]
    pub fn averaging(self) -> Averaging {
        match self {
            Metric::Muc | Metric::BCubed | Metric::BCubedTwinsOnly | Metric::Blanc => {
                Averaging::Micro
            }
            Metric::Ceaf | Metric::CeafM => Averaging::Macro,
            Metric::KrippendorffAlpha => Averaging::MacroSingle,
        }
    }

    /// Score one aligned document.
    ///
    /// # Errors
    ///
    /// - a core `ReferentialIntegrity` error for a dangling match entry
    /// - [`Error::Evaluation`] if a CEAF assignment exceeds the solver cap
    pub fn evaluate(self, pair: &DocumentPair, solver: &AssignmentSolver) -> Result<MetricScore> {
        let score = match self {
            Metric::Muc => MetricScore::Raw(muc::score_raw(pair)?),
            Metric::BCubed => MetricScore::Raw(b_cubed::score_raw(pair)?),
            Metric::BCubedTwinsOnly => MetricScore::Raw(b_cubed::twins_only_score_raw(pair)?),
            Metric::Ceaf => MetricScore::Raw(ceaf::entity_score_raw(pair, solver)?),
            Metric::CeafM => MetricScore::Raw(ceaf::mention_score_raw(pair, solver)?),
            Metric::Blanc => MetricScore::Links(blanc::link_counts(pair)?),
            Metric::KrippendorffAlpha => MetricScore::Alpha(alpha::score(pair)?),
        };
        Ok(score)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "muc" => Ok(Metric::Muc),
            "b-cubed" | "bcubed" | "b3" => Ok(Metric::BCubed),
            "b-cubed-twins-only" | "bcubed-twins" | "b3-twins" => Ok(Metric::BCubedTwinsOnly),
            "ceaf" | "ceaf-e" | "ceafe" => Ok(Metric::Ceaf),
            "ceaf-m" | "ceafm" => Ok(Metric::CeafM),
            "blanc" => Ok(Metric::Blanc),
            "krippendorff-alpha" | "alpha" => Ok(Metric::KrippendorffAlpha),
            other => Err(Error::parse(format!("unknown metric '{}'", other))),
        }
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// Coreference evaluation scores (precision, recall, F1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CorefScores {
    /// Precision
    pub precision: f64,
    /// Recall
    pub recall: f64,
    /// F1 score
    pub f1: f64,
}

impl CorefScores {
    /// Create new scores; F1 is the harmonic mean (0 when both are 0).
    #[must_use]
    pub fn new(precision: f64, recall: f64) -> Self {
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
        }
    }

    /// Diagnostic form `P|R=F` in percent, e.g. `45.00|50.00=47.37`.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        format!(
            "{:.2}|{:.2}={:.2}",
            self.precision * 100.0,
            self.recall * 100.0,
            self.f1 * 100.0
        )
    }
}

impl std::fmt::Display for CorefScores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.diagnostic())
    }
}

/// A precision/recall/F triple of raw counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Prf {
    /// Precision component.
    pub precision: f64,
    /// Recall component.
    pub recall: f64,
    /// F component.
    pub f1: f64,
}

/// Raw numerator/denominator pairs for one document (or a corpus sum).
///
/// The F components are the exact fraction of the harmonic mean:
/// `f_num = 2·p_num·r_num`, `f_den = p_num·r_den + r_num·p_den`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawScore {
    /// Numerators.
    pub numerator: Prf,
    /// Denominators.
    pub denominator: Prf,
}

impl RawScore {
    /// Build from precision and recall fractions.
    #[must_use]
    pub fn new(p_num: f64, p_den: f64, r_num: f64, r_den: f64) -> Self {
        Self {
            numerator: Prf {
                precision: p_num,
                recall: r_num,
                f1: 2.0 * p_num * r_num,
            },
            denominator: Prf {
                precision: p_den,
                recall: r_den,
                f1: p_num * r_den + r_num * p_den,
            },
        }
    }

    /// Build from one recall pass and one precision pass, each `(num, den)`.
    #[must_use]
    pub fn from_passes(recall: (f64, f64), precision: (f64, f64)) -> Self {
        Self::new(precision.0, precision.1, recall.0, recall.1)
    }

    /// Divide out. A zero denominator yields 0.
    #[must_use]
    pub fn to_scores(&self) -> CorefScores {
        let precision = ratio(self.numerator.precision, self.denominator.precision);
        let recall = ratio(self.numerator.recall, self.denominator.recall);
        CorefScores {
            precision,
            recall,
            f1: ratio(self.numerator.f1, self.denominator.f1),
        }
    }
}

impl Add for RawScore {
    type Output = RawScore;

    /// Sums precision and recall counts; the F fraction is rederived from the
    /// sums so a micro average is the harmonic mean of the summed P and R.
    fn add(self, rhs: RawScore) -> RawScore {
        RawScore::new(
            self.numerator.precision + rhs.numerator.precision,
            self.denominator.precision + rhs.denominator.precision,
            self.numerator.recall + rhs.numerator.recall,
            self.denominator.recall + rhs.denominator.recall,
        )
    }
}

impl AddAssign for RawScore {
    fn add_assign(&mut self, rhs: RawScore) {
        *self = *self + rhs;
    }
}

/// One metric's result for one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricScore {
    /// Precision/recall counts.
    Raw(RawScore),
    /// BLANC link counts.
    Links(LinkCounts),
    /// A single reliability coefficient.
    Alpha(f64),
}

impl MetricScore {
    /// Precision/recall/F1, for metrics that have them.
    #[must_use]
    pub fn scores(&self) -> Option<CorefScores> {
        match self {
            MetricScore::Raw(raw) => Some(raw.to_scores()),
            MetricScore::Links(links) => Some(links.to_scores()),
            MetricScore::Alpha(_) => None,
        }
    }

    /// The headline number: F1, or alpha.
    #[must_use]
    pub fn value(&self) -> f64 {
        match self {
            MetricScore::Alpha(alpha) => *alpha,
            other => other.scores().map_or(0.0, |s| s.f1),
        }
    }
}

impl std::fmt::Display for MetricScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricScore::Alpha(alpha) => write!(f, "alpha={:.4}", alpha),
            other => match other.scores() {
                Some(scores) => write!(f, "{}", scores),
                None => Ok(()),
            },
        }
    }
}

/// CoNLL F1: the unweighted mean of MUC, B³ and CEAF F1.
#[must_use]
pub fn conll_f1(muc: &CorefScores, b_cubed: &CorefScores, ceaf: &CorefScores) -> f64 {
    (muc.f1 + b_cubed.f1 + ceaf.f1) / 3.0
}

// =============================================================================
// Degenerate input
// =============================================================================

/// Non-fatal condition under which a score follows a zero/neutral convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreWarning {
    /// The partition has no mentions.
    Empty {
        /// Which side.
        role: Role,
    },
    /// The partition has exactly one mention.
    SingleMention {
        /// Which side.
        role: Role,
    },
    /// Every chain is a singleton; MUC has nothing to count on this side.
    AllSingletons {
        /// Which side.
        role: Role,
    },
}

impl std::fmt::Display for ScoreWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreWarning::Empty { role } => write!(f, "{} partition is empty", role),
            ScoreWarning::SingleMention { role } => {
                write!(f, "{} partition has a single mention", role)
            }
            ScoreWarning::AllSingletons { role } => {
                write!(f, "{} partition has only singleton chains", role)
            }
        }
    }
}

/// Degenerate-input conditions of `pair`, key side first.
#[must_use]
pub fn degenerate_warnings(pair: &DocumentPair) -> Vec<ScoreWarning> {
    let mut warnings = Vec::new();
    for partition in [&pair.key, &pair.response] {
        let role = partition.role();
        match partition.num_mentions() {
            0 => warnings.push(ScoreWarning::Empty { role }),
            1 => warnings.push(ScoreWarning::SingleMention { role }),
            _ if partition.is_all_singletons() => {
                warnings.push(ScoreWarning::AllSingletons { role })
            }
            _ => {}
        }
    }
    warnings
}

// =============================================================================
// Helper: chain overlap through the match map
// =============================================================================

/// How one chain of the `from` partition spreads over the `to` partition.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ChainOverlap {
    /// Chain size.
    pub size: usize,
    /// Members with no twin.
    pub unmatched: usize,
    /// `to` chain index -> number of members whose twin lies in it.
    pub hits: BTreeMap<usize, usize>,
}

/// One [`ChainOverlap`] per chain of `from`, in `from.chains()` order.
pub(crate) fn chain_overlaps(
    from: &MentionPartition,
    to: &MentionPartition,
) -> Result<Vec<ChainOverlap>> {
    from.chains()
        .map(|(_, chain)| {
            let mut overlap = ChainOverlap {
                size: chain.len(),
                ..ChainOverlap::default()
            };
            for &mention in chain {
                match from.twin_chain_index_in(mention, to)? {
                    Some(idx) => *overlap.hits.entry(idx).or_default() += 1,
                    None => overlap.unmatched += 1,
                }
            }
            Ok(overlap)
        })
        .collect()
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

// =============================================================================
// Tests
// =============================================================================
