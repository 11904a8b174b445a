//! BLANC (Recasens & Hovy, 2010).
//!
//! A Rand index over mention pairs: every pair of matched key mentions is a
//! coreference link or a non-coreference link in each partition, and BLANC
//! averages the precision/recall of both link classes. Unlike MUC it rewards
//! correct non-coreference decisions, so singletons count.

use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use coref_scorer_core::DocumentPair;

use super::{chain_overlaps, CorefScores};
use crate::error::Result;

/// Pair counts over the matched mentions of one document (or a corpus).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCounts {
    /// Coreferent in both partitions.
    pub coref_right: u64,
    /// Coreferent in the response only.
    pub coref_wrong: u64,
    /// Non-coreferent in both partitions.
    pub non_coref_right: u64,
    /// Non-coreferent in the response only.
    pub non_coref_wrong: u64,
}

impl LinkCounts {
    /// Total number of mention pairs.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.coref_right + self.coref_wrong + self.non_coref_right + self.non_coref_wrong
    }

    /// BLANC precision, recall and F.
    ///
    /// When neither partition has a non-coreference link only the coreference
    /// class is scored, and vice versa. No pairs at all scores 0.
    #[must_use]
    pub fn to_scores(&self) -> CorefScores {
        let rc = self.coref_right as f64;
        let wc = self.coref_wrong as f64;
        let rn = self.non_coref_right as f64;
        let wn = self.non_coref_wrong as f64;

        if self.total() == 0 {
            return CorefScores::default();
        }

        let coref = CorefScores::new(ratio(rc, rc + wc), ratio(rc, rc + wn));
        let non_coref = CorefScores::new(ratio(rn, rn + wn), ratio(rn, rn + wc));

        // gold non-coref = rn + wc, response non-coref = rn + wn
        if rn + wc + wn == 0.0 {
            return coref;
        }
        // gold coref = rc + wn, response coref = rc + wc
        if rc + wc + wn == 0.0 {
            return non_coref;
        }

        CorefScores {
            precision: (coref.precision + non_coref.precision) / 2.0,
            recall: (coref.recall + non_coref.recall) / 2.0,
            f1: (coref.f1 + non_coref.f1) / 2.0,
        }
    }
}

impl Add for LinkCounts {
    type Output = LinkCounts;

    fn add(self, rhs: LinkCounts) -> LinkCounts {
        LinkCounts {
            coref_right: self.coref_right + rhs.coref_right,
            coref_wrong: self.coref_wrong + rhs.coref_wrong,
            non_coref_right: self.non_coref_right + rhs.non_coref_right,
            non_coref_wrong: self.non_coref_wrong + rhs.non_coref_wrong,
        }
    }
}

impl AddAssign for LinkCounts {
    fn add_assign(&mut self, rhs: LinkCounts) {
        *self = *self + rhs;
    }
}

/// Link counts over the matched key mentions of an aligned document.
///
/// # Errors
///
/// A core `ReferentialIntegrity` error for a dangling match entry.
pub fn link_counts(pair: &DocumentPair) -> Result<LinkCounts> {
    let (key, response) = pair.recall_view();
    let overlaps = chain_overlaps(key, response)?;

    let mut matched = 0_u64;
    let mut key_coref = 0_u64;
    let mut both_coref = 0_u64;
    let mut per_response: Vec<u64> = vec![0; response.num_chains()];

    for overlap in &overlaps {
        let in_chain: u64 = overlap.hits.values().map(|&c| c as u64).sum();
        matched += in_chain;
        key_coref += pairs(in_chain);
        for (&j, &count) in &overlap.hits {
            both_coref += pairs(count as u64);
            per_response[j] += count as u64;
        }
    }
    let response_coref: u64 = per_response.into_iter().map(pairs).sum();
    let total = pairs(matched);

    let coref_wrong = response_coref - both_coref;
    let non_coref_wrong = key_coref - both_coref;
    Ok(LinkCounts {
        coref_right: both_coref,
        coref_wrong,
        non_coref_right: total - both_coref - coref_wrong - non_coref_wrong,
        non_coref_wrong,
    })
}

/// BLANC precision, recall and F for one document.
///
/// # Errors
///
/// See [`link_counts`].
pub fn score(pair: &DocumentPair) -> Result<CorefScores> {
    Ok(link_counts(pair)?.to_scores())
}

fn pairs(n: u64) -> u64 {
    n * n.saturating_sub(1) / 2
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}
