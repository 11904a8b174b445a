//! MUC (Vilain et al., 1995).
//!
//! Link-based: a chain of `n` mentions is `n - 1` links. Recall counts how
//! many of a key chain's links survive in the response partition; precision
//! is the same count with the partitions swapped.

use coref_scorer_core::{DocumentPair, MentionPartition};

use super::{chain_overlaps, CorefScores, RawScore};
use crate::error::Result;

/// `(numerator, denominator)` of one pass with `key` in the key role.
///
/// For each chain `C` with more than one member, `g` is the number of
/// `response` chains its matched members fall into plus one per unmatched
/// member. The chain contributes `|C| - g` over `|C| - 1`.
pub fn pass(key: &MentionPartition, response: &MentionPartition) -> Result<(f64, f64)> {
    let mut num = 0.0;
    let mut den = 0.0;
    for overlap in chain_overlaps(key, response)? {
        // Singletons have no links
        if overlap.size <= 1 {
            continue;
        }
        let groups = overlap.hits.len() + overlap.unmatched;
        num += (overlap.size - groups) as f64;
        den += (overlap.size - 1) as f64;
    }
    Ok((num, den))
}

/// Raw MUC counts for an aligned document.
///
/// # Errors
///
/// A core `ReferentialIntegrity` error for a dangling match entry.
pub fn score_raw(pair: &DocumentPair) -> Result<RawScore> {
    let (key, response) = pair.recall_view();
    let recall = pass(key, response)?;
    let (key, response) = pair.precision_view();
    let precision = pass(key, response)?;
    Ok(RawScore::from_passes(recall, precision))
}

/// MUC precision, recall and F1 for an aligned document.
///
/// # Errors
///
/// See [`score_raw`].
pub fn score(pair: &DocumentPair) -> Result<CorefScores> {
    Ok(score_raw(pair)?.to_scores())
}
