//! B³ (Bagga & Baldwin, 1998) and its twins-only variant.
//!
//! Mention-based: every key mention `m` with twin `m'` scores
//! `|keyChain(m) ∩ preimage(responseChain(m'))| / |keyChain(m)|`. The
//! variants differ only in what happens to a mention without a twin.

use coref_scorer_core::{DocumentPair, MentionPartition};

use super::{chain_overlaps, CorefScores, RawScore};
use crate::error::Result;

/// Treatment of mentions that have no twin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unmatched {
    /// Scored as if the other partition held it as a singleton: `1/|chain|`.
    Singleton,
    /// Counted in the denominator, contributes nothing.
    Zero,
    /// Left out of numerator and denominator.
    Skip,
}

/// `(numerator, denominator)` of one pass with `key` in the key role.
pub fn pass(
    key: &MentionPartition,
    response: &MentionPartition,
    unmatched: Unmatched,
) -> Result<(f64, f64)> {
    let mut num = 0.0;
    let mut den = 0.0;
    for overlap in chain_overlaps(key, response)? {
        let size = overlap.size as f64;
        // each of the `count` members landing in the same chain scores count/size
        for &count in overlap.hits.values() {
            num += (count * count) as f64 / size;
            den += count as f64;
        }
        match unmatched {
            Unmatched::Singleton => {
                num += overlap.unmatched as f64 / size;
                den += overlap.unmatched as f64;
            }
            Unmatched::Zero => den += overlap.unmatched as f64,
            Unmatched::Skip => {}
        }
    }
    Ok((num, den))
}

/// Raw B³ counts: unmatched mentions are singletons in both passes.
///
/// # Errors
///
/// A core `ReferentialIntegrity` error for a dangling match entry.
pub fn score_raw(pair: &DocumentPair) -> Result<RawScore> {
    let (key, response) = pair.recall_view();
    let recall = pass(key, response, Unmatched::Singleton)?;
    let (key, response) = pair.precision_view();
    let precision = pass(key, response, Unmatched::Singleton)?;
    Ok(RawScore::from_passes(recall, precision))
}

/// B³ precision, recall and F1.
///
/// # Errors
///
/// See [`score_raw`].
pub fn score(pair: &DocumentPair) -> Result<CorefScores> {
    Ok(score_raw(pair)?.to_scores())
}

/// Raw twins-only B³ counts.
///
/// Asymmetric on purpose: the recall pass keeps every key mention in the
/// denominator (twinless ones score 0), while the precision pass only
/// counts response mentions that have a twin.
///
/// # Errors
///
/// A core `ReferentialIntegrity` error for a dangling match entry.
pub fn twins_only_score_raw(pair: &DocumentPair) -> Result<RawScore> {
    let (key, response) = pair.recall_view();
    let recall = pass(key, response, Unmatched::Zero)?;
    let (key, response) = pair.precision_view();
    let precision = pass(key, response, Unmatched::Skip)?;
    Ok(RawScore::from_passes(recall, precision))
}

/// Twins-only B³ precision, recall and F1.
///
/// # Errors
///
/// See [`twins_only_score_raw`].
pub fn twins_only_score(pair: &DocumentPair) -> Result<CorefScores> {
    Ok(twins_only_score_raw(pair)?.to_scores())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coref_scorer_core::Role;

    fn aligned(key: Vec<Vec<i64>>, response: Vec<Vec<i64>>) -> DocumentPair {
        let mut pair = DocumentPair::new(
            MentionPartition::from_chains(Role::Key, key),
            MentionPartition::from_chains(Role::Response, response),
        );
        pair.align_by_id();
        pair
    }

    #[test]
    fn test_worked_example() {
        // recall per mention {2/3, 2/3, 1/3, 1}, precision {1, 1, 1/2, 1/2}
        let pair = aligned(vec![vec![1, 2, 3], vec![4]], vec![vec![1, 2], vec![3, 4]]);
        let raw = score_raw(&pair).unwrap();
        assert!((raw.numerator.recall - 8.0 / 3.0).abs() < 1e-9);
        assert_eq!(raw.denominator.recall, 4.0);
        assert!((raw.numerator.precision - 3.0).abs() < 1e-9);
        assert_eq!(raw.denominator.precision, 4.0);

        let s = raw.to_scores();
        assert!((s.recall - 2.0 / 3.0).abs() < 1e-9);
        assert!((s.precision - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_unmatched_scores_as_singleton() {
        // 3 has no twin: 1 and 2 score 2/3, 3 scores 1/3
        let pair = aligned(vec![vec![1, 2, 3]], vec![vec![1, 2]]);
        let raw = score_raw(&pair).unwrap();
        assert!((raw.numerator.recall - 5.0 / 3.0).abs() < 1e-9);
        assert_eq!(raw.denominator.recall, 3.0);
    }

    #[test]
    fn test_twins_only_asymmetry() {
        // key 3 and response 9 have no twin
        let pair = aligned(vec![vec![1, 2, 3]], vec![vec![1, 2], vec![9]]);

        let raw = twins_only_score_raw(&pair).unwrap();
        // recall: 1, 2 score 2/3 each, 3 scores 0, all three counted
        assert!((raw.numerator.recall - 4.0 / 3.0).abs() < 1e-9);
        assert_eq!(raw.denominator.recall, 3.0);
        // precision: 9 is skipped entirely
        assert!((raw.numerator.precision - 2.0).abs() < 1e-9);
        assert_eq!(raw.denominator.precision, 2.0);

        let standard = score_raw(&pair).unwrap();
        assert_eq!(standard.denominator.precision, 3.0);
    }

    #[test]
    fn test_identical_partitions() {
        let pair = aligned(vec![vec![1, 2], vec![3], vec![4, 5, 6]], vec![vec![4, 5, 6], vec![1, 2], vec![3]]);
        let s = score(&pair).unwrap();
        assert!((s.f1 - 1.0).abs() < 1e-12);
    }
}
