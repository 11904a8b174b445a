//! CEAF (Luo, 2005).
//!
//! Entity-based: key and response clusters are aligned one-to-one by an
//! optimal assignment over a cluster similarity, and precision/recall are
//! the achieved similarity normalized by each side's self-similarity.
//!
//! - φ4 (entity): `2·|K ∩ R| / (|K| + |R|)`, normalized by cluster counts
//! - φ3 (mention): `|K ∩ R|`, normalized by mention counts
//!
//! Intersections are counted through the match map.

use coref_scorer_core::DocumentPair;

use super::{chain_overlaps, CorefScores, RawScore};
use crate::assignment::{Assignment, AssignmentSolver};
use crate::error::Result;

/// Cluster similarity used to fill the assignment matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Similarity {
    /// φ4, the entity-based CEAF.
    Entity,
    /// φ3, the mention-based CEAF.
    Mention,
}

/// Similarity matrix: rows are key chains, columns response chains, both in
/// `chains()` order.
///
/// # Errors
///
/// A core `ReferentialIntegrity` error for a dangling match entry.
pub fn similarity_matrix(pair: &DocumentPair, similarity: Similarity) -> Result<Vec<Vec<f64>>> {
    let (key, response) = pair.recall_view();
    let cols = response.num_chains();
    let overlaps = chain_overlaps(key, response)?;

    let matrix = overlaps
        .iter()
        .map(|overlap| {
            let mut row = vec![0.0; cols];
            for (&j, &common) in &overlap.hits {
                row[j] = match similarity {
                    Similarity::Entity => {
                        let r_size = response.chain_at(j).len();
                        2.0 * common as f64 / (overlap.size + r_size) as f64
                    }
                    Similarity::Mention => common as f64,
                };
            }
            row
        })
        .collect();
    Ok(matrix)
}

/// Optimal cluster alignment under `similarity`.
///
/// # Errors
///
/// See [`similarity_matrix`] and [`AssignmentSolver::solve`].
pub fn alignment(
    pair: &DocumentPair,
    similarity: Similarity,
    solver: &AssignmentSolver,
) -> Result<Assignment> {
    let matrix = similarity_matrix(pair, similarity)?;
    solver.solve(&matrix)
}

/// Raw φ4 CEAF counts: `total / #response chains`, `total / #key chains`.
///
/// # Errors
///
/// See [`alignment`].
pub fn entity_score_raw(pair: &DocumentPair, solver: &AssignmentSolver) -> Result<RawScore> {
    let total = alignment(pair, Similarity::Entity, solver)?.total;
    Ok(RawScore::new(
        total,
        pair.response.num_chains() as f64,
        total,
        pair.key.num_chains() as f64,
    ))
}

/// Raw φ3 CEAF counts: `total / #response mentions`, `total / #key mentions`.
///
/// # Errors
///
/// See [`alignment`].
pub fn mention_score_raw(pair: &DocumentPair, solver: &AssignmentSolver) -> Result<RawScore> {
    let total = alignment(pair, Similarity::Mention, solver)?.total;
    Ok(RawScore::new(
        total,
        pair.response.num_mentions() as f64,
        total,
        pair.key.num_mentions() as f64,
    ))
}

/// φ4 CEAF precision, recall and F1 with the default solver.
///
/// # Errors
///
/// See [`entity_score_raw`].
pub fn entity_score(pair: &DocumentPair) -> Result<CorefScores> {
    Ok(entity_score_raw(pair, &AssignmentSolver::new())?.to_scores())
}

/// φ3 CEAF precision, recall and F1 with the default solver.
///
/// # Errors
///
/// See [`mention_score_raw`].
pub fn mention_score(pair: &DocumentPair) -> Result<CorefScores> {
    Ok(mention_score_raw(pair, &AssignmentSolver::new())?.to_scores())
}
