//! Krippendorff's alpha over coreference partitions (Passonneau, 2004).
//!
//! The two partitions are treated as two coders assigning each mention to a
//! cluster. Clusters are unified into one inventory of units: a response
//! cluster whose members are exactly the twins of one key cluster's members
//! is the same unit as that key cluster. Every matched mention on either side
//! then adds one count for (own unit, twin's unit) to a symmetric
//! coincidence table.
//!
//! Distance between units `a` and `b` is 0 when they are the same unit,
//! `1 - 2·|a ∩ b| / (|a| + |b|)` when they overlap, and 1 when disjoint.

use std::collections::BTreeMap;

use coref_scorer_core::DocumentPair;

use super::chain_overlaps;
use crate::error::Result;

/// Alpha for one aligned document.
///
/// `alpha = 1 - (N - 1) · Σ o·δ / Σ n_c·n_k·δ`, where `N` is the number of
/// coincidence counts and `n_c` the unit marginals. A document with no
/// matched mentions scores 0; one with no observed disagreement scores 1.
///
/// # Errors
///
/// A core `ReferentialIntegrity` error for a dangling match entry.
pub fn score(pair: &DocumentPair) -> Result<f64> {
    let (key, response) = pair.recall_view();
    let key_overlaps = chain_overlaps(key, response)?;
    let response_overlaps = chain_overlaps(response, key)?;
    let num_key = key_overlaps.len();

    // Unit of each response chain; key chain i is unit i.
    let response_unit: Vec<usize> = response_overlaps
        .iter()
        .enumerate()
        .map(|(j, overlap)| {
            let identical = overlap.unmatched == 0
                && overlap.hits.len() == 1
                && overlap
                    .hits
                    .iter()
                    .all(|(&i, &count)| count == overlap.size && key_overlaps[i].size == count);
            match overlap.hits.keys().next() {
                Some(&i) if identical => i,
                _ => num_key + j,
            }
        })
        .collect();

    let mut sizes: Vec<usize> = key_overlaps.iter().map(|o| o.size).collect();
    sizes.extend(response_overlaps.iter().map(|o| o.size));

    // |a ∩ b| between a key unit and a response unit, through the match map
    let mut common: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    let mut coincidence: BTreeMap<(usize, usize), f64> = BTreeMap::new();

    for (i, overlap) in key_overlaps.iter().enumerate() {
        for (&j, &count) in &overlap.hits {
            let unit = response_unit[j];
            common.insert(ordered(i, unit), count);
            *coincidence.entry((i, unit)).or_default() += count as f64;
        }
    }
    for (j, overlap) in response_overlaps.iter().enumerate() {
        for (&i, &count) in &overlap.hits {
            *coincidence.entry((response_unit[j], i)).or_default() += count as f64;
        }
    }

    let total: f64 = coincidence.values().sum();
    if total == 0.0 {
        return Ok(0.0);
    }

    let distance = |a: usize, b: usize| -> f64 {
        if a == b {
            return 0.0;
        }
        match common.get(&ordered(a, b)) {
            Some(&shared) if shared > 0 => {
                1.0 - 2.0 * shared as f64 / (sizes[a] + sizes[b]) as f64
            }
            _ => 1.0,
        }
    };

    let observed: f64 = coincidence
        .iter()
        .map(|(&(a, b), &count)| count * distance(a, b))
        .sum();
    if observed == 0.0 {
        return Ok(1.0);
    }

    let mut marginals: BTreeMap<usize, f64> = BTreeMap::new();
    for (&(a, _), &count) in &coincidence {
        *marginals.entry(a).or_default() += count;
    }
    let mut expected = 0.0;
    for (&a, &n_a) in &marginals {
        for (&b, &n_b) in &marginals {
            expected += n_a * n_b * distance(a, b);
        }
    }
    if expected == 0.0 {
        return Ok(1.0);
    }

    Ok(1.0 - (total - 1.0) * observed / expected)
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
