//! Hand-computed metric values for small documents.
//!
//! Most tests use the running example: key `{1,2,3} {4}` against response
//! `{1,2} {3,4}`, with key and response sharing mention IDs.

use coref_scorer::aggregate::{CorpusScorer, ErrorPolicy};
use coref_scorer::assignment::AssignmentSolver;
use coref_scorer::metrics::{alpha, b_cubed, blanc, ceaf, conll_f1, muc, Metric, MetricScore};
use coref_scorer::{DocumentPair, Error, MentionPartition, Role};

const EPS: f64 = 1e-9;

fn aligned(key: Vec<Vec<i64>>, response: Vec<Vec<i64>>) -> DocumentPair {
    let mut pair = DocumentPair::new(
        MentionPartition::from_chains(Role::Key, key),
        MentionPartition::from_chains(Role::Response, response),
    );
    pair.align_by_id();
    pair
}

fn running_example() -> DocumentPair {
    aligned(vec![vec![1, 2, 3], vec![4]], vec![vec![1, 2], vec![3, 4]])
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {}, got {}",
        expected,
        actual
    );
}

// =============================================================================
// Per-metric values
// =============================================================================

#[test]
fn test_muc_running_example() {
    let raw = muc::score_raw(&running_example()).unwrap();
    // key {1,2,3} spans two response chains: 3 - 2 links kept out of 2
    assert_eq!(raw.numerator.recall, 1.0);
    assert_eq!(raw.denominator.recall, 2.0);
    // response {1,2} keeps its link, {3,4} loses it
    assert_eq!(raw.numerator.precision, 1.0);
    assert_eq!(raw.denominator.precision, 2.0);

    let scores = raw.to_scores();
    assert_close(scores.f1, 0.5);
}

#[test]
fn test_muc_whole_chain_in_one_cluster() {
    let raw = muc::score_raw(&aligned(vec![vec![1, 2, 3]], vec![vec![1, 2, 3]])).unwrap();
    assert_eq!(raw.numerator.recall, raw.denominator.recall);
    assert_eq!(raw.denominator.recall, 2.0);
}

#[test]
fn test_b_cubed_running_example() {
    let scores = b_cubed::score(&running_example()).unwrap();
    // per key mention: 2/3, 2/3, 1/3, 1/1
    assert_close(scores.recall, (2.0 / 3.0 + 2.0 / 3.0 + 1.0 / 3.0 + 1.0) / 4.0);
    // per response mention: 1, 1, 1/2, 1/2
    assert_close(scores.precision, 0.75);
}

#[test]
fn test_b_cubed_unmatched_mentions() {
    // key mention 3 and response mention 9 have no twin
    let pair = aligned(vec![vec![1, 2, 3]], vec![vec![1, 2, 9]]);

    let standard = b_cubed::score(&pair).unwrap();
    assert_close(standard.recall, 5.0 / 9.0);
    assert_close(standard.precision, 5.0 / 9.0);

    let twins = b_cubed::twins_only_score(&pair).unwrap();
    assert_close(twins.recall, 4.0 / 9.0);
    assert_close(twins.precision, 2.0 / 3.0);
}

#[test]
fn test_ceaf_running_example() {
    let pair = running_example();
    let matrix = ceaf::similarity_matrix(&pair, ceaf::Similarity::Entity).unwrap();
    assert_close(matrix[0][0], 0.8);
    assert_close(matrix[0][1], 0.4);
    assert_close(matrix[1][0], 0.0);
    assert_close(matrix[1][1], 2.0 / 3.0);

    let scores = ceaf::entity_score(&pair).unwrap();
    assert_close(scores.recall, (0.8 + 2.0 / 3.0) / 2.0);
    assert_close(scores.precision, (0.8 + 2.0 / 3.0) / 2.0);

    // φ3: counts 2 and 1 on the optimal diagonal, over 4 mentions a side
    let mention = ceaf::mention_score(&pair).unwrap();
    assert_close(mention.recall, 0.75);
    assert_close(mention.precision, 0.75);
}

#[test]
fn test_blanc_running_example() {
    let counts = blanc::link_counts(&running_example()).unwrap();
    assert_eq!(counts.coref_right, 1);
    assert_eq!(counts.coref_wrong, 1);
    assert_eq!(counts.non_coref_wrong, 2);
    assert_eq!(counts.non_coref_right, 2);
    assert_eq!(counts.total(), 6);

    let scores = counts.to_scores();
    assert_close(scores.precision, 0.5);
    assert_close(scores.recall, 0.5);
    assert_close(scores.f1, (0.4 + 4.0 / 7.0) / 2.0);
}

#[test]
fn test_alpha_running_example() {
    assert_close(alpha::score(&running_example()).unwrap(), 11.0 / 31.0);
}

#[test]
fn test_conll_running_example() {
    let pair = running_example();
    let muc = muc::score(&pair).unwrap();
    let b3 = b_cubed::score(&pair).unwrap();
    let ceaf = ceaf::entity_score(&pair).unwrap();
    let expected = (muc.f1 + b3.f1 + ceaf.f1) / 3.0;
    assert_close(conll_f1(&muc, &b3, &ceaf), expected);
}

#[test]
fn test_metric_evaluate_matches_engines() {
    let pair = running_example();
    let solver = AssignmentSolver::new();
    match Metric::Muc.evaluate(&pair, &solver).unwrap() {
        MetricScore::Raw(raw) => assert_eq!(raw, muc::score_raw(&pair).unwrap()),
        other => panic!("unexpected {:?}", other),
    }
    match Metric::KrippendorffAlpha.evaluate(&pair, &solver).unwrap() {
        MetricScore::Alpha(value) => assert_close(value, 11.0 / 31.0),
        other => panic!("unexpected {:?}", other),
    }
}

// =============================================================================
// Degenerate documents
// =============================================================================

#[test]
fn test_all_singletons_muc_is_zero() {
    let pair = aligned(vec![vec![1], vec![2]], vec![vec![1], vec![2]]);
    let scores = muc::score(&pair).unwrap();
    assert_eq!(scores.recall, 0.0);
    assert_eq!(scores.precision, 0.0);
    assert_eq!(scores.f1, 0.0);
    // B³ still rewards the singletons
    assert_close(b_cubed::score(&pair).unwrap().f1, 1.0);
}

#[test]
fn test_empty_document_scores_zero() {
    let pair = aligned(vec![], vec![]);
    for metric in Metric::ALL {
        let score = metric.evaluate(&pair, &AssignmentSolver::new()).unwrap();
        assert_eq!(score.value(), 0.0, "{}", metric);
    }
}

#[test]
fn test_dangling_match_is_referential_integrity_error() {
    let mut pair = aligned(vec![vec![1, 2]], vec![vec![1, 2]]);
    pair.key.set_match(2, 99).unwrap();
    let err = muc::score(&pair).unwrap_err();
    assert!(err.is_referential_integrity(), "{}", err);
}

// =============================================================================
// Corpus aggregation
// =============================================================================

fn corpus() -> Vec<DocumentPair> {
    vec![
        aligned(vec![vec![1, 2]], vec![vec![1, 2]]).with_doc_id("same"),
        running_example().with_doc_id("split"),
    ]
}

#[test]
fn test_micro_average_sums_counts() {
    let report = CorpusScorer::new(vec![Metric::Muc])
        .score_pairs(&corpus())
        .unwrap();
    let muc = report.get(Metric::Muc).unwrap().scores.unwrap();
    // (1 + 1) / (1 + 2) on both sides
    assert_close(muc.recall, 2.0 / 3.0);
    assert_close(muc.precision, 2.0 / 3.0);
}

#[test]
fn test_macro_average_means_documents() {
    let report = CorpusScorer::new(vec![Metric::Ceaf, Metric::KrippendorffAlpha])
        .score_pairs(&corpus())
        .unwrap();
    let ceaf = report.get(Metric::Ceaf).unwrap().scores.unwrap();
    let split_f = (0.8 + 2.0 / 3.0) / 2.0;
    assert_close(ceaf.f1, (1.0 + split_f) / 2.0);

    let alpha = report.get(Metric::KrippendorffAlpha).unwrap().alpha.unwrap();
    assert_close(alpha, (1.0 + 11.0 / 31.0) / 2.0);
}

#[test]
fn test_conll_reported_only_with_all_three() {
    let with = CorpusScorer::default().score_pairs(&corpus()).unwrap();
    assert!(with.conll_f1.is_some());
    let without = CorpusScorer::new(vec![Metric::Muc, Metric::BCubed])
        .score_pairs(&corpus())
        .unwrap();
    assert!(without.conll_f1.is_none());
}

#[test]
fn test_error_policies() {
    let mut broken = running_example().with_doc_id("broken");
    broken.response.set_match(1, 42).unwrap();
    let docs = vec![running_example().with_doc_id("ok"), broken];

    let lenient = CorpusScorer::new(vec![Metric::BCubed])
        .score_pairs(&docs)
        .unwrap();
    assert_eq!(lenient.documents, 1);
    assert_eq!(lenient.skipped.len(), 1);
    assert_eq!(lenient.skipped[0].doc_id, "broken");

    let strict = CorpusScorer::new(vec![Metric::BCubed])
        .with_error_policy(ErrorPolicy::Strict)
        .score_pairs(&docs)
        .unwrap_err();
    match &strict {
        Error::Document { doc_id, .. } => assert_eq!(doc_id, "broken"),
        other => panic!("unexpected {:?}", other),
    }
    assert!(strict.is_referential_integrity());
}
