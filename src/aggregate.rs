//! Corpus scoring: per-document reports combined by each metric's averaging.
//!
//! - **Micro** (MUC, B³, BLANC): raw numerators and denominators are summed
//!   across documents and divided once.
//! - **Macro** (CEAF, CEAF-m): per-document precision, recall and F1 are
//!   averaged.
//! - **Macro-single** (alpha): per-document scores are averaged.
//!
//! Documents are independent, so with the `parallel` feature they are scored
//! on the rayon pool; the per-document totals are combined with a single
//! associative sum either way.
//!
//! # Example
//!
//! ```rust
//! use coref_scorer::aggregate::CorpusScorer;
//! use coref_scorer::metrics::Metric;
//! use coref_scorer::{DocumentPair, MentionPartition, Role};
//!
//! let mut pair = DocumentPair::new(
//!     MentionPartition::from_chains(Role::Key, [vec![1, 2, 3], vec![4]]),
//!     MentionPartition::from_chains(Role::Response, [vec![1, 2], vec![3, 4]]),
//! );
//! pair.align_by_id();
//!
//! let scorer = CorpusScorer::new(vec![Metric::Muc, Metric::BCubed, Metric::Ceaf]);
//! let report = scorer.score_pairs(&[pair]).unwrap();
//! assert_eq!(report.documents, 1);
//! assert!(report.conll_f1.is_some());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use coref_scorer_core::DocumentPair;

use crate::align::{Aligner, AlignmentStats, AnnotatedDocument};
use crate::assignment::AssignmentSolver;
use crate::config::ScoringConfig;
use crate::error::Result;
use crate::metrics::{
    conll_f1, degenerate_warnings, Averaging, CorefScores, LinkCounts, Metric, MetricScore,
    RawScore, ScoreWarning,
};

/// What to do with a document that fails to score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Fail the whole run on the first bad document.
    Strict,
    /// Skip the document, log a warning and record it in the report.
    #[default]
    Lenient,
}

// =============================================================================
// Reports
// =============================================================================

/// Scores for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Document identifier, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// One entry per requested metric.
    pub scores: BTreeMap<Metric, MetricScore>,
    /// CoNLL F1, when MUC, B³ and CEAF were all requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conll_f1: Option<f64>,
    /// Degenerate-input conditions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScoreWarning>,
    /// Alignment statistics, when the document was aligned by span.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentStats>,
}

impl DocumentReport {
    /// One `metric P|R=F` (or `metric alpha=…`) line per metric.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<String> {
        self.scores
            .iter()
            .map(|(metric, score)| format!("{} {}", metric, score))
            .collect()
    }
}

/// A document left out of aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    /// Document identifier or `#<index>`.
    pub doc_id: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Corpus-level result for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// The metric.
    pub metric: Metric,
    /// How documents were combined.
    pub averaging: Averaging,
    /// Precision/recall/F1 (absent for alpha).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scores: Option<CorefScores>,
    /// Mean alpha (alpha only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

impl MetricSummary {
    /// The headline number: F1, or alpha.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.alpha
            .or_else(|| self.scores.map(|s| s.f1))
            .unwrap_or(0.0)
    }
}

/// Result of scoring a corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusReport {
    /// Documents that contributed to the averages.
    pub documents: usize,
    /// One summary per requested metric, in request order.
    pub metrics: Vec<MetricSummary>,
    /// CoNLL F1 over the corpus averages, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conll_f1: Option<f64>,
    /// Alignment statistics summed over documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<AlignmentStats>,
    /// Per-document reports (only when requested).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_document: Vec<DocumentReport>,
    /// Documents excluded under the lenient error policy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedDocument>,
}

impl CorpusReport {
    /// Summary for `metric`, if it was requested.
    #[must_use]
    pub fn get(&self, metric: Metric) -> Option<&MetricSummary> {
        self.metrics.iter().find(|s| s.metric == metric)
    }
}

impl std::fmt::Display for CorpusReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Coreference Scores ({} documents, {} skipped):",
            self.documents,
            self.skipped.len()
        )?;
        for summary in &self.metrics {
            match (summary.scores, summary.alpha) {
                (Some(s), _) => writeln!(
                    f,
                    "  {:<20} P={:>6.2}%  R={:>6.2}%  F1={:>6.2}%",
                    summary.metric.name(),
                    s.precision * 100.0,
                    s.recall * 100.0,
                    s.f1 * 100.0
                )?,
                (None, Some(alpha)) => {
                    writeln!(f, "  {:<20} alpha={:.4}", summary.metric.name(), alpha)?
                }
                (None, None) => {}
            }
        }
        if let Some(conll) = self.conll_f1 {
            writeln!(f, "  {:<20} F1={:>6.2}%", "conll", conll * 100.0)?;
        }
        Ok(())
    }
}

// =============================================================================
// Accumulation
// =============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct MetricTotals {
    raw: RawScore,
    links: LinkCounts,
    precision: f64,
    recall: f64,
    f1: f64,
    single: f64,
}

impl MetricTotals {
    fn merge(self, other: MetricTotals) -> MetricTotals {
        MetricTotals {
            raw: self.raw + other.raw,
            links: self.links + other.links,
            precision: self.precision + other.precision,
            recall: self.recall + other.recall,
            f1: self.f1 + other.f1,
            single: self.single + other.single,
        }
    }
}

/// Sum of per-document contributions; associative and commutative.
#[derive(Debug, Clone, Default)]
struct Totals {
    documents: usize,
    per_metric: BTreeMap<Metric, MetricTotals>,
    alignment: Option<AlignmentStats>,
}

impl Totals {
    fn from_report(report: &DocumentReport) -> Self {
        let per_metric = report
            .scores
            .iter()
            .map(|(&metric, score)| {
                let mut totals = MetricTotals::default();
                match score {
                    MetricScore::Raw(raw) => totals.raw = *raw,
                    MetricScore::Links(links) => totals.links = *links,
                    MetricScore::Alpha(alpha) => totals.single = *alpha,
                }
                if let Some(s) = score.scores() {
                    totals.precision = s.precision;
                    totals.recall = s.recall;
                    totals.f1 = s.f1;
                }
                (metric, totals)
            })
            .collect();
        Self {
            documents: 1,
            per_metric,
            alignment: report.alignment.clone(),
        }
    }

    fn merge(mut self, other: Totals) -> Totals {
        self.documents += other.documents;
        for (metric, totals) in other.per_metric {
            let entry = self.per_metric.entry(metric).or_default();
            *entry = entry.merge(totals);
        }
        self.alignment = match (self.alignment, other.alignment) {
            (Some(mut a), Some(b)) => {
                a.merge(&b);
                Some(a)
            }
            (a, b) => a.or(b),
        };
        self
    }

    fn summary(&self, metric: Metric) -> MetricSummary {
        let totals = self.per_metric.get(&metric).copied().unwrap_or_default();
        let n = self.documents.max(1) as f64;
        let averaging = metric.averaging();
        let (scores, alpha) = match averaging {
            Averaging::Micro if metric == Metric::Blanc => (Some(totals.links.to_scores()), None),
            Averaging::Micro => (Some(totals.raw.to_scores()), None),
            Averaging::Macro => (
                Some(CorefScores {
                    precision: totals.precision / n,
                    recall: totals.recall / n,
                    f1: totals.f1 / n,
                }),
                None,
            ),
            Averaging::MacroSingle => (None, Some(totals.single / n)),
        };
        MetricSummary {
            metric,
            averaging,
            scores,
            alpha,
        }
    }
}

// =============================================================================
// Scorer
// =============================================================================

/// Scores documents and combines them into a [`CorpusReport`].
#[derive(Debug, Clone)]
pub struct CorpusScorer {
    metrics: Vec<Metric>,
    solver: AssignmentSolver,
    error_policy: ErrorPolicy,
    per_document: bool,
}

impl CorpusScorer {
    /// Create a scorer for `metrics` with lenient error handling.
    #[must_use]
    pub fn new(metrics: Vec<Metric>) -> Self {
        Self {
            metrics,
            solver: AssignmentSolver::new(),
            error_policy: ErrorPolicy::default(),
            per_document: false,
        }
    }

    /// Create a scorer from a configuration.
    #[must_use]
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            metrics: config.metrics.clone(),
            solver: AssignmentSolver::new().with_max_dim(config.max_assignment_dim),
            error_policy: config.error_policy,
            per_document: config.per_document,
        }
    }

    /// Set the error policy.
    #[must_use]
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Keep per-document reports in the corpus report.
    #[must_use]
    pub fn with_per_document(mut self, per_document: bool) -> Self {
        self.per_document = per_document;
        self
    }

    /// Use a specific assignment solver for CEAF.
    #[must_use]
    pub fn with_solver(mut self, solver: AssignmentSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Requested metrics.
    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Score one aligned document.
    ///
    /// Match entries are validated first; a dangling entry fails the
    /// document before any metric runs.
    ///
    /// # Errors
    ///
    /// - a core `ReferentialIntegrity` error for a dangling match entry
    /// - [`Error::Evaluation`](crate::Error::Evaluation) if a CEAF assignment exceeds the solver cap
    pub fn score_document(&self, pair: &DocumentPair) -> Result<DocumentReport> {
        pair.validate()?;

        let warnings = degenerate_warnings(pair);
        for warning in &warnings {
            log::warn!("{}: {}", pair.doc_id().unwrap_or("<unnamed>"), warning);
        }

        let mut scores = BTreeMap::new();
        for &metric in &self.metrics {
            scores.insert(metric, metric.evaluate(pair, &self.solver)?);
        }
        let conll = conll_of(|m| scores.get(&m).and_then(MetricScore::scores));

        Ok(DocumentReport {
            doc_id: pair.doc_id().map(str::to_string),
            scores,
            conll_f1: conll,
            warnings,
            alignment: None,
        })
    }

    /// Score already aligned documents.
    ///
    /// # Errors
    ///
    /// Under [`ErrorPolicy::Strict`], the first failing document's error,
    /// wrapped as [`Error::Document`](crate::Error::Document). Lenient runs only fail on errors that
    /// are not tied to a document.
    pub fn score_pairs(&self, pairs: &[DocumentPair]) -> Result<CorpusReport> {
        self.score_each(pairs, |pair| pair.doc_id().map(str::to_string), |pair| {
            self.score_document(pair)
        })
    }

    /// Align each document with `aligner`, then score it.
    ///
    /// # Errors
    ///
    /// See [`score_pairs`](Self::score_pairs).
    pub fn align_and_score(
        &self,
        aligner: &Aligner,
        documents: &[AnnotatedDocument],
    ) -> Result<CorpusReport> {
        self.score_each(documents, |doc| doc.doc_id.clone(), |doc| {
            let (pair, stats) = aligner.align_document(doc)?;
            let mut report = self.score_document(&pair)?;
            report.alignment = Some(stats);
            Ok(report)
        })
    }

    /// Score arbitrary per-document inputs with `score`, applying the error
    /// policy and combining the results.
    ///
    /// `label` names an input for skip records and error messages; inputs it
    /// returns `None` for are named `#<index>`.
    ///
    /// # Errors
    ///
    /// See [`score_pairs`](Self::score_pairs).
    pub fn score_each<T, L, F>(&self, items: &[T], label: L, score: F) -> Result<CorpusReport>
    where
        T: Sync,
        L: Fn(&T) -> Option<String>,
        F: Fn(&T) -> Result<DocumentReport> + Sync,
    {
        let outcomes = map_documents(items, &score);

        let mut reports = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for (idx, (item, outcome)) in items.iter().zip(outcomes).enumerate() {
            match outcome {
                Ok(report) => reports.push(report),
                Err(err) => {
                    let doc_id = label(item).unwrap_or_else(|| format!("#{}", idx));
                    match self.error_policy {
                        ErrorPolicy::Strict => return Err(err.in_document(doc_id)),
                        ErrorPolicy::Lenient => {
                            log::warn!("skipping document {}: {}", doc_id, err);
                            skipped.push(SkippedDocument {
                                doc_id,
                                reason: err.to_string(),
                            });
                        }
                    }
                }
            }
        }

        let totals = sum_reports(&reports);
        let metrics: Vec<MetricSummary> = self.metrics.iter().map(|&m| totals.summary(m)).collect();
        let conll = conll_of(|m| {
            metrics
                .iter()
                .find(|s| s.metric == m)
                .and_then(|s| s.scores)
        });

        log::info!(
            "scored {} documents ({} skipped) with {} metrics",
            totals.documents,
            skipped.len(),
            metrics.len()
        );

        Ok(CorpusReport {
            documents: totals.documents,
            metrics,
            conll_f1: conll,
            alignment: totals.alignment,
            per_document: if self.per_document { reports } else { Vec::new() },
            skipped,
        })
    }
}

impl Default for CorpusScorer {
    fn default() -> Self {
        Self::new(Metric::CONLL.to_vec())
    }
}

fn conll_of(lookup: impl Fn(Metric) -> Option<CorefScores>) -> Option<f64> {
    let muc = lookup(Metric::Muc)?;
    let b_cubed = lookup(Metric::BCubed)?;
    let ceaf = lookup(Metric::Ceaf)?;
    Some(conll_f1(&muc, &b_cubed, &ceaf))
}

#[cfg(feature = "parallel")]
fn map_documents<T, F>(items: &[T], score: &F) -> Vec<Result<DocumentReport>>
where
    T: Sync,
    F: Fn(&T) -> Result<DocumentReport> + Sync,
{
    use rayon::prelude::*;
    items.par_iter().map(score).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_documents<T, F>(items: &[T], score: &F) -> Vec<Result<DocumentReport>>
where
    T: Sync,
    F: Fn(&T) -> Result<DocumentReport> + Sync,
{
    items.iter().map(score).collect()
}

#[cfg(feature = "parallel")]
fn sum_reports(reports: &[DocumentReport]) -> Totals {
    use rayon::prelude::*;
    reports
        .par_iter()
        .map(Totals::from_report)
        .reduce(Totals::default, Totals::merge)
}

#[cfg(not(feature = "parallel"))]
fn sum_reports(reports: &[DocumentReport]) -> Totals {
    reports
        .iter()
        .map(Totals::from_report)
        .fold(Totals::default(), Totals::merge)
}

// =============================================================================
// Tests
// =============================================================================
