//! Mention alignment: populating the match maps of a [`DocumentPair`].
//!
//! Key and response mentions are numbered independently, so before any
//! metric can run we must decide which response mention (if any) stands for
//! which gold mention. The [`Aligner`] walks response mentions in span order
//! and, for each one, tests the overlapping gold mentions in span order under
//! a [`MatchPolicy`]. The first candidate that satisfies the policy wins.
//!
//! # Double matches
//!
//! When two response mentions claim the same gold mention, the longer one
//! keeps it, unless exactly one of them contains the token "and" (a list
//! conjunction), in which case the one without it is kept. The loser stays
//! unmatched; it is not retried against other gold mentions.
//!
//! # Example
//!
//! ```rust
//! use coref_scorer::align::{Aligner, AnnotatedDocument, GoldMention, MatchPolicy, ResponseMention};
//!
//! let doc = AnnotatedDocument::new("The senator said she would run.")
//!     .with_gold(GoldMention::new(1, (0, 11), 1))
//!     .with_gold(GoldMention::new(2, (17, 20), 1))
//!     .with_response(ResponseMention::new(7, (4, 11), 3))
//!     .with_response(ResponseMention::new(8, (17, 20), 3));
//!
//! let (pair, stats) = Aligner::new(MatchPolicy::Muc).align_document(&doc).unwrap();
//! assert_eq!(stats.matched, 2);
//! assert_eq!(pair.key.get_match(1), Some(7));
//! assert_eq!(pair.response.get_match(7), Some(1));
//! ```

pub mod mention;
pub mod policy;

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use coref_scorer_core::{DocumentPair, MentionId};

use crate::error::Result;

pub use mention::{AnnotatedDocument, GoldMention, ResponseMention};
pub use policy::{decide, Decision, MatchPolicy, MatchRule};

/// Per-call alignment statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentStats {
    /// Response mentions considered.
    pub response_mentions: usize,
    /// Gold mentions available.
    pub gold_mentions: usize,
    /// Links recorded.
    pub matched: usize,
    /// Times a second response mention claimed an already matched gold mention.
    pub double_matches: usize,
    /// Head matches vetoed by the conjunction exception.
    pub conjunction_rejections: usize,
    /// Links per rule.
    pub rules: BTreeMap<MatchRule, usize>,
}

impl AlignmentStats {
    /// Response mentions left without a twin.
    #[must_use]
    pub fn unmatched_response(&self) -> usize {
        self.response_mentions.saturating_sub(self.matched)
    }

    /// Gold mentions left without a twin.
    #[must_use]
    pub fn unmatched_gold(&self) -> usize {
        self.gold_mentions.saturating_sub(self.matched)
    }

    /// Fold another document's statistics into this one.
    pub fn merge(&mut self, other: &AlignmentStats) {
        self.response_mentions += other.response_mentions;
        self.gold_mentions += other.gold_mentions;
        self.matched += other.matched;
        self.double_matches += other.double_matches;
        self.conjunction_rejections += other.conjunction_rejections;
        for (rule, count) in &other.rules {
            *self.rules.entry(*rule).or_default() += count;
        }
    }
}

impl std::fmt::Display for AlignmentStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "matched {}/{} response ({} gold unmatched), {} double matches, {} conjunction rejections",
            self.matched,
            self.response_mentions,
            self.unmatched_gold(),
            self.double_matches,
            self.conjunction_rejections
        )
    }
}

/// Aligns response mentions to gold mentions under one policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aligner {
    policy: MatchPolicy,
}

impl Aligner {
    /// Create an aligner for `policy`.
    #[must_use]
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    /// The policy in use.
    #[must_use]
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Build the document's partitions and align them.
    ///
    /// # Errors
    ///
    /// See [`align`](Self::align).
    pub fn align_document(&self, doc: &AnnotatedDocument) -> Result<(DocumentPair, AlignmentStats)> {
        let mut pair = doc.to_pair();
        let stats = self.align(doc, &mut pair)?;
        Ok((pair, stats))
    }

    /// Populate both match maps of `pair` from `doc`'s mention sets.
    ///
    /// Existing match entries are cleared first.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`](crate::Error::InvalidInput) if a span does not
    ///   slice the document text (span-based policies only)
    /// - a core `UnknownMention` error if `pair` was not built from `doc`
    pub fn align(&self, doc: &AnnotatedDocument, pair: &mut DocumentPair) -> Result<AlignmentStats> {
        if self.policy.requires_overlap() {
            doc.validate_spans()?;
        }
        pair.key.clear_matches();
        pair.response.clear_matches();

        // First occurrence of an ID wins, as in the partitions built from `doc`
        let mut gold = first_by_id(&doc.gold, |m: &GoldMention| m.id);
        gold.sort_by_key(|m| (m.span.start, m.span.end, m.id));
        let mut responses = first_by_id(&doc.response, |m: &ResponseMention| m.id);
        responses.sort_by_key(|m| (m.span.start, m.span.end, m.id));

        let duplicates = (doc.gold.len() - gold.len()) + (doc.response.len() - responses.len());
        if duplicates > 0 {
            log::warn!(
                "{}: {} mentions with a repeated ID ignored",
                doc.doc_id.as_deref().unwrap_or("<unnamed>"),
                duplicates
            );
        }

        let mut stats = AlignmentStats {
            response_mentions: responses.len(),
            gold_mentions: gold.len(),
            ..AlignmentStats::default()
        };

        // gold id -> (index into `responses`, rule)
        let mut claims: HashMap<MentionId, (usize, MatchRule)> = HashMap::new();

        for (ri, response) in responses.iter().enumerate() {
            let mut found = None;
            for candidate in &gold {
                if self.policy.requires_overlap() && !candidate.span.overlaps(&response.span) {
                    continue;
                }
                match decide(self.policy, &doc.text, response, candidate) {
                    Decision::Match(rule) => {
                        found = Some((candidate.id, rule));
                        break;
                    }
                    Decision::ConjunctionRejected => stats.conjunction_rejections += 1,
                    Decision::NoMatch => {}
                }
            }

            let Some((gold_id, rule)) = found else {
                continue;
            };

            match claims.get(&gold_id) {
                None => {
                    claims.insert(gold_id, (ri, rule));
                }
                Some(&(incumbent, _)) => {
                    stats.double_matches += 1;
                    let challenger_wins = prefer_challenger(&doc.text, response, responses[incumbent]);
                    let (winner, loser) = if challenger_wins {
                        claims.insert(gold_id, (ri, rule));
                        (response.id, responses[incumbent].id)
                    } else {
                        (responses[incumbent].id, response.id)
                    };
                    log::debug!(
                        "{}: gold mention {} claimed twice; keeping response {}, dropping {}",
                        doc.doc_id.as_deref().unwrap_or("<unnamed>"),
                        gold_id,
                        winner,
                        loser
                    );
                }
            }
        }

        let mut links: Vec<(MentionId, usize, MatchRule)> = claims
            .into_iter()
            .map(|(gold_id, (ri, rule))| (gold_id, ri, rule))
            .collect();
        links.sort_unstable_by_key(|&(gold_id, ..)| gold_id);

        for (gold_id, ri, rule) in links {
            pair.link(gold_id, responses[ri].id)?;
            stats.matched += 1;
            *stats.rules.entry(rule).or_default() += 1;
        }

        log::debug!(
            "{}: {} policy {}",
            doc.doc_id.as_deref().unwrap_or("<unnamed>"),
            self.policy,
            stats
        );
        Ok(stats)
    }
}

/// Mentions in input order, dropping any whose ID was already seen.
fn first_by_id<T>(mentions: &[T], id: impl Fn(&T) -> MentionId) -> Vec<&T> {
    let mut seen = HashSet::new();
    mentions.iter().filter(|m| seen.insert(id(*m))).collect()
}

/// Double-match tie-break: should `challenger` replace `incumbent`?
fn prefer_challenger(text: &str, challenger: &ResponseMention, incumbent: &ResponseMention) -> bool {
    let has_and = |m: &ResponseMention| {
        m.span
            .slice(text)
            .is_some_and(policy::contains_conjunction)
    };
    let (challenger_and, incumbent_and) = (has_and(challenger), has_and(incumbent));
    if challenger_and != incumbent_and {
        return !challenger_and;
    }
    challenger.span.len() > incumbent.span.len()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_the_recorded_both_ways() {
        let text = "The committee approved the plan.";
        for policy in [MatchPolicy::Muc, MatchPolicy::Ace] {
            let doc = AnnotatedDocument::new(text)
                .with_gold(GoldMention::new(1, (0, 13), 1))
                .with_response(ResponseMention::new(40, (4, 13), 9));
            let (pair, stats) = Aligner::new(policy).align_document(&doc).unwrap();
            assert_eq!(stats.matched, 1, "{policy}");
            assert_eq!(pair.key.get_match(1), Some(40));
            assert_eq!(pair.response.get_match(40), Some(1));
            assert_eq!(stats.rules.get(&MatchRule::Modifiers), Some(&1));
        }
    }

    #[test]
    fn test_non_overlapping_never_match() {
        // identical strings at different offsets
        let text = "the plan and the plan";
        let doc = AnnotatedDocument::new(text)
            .with_gold(GoldMention::new(1, (0, 8), 1))
            .with_response(ResponseMention::new(2, (13, 21), 1));
        for policy in [MatchPolicy::Muc, MatchPolicy::Ace, MatchPolicy::Uw] {
            let (pair, stats) = Aligner::new(policy).align_document(&doc).unwrap();
            assert_eq!(stats.matched, 0);
            assert!(!pair.key.is_matched(1));
        }
    }

    #[test]
    fn test_double_match_keeps_longer() {
        let text = "the big red barn";
        // gold "red barn"; both responses cover it
        let doc = AnnotatedDocument::new(text)
            .with_gold(GoldMention::new(1, (8, 16), 1))
            .with_response(ResponseMention::new(10, (4, 16), 1))
            .with_response(ResponseMention::new(11, (0, 16), 2));
        let (pair, stats) = Aligner::new(MatchPolicy::Muc).align_document(&doc).unwrap();
        assert_eq!(stats.double_matches, 1);
        assert_eq!(stats.matched, 1);
        assert_eq!(pair.key.get_match(1), Some(11));
        assert!(!pair.response.is_matched(10));
    }

    #[test]
    fn test_double_match_prefers_no_conjunction() {
        let text = "cats and the dogs";
        // gold "the dogs"; the longer response is a coordination
        let doc = AnnotatedDocument::new(text)
            .with_gold(GoldMention::new(1, (9, 17), 1))
            .with_response(ResponseMention::new(10, (0, 17), 1))
            .with_response(ResponseMention::new(11, (9, 17), 2));
        let (pair, stats) = Aligner::new(MatchPolicy::Muc).align_document(&doc).unwrap();
        assert_eq!(stats.double_matches, 1);
        assert_eq!(pair.key.get_match(1), Some(11));
        assert!(!pair.response.is_matched(10));
    }

    #[test]
    fn test_loser_not_retried() {
        let text = "the big red barn";
        // response 11 would also cover gold 2, but it is consumed by gold 1 first
        let doc = AnnotatedDocument::new(text)
            .with_gold(GoldMention::new(1, (0, 16), 1))
            .with_gold(GoldMention::new(2, (8, 16), 2))
            .with_response(ResponseMention::new(10, (0, 16), 1))
            .with_response(ResponseMention::new(11, (0, 16), 2));
        let (pair, stats) = Aligner::new(MatchPolicy::Muc).align_document(&doc).unwrap();
        assert_eq!(stats.double_matches, 1);
        assert_eq!(pair.key.get_match(1), Some(10));
        assert!(!pair.key.is_matched(2));
        assert!(!pair.response.is_matched(11));
    }

    #[test]
    fn test_first_success_wins() {
        let text = "the big red barn";
        // response covers both; gold 1 comes first in span order
        let doc = AnnotatedDocument::new(text)
            .with_gold(GoldMention::new(2, (8, 16), 2))
            .with_gold(GoldMention::new(1, (4, 16), 1))
            .with_response(ResponseMention::new(10, (0, 16), 1));
        let (pair, _) = Aligner::new(MatchPolicy::Muc).align_document(&doc).unwrap();
        assert_eq!(pair.response.get_match(10), Some(1));
        assert!(!pair.key.is_matched(2));
    }

    #[test]
    fn test_conjunction_rejection_counted() {
        let text = "John and Mary left";
        let doc = AnnotatedDocument::new(text)
            .with_gold(GoldMention::new(1, (0, 4), 1).with_head((0, 4)))
            .with_gold(GoldMention::new(2, (9, 13), 2).with_head((9, 13)))
            .with_response(ResponseMention::new(10, (0, 18), 1));
        let (pair, stats) = Aligner::new(MatchPolicy::Ace).align_document(&doc).unwrap();
        // head "John" precedes the conjunction and is accepted first
        assert_eq!(pair.response.get_match(10), Some(1));
        assert_eq!(stats.conjunction_rejections, 0);

        let doc = AnnotatedDocument::new(text)
            .with_gold(GoldMention::new(2, (9, 13), 2).with_head((9, 13)))
            .with_response(ResponseMention::new(10, (0, 18), 1));
        let (pair, stats) = Aligner::new(MatchPolicy::Ace).align_document(&doc).unwrap();
        assert!(!pair.response.is_matched(10));
        assert_eq!(stats.conjunction_rejections, 1);
    }

    #[test]
    fn test_exact_policy_needs_no_text() {
        let doc = AnnotatedDocument::new("")
            .with_gold(GoldMention::new(1, (0, 0), 1))
            .with_gold(GoldMention::new(2, (0, 0), 1))
            .with_response(ResponseMention::new(2, (0, 0), 5))
            .with_response(ResponseMention::new(3, (0, 0), 5));
        let (pair, stats) = Aligner::new(MatchPolicy::Exact).align_document(&doc).unwrap();
        assert_eq!(stats.matched, 1);
        assert_eq!(pair.key.get_match(2), Some(2));
        assert_eq!(stats.rules.get(&MatchRule::SameId), Some(&1));
    }

    #[test]
    fn test_bad_span_is_rejected() {
        let doc = AnnotatedDocument::new("tiny")
            .with_gold(GoldMention::new(1, (0, 4), 1))
            .with_response(ResponseMention::new(1, (2, 12), 1));
        assert!(Aligner::new(MatchPolicy::Muc).align_document(&doc).is_err());
    }

    #[test]
    fn test_stats_merge() {
        let mut a = AlignmentStats {
            response_mentions: 3,
            gold_mentions: 4,
            matched: 2,
            ..Default::default()
        };
        a.rules.insert(MatchRule::Head, 2);
        let mut b = a.clone();
        b.double_matches = 1;
        a.merge(&b);
        assert_eq!(a.matched, 4);
        assert_eq!(a.double_matches, 1);
        assert_eq!(a.rules[&MatchRule::Head], 4);
        assert_eq!(a.unmatched_gold(), 4);
    }

    #[test]
    fn test_repeated_response_id_links_once() {
        // response 5 is listed twice; only its first entry takes part
        let doc = AnnotatedDocument::new("Anna met Bert.")
            .with_gold(GoldMention::new(1, (0, 4), 1))
            .with_gold(GoldMention::new(2, (9, 13), 2))
            .with_response(ResponseMention::new(5, (0, 4), 7))
            .with_response(ResponseMention::new(5, (9, 13), 8));
        let (pair, stats) = Aligner::new(MatchPolicy::Muc).align_document(&doc).unwrap();

        assert_eq!(stats.response_mentions, 1);
        assert_eq!(stats.matched, 1);
        assert_eq!(pair.key.get_match(1), Some(5));
        assert!(!pair.key.is_matched(2));
        assert_eq!(pair.response.get_match(5), Some(1));
        assert_eq!(pair.key.num_matched(), pair.response.num_matched());
        pair.validate().unwrap();

        // key {1} {2} vs response {5}: B³ recall credits 1 as right, 2 as a singleton
        let b3 = crate::metrics::b_cubed::score(&pair).unwrap();
        assert!((b3.precision - 1.0).abs() < 1e-9);
        assert!((b3.recall - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_gold_id_keeps_first() {
        let doc = AnnotatedDocument::new("Anna met Bert.")
            .with_gold(GoldMention::new(1, (0, 4), 1))
            .with_gold(GoldMention::new(1, (9, 13), 2))
            .with_response(ResponseMention::new(5, (0, 4), 7))
            .with_response(ResponseMention::new(6, (9, 13), 7));
        let (pair, stats) = Aligner::new(MatchPolicy::Muc).align_document(&doc).unwrap();

        assert_eq!(stats.gold_mentions, 1);
        assert_eq!(stats.matched, 1);
        assert_eq!(pair.key.get_match(1), Some(5));
        assert!(!pair.response.is_matched(6));
        pair.validate().unwrap();
    }
}
