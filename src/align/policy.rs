//! Matching policies: when does a response mention correspond to a gold one?
//!
//! Each corpus convention is a variant of the closed [`MatchPolicy`] enum and
//! is decided by the pure function [`decide`]. The aligner only ever asks
//! about overlapping candidates (except for [`MatchPolicy::Exact`], which
//! works on IDs alone).
//!
//! | Policy | Rules, in order |
//! |--------|-----------------|
//! | `Exact` | same ID |
//! | `Muc` | equal spans, response covers gold, gold MIN string inside response, modifiers only |
//! | `Ace` | equal spans, modifiers only, head offsets (with the conjunction exception) |
//! | `Uw` | `Ace`, then MIN sub-span inside response inside gold |

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::mention::{GoldMention, ResponseMention};
use crate::error::Error;
use coref_scorer_core::Span;

/// Determiners that may precede an otherwise identical mention.
const PREMODIFIERS: [&str; 3] = ["A", "AN", "THE"];

/// Punctuation that may trail an otherwise identical mention.
const POSTMODIFIERS: [char; 4] = [';', '\'', ',', '.'];

/// Matching convention used to align response mentions with gold mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum MatchPolicy {
    /// Key and response share a canonical mention set; IDs line up 1:1.
    Exact,
    /// MUC-6/7 style span and MIN-string matching.
    #[default]
    Muc,
    /// ACE style span and head matching.
    Ace,
    /// ACE rules plus the separately encoded minimal sub-span.
    Uw,
}

impl MatchPolicy {
    /// All policies.
    pub const ALL: [MatchPolicy; 4] = [
        MatchPolicy::Exact,
        MatchPolicy::Muc,
        MatchPolicy::Ace,
        MatchPolicy::Uw,
    ];

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MatchPolicy::Exact => "exact",
            MatchPolicy::Muc => "muc",
            MatchPolicy::Ace => "ace",
            MatchPolicy::Uw => "uw",
        }
    }

    /// Whether candidates must overlap the response span.
    #[must_use]
    pub fn requires_overlap(self) -> bool {
        !matches!(self, MatchPolicy::Exact)
    }
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" | "id" => Ok(MatchPolicy::Exact),
            "muc" => Ok(MatchPolicy::Muc),
            "ace" => Ok(MatchPolicy::Ace),
            "uw" => Ok(MatchPolicy::Uw),
            other => Err(Error::parse(format!(
                "unknown match policy '{}' (expected exact, muc, ace or uw)",
                other
            ))),
        }
    }
}

/// The rule that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// IDs are equal (exact policy).
    SameId,
    /// Spans are identical.
    SpanEqual,
    /// Response span contains the gold span.
    Covers,
    /// Response text contains the gold MIN string.
    MinString,
    /// Spans differ only by determiners and trailing punctuation.
    Modifiers,
    /// Head offsets coincide.
    Head,
    /// MIN sub-span inside response, response inside gold.
    MinSpan,
}

/// Outcome of testing one (response, gold) candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The candidate matches.
    Match(MatchRule),
    /// The head rule fired but the conjunction exception vetoed it.
    ConjunctionRejected,
    /// No rule applies.
    NoMatch,
}

impl Decision {
    /// The matching rule, if any.
    #[must_use]
    pub fn rule(self) -> Option<MatchRule> {
        match self {
            Decision::Match(rule) => Some(rule),
            _ => None,
        }
    }
}

/// Decide whether `response` corresponds to `gold` under `policy`.
///
/// `text` is the document the spans index into. Spans that do not slice the
/// text are treated as empty strings; callers validate spans up front.
#[must_use]
pub fn decide(
    policy: MatchPolicy,
    text: &str,
    response: &ResponseMention,
    gold: &GoldMention,
) -> Decision {
    match policy {
        MatchPolicy::Exact => {
            if response.id == gold.id {
                Decision::Match(MatchRule::SameId)
            } else {
                Decision::NoMatch
            }
        }
        MatchPolicy::Muc => decide_muc(text, response, gold),
        MatchPolicy::Ace => decide_ace(text, response, gold),
        MatchPolicy::Uw => match decide_ace(text, response, gold) {
            Decision::Match(rule) => Decision::Match(rule),
            fallback => {
                if min_span_match(response, gold) {
                    Decision::Match(MatchRule::MinSpan)
                } else {
                    fallback
                }
            }
        },
    }
}

fn decide_muc(text: &str, response: &ResponseMention, gold: &GoldMention) -> Decision {
    if response.span == gold.span {
        return Decision::Match(MatchRule::SpanEqual);
    }
    if response.span.contains(&gold.span) {
        return Decision::Match(MatchRule::Covers);
    }

    let response_text = slice(text, response.span);
    if let Some(min_text) = gold.min.map(|min| slice(text, min)) {
        if !min_text.is_empty() && response_text.contains(min_text) {
            return Decision::Match(MatchRule::MinString);
        }
    }

    if differ_only_by_modifiers(response_text, slice(text, gold.span)) {
        return Decision::Match(MatchRule::Modifiers);
    }
    Decision::NoMatch
}

fn decide_ace(text: &str, response: &ResponseMention, gold: &GoldMention) -> Decision {
    if response.span == gold.span {
        return Decision::Match(MatchRule::SpanEqual);
    }
    if differ_only_by_modifiers(slice(text, response.span), slice(text, gold.span)) {
        return Decision::Match(MatchRule::Modifiers);
    }

    let Some(head) = gold.head else {
        return Decision::NoMatch;
    };
    let head_hit = match response.head {
        Some(response_head) => response_head == head,
        None => response.span.contains(&head),
    };
    if !head_hit {
        return Decision::NoMatch;
    }

    // A conjunction before the head marks a coordinated phrase; the head
    // must then close the response span.
    if head.start > response.span.start {
        let before_head = slice(text, Span::new(response.span.start, head.start));
        if contains_conjunction(before_head) && head.end != response.span.end {
            return Decision::ConjunctionRejected;
        }
    }
    Decision::Match(MatchRule::Head)
}

fn min_span_match(response: &ResponseMention, gold: &GoldMention) -> bool {
    gold.min
        .is_some_and(|min| response.span.contains(&min) && gold.span.contains(&response.span))
}

fn slice(text: &str, span: Span) -> &str {
    span.slice(text).unwrap_or("")
}

/// Tokens of `s` with leading determiners and trailing punctuation removed.
pub(crate) fn core_tokens(s: &str) -> Vec<&str> {
    let trimmed = s.trim_end_matches(|c: char| c.is_whitespace() || POSTMODIFIERS.contains(&c));
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let leading = tokens
        .iter()
        .take_while(|t| PREMODIFIERS.iter().any(|p| t.eq_ignore_ascii_case(p)))
        .count();
    tokens[leading..].to_vec()
}

/// True when the two strings are equal once determiners and trailing
/// punctuation are stripped (and something is left).
pub(crate) fn differ_only_by_modifiers(a: &str, b: &str) -> bool {
    let core_a = core_tokens(a);
    !core_a.is_empty() && core_a == core_tokens(b)
}

/// True when `s` contains the token "and".
pub(crate) fn contains_conjunction(s: &str) -> bool {
    s.split_whitespace()
        .map(|t| t.trim_matches(|c: char| POSTMODIFIERS.contains(&c)))
        .any(|t| t.eq_ignore_ascii_case("and"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "The president and his wife visited the plant.";

    #[test]
    fn test_core_tokens() {
        assert_eq!(core_tokens("The big dog ."), vec!["big", "dog"]);
        assert_eq!(core_tokens("an apple;"), vec!["apple"]);
        assert_eq!(core_tokens("the"), Vec::<&str>::new());
        assert!(differ_only_by_modifiers("The plant.", "plant"));
        assert!(!differ_only_by_modifiers("the", "a"));
        assert!(!differ_only_by_modifiers("big dog", "dog"));
    }

    #[test]
    fn test_conjunction_token() {
        assert!(contains_conjunction("John and Mary"));
        assert!(contains_conjunction("cats, AND dogs"));
        assert!(!contains_conjunction("Andrew"));
        assert!(!contains_conjunction("brand"));
    }

    #[test]
    fn test_leading_determiner_matches_muc_and_ace() {
        let gold = GoldMention::new(1, (0, 13), 1);
        let response = ResponseMention::new(9, (4, 13), 1);
        assert_eq!(
            decide(MatchPolicy::Muc, TEXT, &response, &gold),
            Decision::Match(MatchRule::Modifiers)
        );
        assert_eq!(
            decide(MatchPolicy::Ace, TEXT, &response, &gold),
            Decision::Match(MatchRule::Modifiers)
        );
    }

    #[test]
    fn test_muc_covers_and_min_string() {
        let gold = GoldMention::new(1, (4, 13), 1).with_min((4, 13));
        let covering = ResponseMention::new(9, (0, 13), 1);
        assert_eq!(
            decide(MatchPolicy::Muc, TEXT, &covering, &gold).rule(),
            Some(MatchRule::Covers)
        );

        // "his wife" vs gold "his wife visited" with MIN "wife"
        let gold = GoldMention::new(2, (18, 35), 2).with_min((22, 26));
        let response = ResponseMention::new(9, (18, 26), 1);
        assert_eq!(
            decide(MatchPolicy::Muc, TEXT, &response, &gold).rule(),
            Some(MatchRule::MinString)
        );
    }

    #[test]
    fn test_muc_min_string_inside_response() {
        // "his wife visited" vs gold "wife visited the plant" with MIN "wife"
        let gold = GoldMention::new(1, (22, 44), 1).with_min((22, 26));
        let response = ResponseMention::new(9, (18, 34), 1);
        assert!(!response.span.contains(&gold.span));
        assert_eq!(
            decide(MatchPolicy::Muc, TEXT, &response, &gold).rule(),
            Some(MatchRule::MinString)
        );
    }

    #[test]
    fn test_ace_head_with_conjunction_exception() {
        // gold "his wife" headed by "wife"; response "president and his wife"
        let gold = GoldMention::new(2, (18, 26), 2).with_head((22, 26));
        let response = ResponseMention::new(9, (4, 26), 1);
        // head ends exactly where the response ends: allowed
        assert_eq!(
            decide(MatchPolicy::Ace, TEXT, &response, &gold).rule(),
            Some(MatchRule::Head)
        );

        // gold "his" headed by "his"; response "president and his wife": vetoed
        let gold = GoldMention::new(3, (18, 21), 3).with_head((18, 21));
        assert_eq!(
            decide(MatchPolicy::Ace, TEXT, &response, &gold),
            Decision::ConjunctionRejected
        );
    }

    #[test]
    fn test_ace_uses_response_head_when_present() {
        let gold = GoldMention::new(1, (0, 13), 1).with_head((4, 13));
        let same_head = ResponseMention::new(9, (4, 26), 1).with_head((4, 13));
        let other_head = ResponseMention::new(9, (4, 26), 1).with_head((22, 26));
        assert_eq!(
            decide(MatchPolicy::Ace, TEXT, &same_head, &gold).rule(),
            Some(MatchRule::Head)
        );
        assert_eq!(
            decide(MatchPolicy::Ace, TEXT, &other_head, &gold),
            Decision::NoMatch
        );
    }

    #[test]
    fn test_uw_min_span() {
        // gold "the plant." with MIN "plant"; response "plant." lies inside gold
        let gold = GoldMention::new(1, (35, 45), 1).with_min((39, 44));
        let response = ResponseMention::new(9, (39, 45), 1);
        assert_eq!(
            decide(MatchPolicy::Ace, TEXT, &response, &gold).rule(),
            Some(MatchRule::Modifiers)
        );

        let response = ResponseMention::new(9, (39, 44), 1);
        let gold = GoldMention::new(1, (27, 44), 1).with_min((39, 44));
        assert_eq!(decide(MatchPolicy::Ace, TEXT, &response, &gold), Decision::NoMatch);
        assert_eq!(
            decide(MatchPolicy::Uw, TEXT, &response, &gold).rule(),
            Some(MatchRule::MinSpan)
        );
    }

    #[test]
    fn test_exact_ignores_spans() {
        let gold = GoldMention::new(4, (0, 3), 1);
        assert_eq!(
            decide(MatchPolicy::Exact, TEXT, &ResponseMention::new(4, (30, 40), 1), &gold),
            Decision::Match(MatchRule::SameId)
        );
        assert_eq!(
            decide(MatchPolicy::Exact, TEXT, &ResponseMention::new(5, (0, 3), 1), &gold),
            Decision::NoMatch
        );
    }

    #[test]
    fn test_policy_parsing() {
        for policy in MatchPolicy::ALL {
            assert_eq!(policy.as_str().parse::<MatchPolicy>().unwrap(), policy);
        }
        assert!("fuzzy".parse::<MatchPolicy>().is_err());
    }
}
