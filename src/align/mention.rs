//! Annotated mention sets: the aligner's input.
//!
//! Gold mentions come from the annotation layer and may carry a minimal span
//! (the MUC `MIN` attribute, or a separately encoded sub-span) and a head
//! span. Response mentions come from the system and carry a cluster
//! assignment plus an optional head.

use serde::{Deserialize, Serialize};

use coref_scorer_core::{ClusterId, DocumentPair, MentionId, MentionPartition, Role, Span};

use crate::error::{Error, Result};

/// A gold-standard mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldMention {
    /// Mention ID in the key numbering.
    pub id: MentionId,
    /// Full (maximal) span.
    pub span: Span,
    /// Cluster (the `REF` chain) this mention belongs to.
    pub cluster: ClusterId,
    /// Minimal span, if annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Span>,
    /// Head span, if annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Span>,
}

impl GoldMention {
    /// Create a gold mention without min/head annotations.
    #[must_use]
    pub fn new(id: MentionId, span: impl Into<Span>, cluster: ClusterId) -> Self {
        Self {
            id,
            span: span.into(),
            cluster,
            min: None,
            head: None,
        }
    }

    /// Attach a minimal span.
    #[must_use]
    pub fn with_min(mut self, min: impl Into<Span>) -> Self {
        self.min = Some(min.into());
        self
    }

    /// Attach a head span.
    #[must_use]
    pub fn with_head(mut self, head: impl Into<Span>) -> Self {
        self.head = Some(head.into());
        self
    }
}

/// A system-produced mention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMention {
    /// Mention ID in the response numbering.
    pub id: MentionId,
    /// Span of the mention.
    pub span: Span,
    /// Cluster assigned by the system.
    pub cluster: ClusterId,
    /// Head span, if the upstream parser supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Span>,
}

impl ResponseMention {
    /// Create a response mention.
    #[must_use]
    pub fn new(id: MentionId, span: impl Into<Span>, cluster: ClusterId) -> Self {
        Self {
            id,
            span: span.into(),
            cluster,
            head: None,
        }
    }

    /// Attach a head span.
    #[must_use]
    pub fn with_head(mut self, head: impl Into<Span>) -> Self {
        self.head = Some(head.into());
        self
    }
}

/// One document's text with its gold and response mention sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    /// Document identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    /// Document text; spans are byte offsets into it.
    #[serde(default)]
    pub text: String,
    /// Gold mentions.
    #[serde(default)]
    pub gold: Vec<GoldMention>,
    /// Response mentions.
    #[serde(default)]
    pub response: Vec<ResponseMention>,
}

impl AnnotatedDocument {
    /// Create a document with no mentions.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the document identifier.
    #[must_use]
    pub fn with_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    /// Add a gold mention.
    #[must_use]
    pub fn with_gold(mut self, mention: GoldMention) -> Self {
        self.gold.push(mention);
        self
    }

    /// Add a response mention.
    #[must_use]
    pub fn with_response(mut self, mention: ResponseMention) -> Self {
        self.response.push(mention);
        self
    }

    /// Key partition built from the gold clusters.
    #[must_use]
    pub fn key_partition(&self) -> MentionPartition {
        MentionPartition::from_pairs(Role::Key, self.gold.iter().map(|m| (m.id, m.cluster)))
    }

    /// Response partition built from the system clusters.
    #[must_use]
    pub fn response_partition(&self) -> MentionPartition {
        MentionPartition::from_pairs(
            Role::Response,
            self.response.iter().map(|m| (m.id, m.cluster)),
        )
    }

    /// Both partitions, unaligned.
    #[must_use]
    pub fn to_pair(&self) -> DocumentPair {
        let pair = DocumentPair::new(self.key_partition(), self.response_partition());
        match &self.doc_id {
            Some(id) => pair.with_doc_id(id.clone()),
            None => pair,
        }
    }

    /// Slice the document text.
    #[must_use]
    pub fn span_text(&self, span: Span) -> Option<&str> {
        span.slice(&self.text)
    }

    /// Check that every span (including min and head spans) slices the text.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] naming the first bad span.
    pub fn validate_spans(&self) -> Result<()> {
        let label = self.doc_id.as_deref().unwrap_or("<unnamed>");
        let check = |what: &str, id: MentionId, span: Span| -> Result<()> {
            if span.slice(&self.text).is_none() {
                return Err(Error::invalid_input(format!(
                    "document {}: {} span {} of mention {} is outside the text ({} bytes)",
                    label,
                    what,
                    span,
                    id,
                    self.text.len()
                )));
            }
            Ok(())
        };

        for m in &self.gold {
            check("gold", m.id, m.span)?;
            if let Some(min) = m.min {
                check("gold min", m.id, min)?;
            }
            if let Some(head) = m.head {
                check("gold head", m.id, head)?;
            }
        }
        for m in &self.response {
            check("response", m.id, m.span)?;
            if let Some(head) = m.head {
                check("response head", m.id, head)?;
            }
        }
        Ok(())
    }
}
