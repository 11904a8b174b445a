//! Key/response pairs for a single document.

use crate::error::{Error, Result};
use crate::partition::{MentionId, MentionPartition, Role};

/// The gold and system partitions of one document.
///
/// Precision and recall are computed by the same metric definition with the
/// roles swapped; [`recall_view`](Self::recall_view) and
/// [`precision_view`](Self::precision_view) hand out the two orientations.
#[derive(Debug, Clone)]
pub struct DocumentPair {
    /// Gold partition.
    pub key: MentionPartition,
    /// System partition.
    pub response: MentionPartition,
    doc_id: Option<String>,
}

impl DocumentPair {
    /// Pair two partitions. Roles are normalized to key/response.
    #[must_use]
    pub fn new(mut key: MentionPartition, mut response: MentionPartition) -> Self {
        key.set_role(Role::Key);
        response.set_role(Role::Response);
        Self {
            key,
            response,
            doc_id: None,
        }
    }

    /// Attach a document identifier (used in reports and error messages).
    #[must_use]
    pub fn with_doc_id(mut self, doc_id: impl Into<String>) -> Self {
        self.doc_id = Some(doc_id.into());
        self
    }

    /// Document identifier, if set.
    #[must_use]
    pub fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    /// Record that `key_mention` and `response_mention` are the same mention,
    /// in both match maps.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownMention`] if either side lacks the mention.
    pub fn link(&mut self, key_mention: MentionId, response_mention: MentionId) -> Result<()> {
        if !self.response.contains(response_mention) {
            return Err(Error::unknown_mention(response_mention, Role::Response.as_str()));
        }
        self.key.set_match(key_mention, response_mention)?;
        self.response.set_match(response_mention, key_mention)?;
        Ok(())
    }

    /// Match every mention ID present in both partitions to itself.
    ///
    /// This is the alignment used when key and response share a canonical
    /// mention set. Returns the number of links made.
    pub fn align_by_id(&mut self) -> usize {
        self.key.clear_matches();
        self.response.clear_matches();

        let shared: Vec<MentionId> = self
            .key
            .mention_ids()
            .filter(|&m| self.response.contains(m))
            .collect();
        for &m in &shared {
            // both sides contain `m`, so neither call can fail
            let _ = self.key.set_match(m, m);
            let _ = self.response.set_match(m, m);
        }
        shared.len()
    }

    /// Check every match entry in both directions.
    ///
    /// # Errors
    ///
    /// [`Error::ReferentialIntegrity`] for the first dangling entry.
    pub fn validate(&self) -> Result<()> {
        self.key.validate_matches(&self.response)?;
        self.response.validate_matches(&self.key)
    }

    /// `(key, response)`: the orientation of a recall pass.
    #[must_use]
    pub fn recall_view(&self) -> (&MentionPartition, &MentionPartition) {
        (&self.key, &self.response)
    }

    /// `(response, key)`: the orientation of a precision pass.
    #[must_use]
    pub fn precision_view(&self) -> (&MentionPartition, &MentionPartition) {
        (&self.response, &self.key)
    }

    /// Whether either side has no mentions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key.is_empty() || self.response.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> DocumentPair {
        DocumentPair::new(
            MentionPartition::from_chains(Role::Key, [vec![1, 2, 3], vec![4]]),
            MentionPartition::from_chains(Role::Response, [vec![1, 2], vec![3, 5]]),
        )
    }

    #[test]
    fn test_roles_normalized() {
        let p = DocumentPair::new(MentionPartition::response(), MentionPartition::key());
        assert!(p.key.is_key());
        assert!(!p.response.is_key());
    }

    #[test]
    fn test_align_by_id_links_shared_mentions() {
        let mut p = pair();
        assert_eq!(p.align_by_id(), 3);
        assert_eq!(p.key.get_match(3), Some(3));
        assert_eq!(p.key.get_match(4), None);
        assert_eq!(p.response.get_match(5), None);
        p.validate().unwrap();
    }

    #[test]
    fn test_link_is_bidirectional() {
        let mut p = pair();
        p.link(4, 5).unwrap();
        assert_eq!(p.key.get_match(4), Some(5));
        assert_eq!(p.response.get_match(5), Some(4));

        assert!(p.link(4, 99).is_err());
        assert!(p.link(99, 5).is_err());
    }

    #[test]
    fn test_validate_catches_dangling_match() {
        let mut p = pair();
        p.key.set_match(4, 77).unwrap();
        let err = p.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::ReferentialIntegrity { mention: 4, target: 77, .. }
        ));
    }
}
