//! Error types for coref-scorer-core.

use thiserror::Error;

use crate::MentionId;

/// Result type for coref-scorer-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for coref-scorer-core operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A match-map entry (or the chain lookup behind it) points at a mention
    /// the target partition does not contain.
    #[error(
        "Referential integrity violated: mention {mention} in the {source_role} partition \
         is matched to {target}, which is absent from the {target_role} partition"
    )]
    ReferentialIntegrity {
        /// Mention carrying the dangling match entry.
        mention: MentionId,
        /// Mention the entry points at.
        target: MentionId,
        /// Role of the partition holding `mention` ("key" or "response").
        source_role: &'static str,
        /// Role of the partition expected to hold `target`.
        target_role: &'static str,
    },

    /// Unknown mention referenced by an operation.
    #[error("Unknown mention {mention} in the {role} partition")]
    UnknownMention {
        /// The missing mention.
        mention: MentionId,
        /// Role of the partition that was searched.
        role: &'static str,
    },
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a referential integrity error.
    #[must_use]
    pub fn referential_integrity(
        mention: MentionId,
        target: MentionId,
        source_role: &'static str,
        target_role: &'static str,
    ) -> Self {
        Self::ReferentialIntegrity {
            mention,
            target,
            source_role,
            target_role,
        }
    }

    /// Create an unknown mention error.
    #[must_use]
    pub fn unknown_mention(mention: MentionId, role: &'static str) -> Self {
        Self::UnknownMention { mention, role }
    }

    /// Whether this error invalidates the whole document's scoring.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ReferentialIntegrity { .. })
    }
}
