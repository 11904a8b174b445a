//! # coref-scorer-core
//!
//! Core types for coreference scoring: the data model every other crate in
//! the workspace builds on.
//!
//! This crate provides:
//! - **Partitions**: [`MentionPartition`], a document's clustering of mention
//!   IDs together with its match map into the other side's numbering
//! - **Pairs**: [`DocumentPair`], the key (gold) and response (system)
//!   partitions of one document
//! - **Spans**: [`Span`], byte ranges used by mention alignment
//!
//! # Example
//!
//! ```rust
//! use coref_scorer_core::{DocumentPair, MentionPartition, Role};
//!
//! let key = MentionPartition::from_chains(Role::Key, [vec![1, 2, 3], vec![4]]);
//! let response = MentionPartition::from_chains(Role::Response, [vec![1, 2], vec![3, 4]]);
//!
//! let mut pair = DocumentPair::new(key, response);
//! assert_eq!(pair.align_by_id(), 4);
//! assert_eq!(pair.key.get_match(3), Some(3));
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod pair;
pub mod partition;
pub mod span;

pub use error::{Error, Result};
pub use pair::DocumentPair;
pub use partition::{ClusterId, MentionId, MentionPartition, Role};
pub use span::Span;
