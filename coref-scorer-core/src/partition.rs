//! Mention partitions: one document's clustering of mention IDs.
//!
//! A [`MentionPartition`] stores mentions and clusters in dense,
//! integer-indexed arrays. External IDs (whatever numbering the annotation
//! layer used) are translated once on insertion; everything after that is a
//! plain slot index.
//!
//! The match map is a single optional relation per partition: slot →
//! the twin's ID in the *other* partition's numbering. Two mentions are
//! considered the same real-world mention only through that relation, never
//! because their IDs or cluster numbers happen to be equal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mention identifier, local to one partition's numbering space.
pub type MentionId = i64;

/// Cluster identifier, local to one partition.
pub type ClusterId = i64;

/// Which side of the comparison a partition plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Gold-standard annotations.
    Key,
    /// System output.
    Response,
}

impl Role {
    /// Lowercase label used in messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Key => "key",
            Role::Response => "response",
        }
    }

    /// The opposite role.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Role::Key => Role::Response,
            Role::Response => Role::Key,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A partition of one document's mentions into clusters.
///
/// # Invariants
///
/// - Every mention belongs to exactly one cluster.
/// - Chains are kept sorted by mention ID.
/// - A cluster exists only while it has at least one member.
#[derive(Debug, Clone)]
pub struct MentionPartition {
    role: Role,
    /// External mention ID -> slot
    slots: HashMap<MentionId, usize>,
    /// Slot -> external mention ID
    mentions: Vec<MentionId>,
    /// Slot -> dense cluster index
    mention_cluster: Vec<usize>,
    /// External cluster ID -> dense cluster index
    cluster_index: HashMap<ClusterId, usize>,
    /// Dense cluster index -> external cluster ID
    cluster_ids: Vec<ClusterId>,
    /// Dense cluster index -> sorted member IDs
    members: Vec<Vec<MentionId>>,
    /// Slot -> twin ID in the other partition
    matches: Vec<Option<MentionId>>,
}

impl MentionPartition {
    /// Create an empty partition playing `role`.
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            slots: HashMap::new(),
            mentions: Vec::new(),
            mention_cluster: Vec::new(),
            cluster_index: HashMap::new(),
            cluster_ids: Vec::new(),
            members: Vec::new(),
            matches: Vec::new(),
        }
    }

    /// Create an empty key (gold) partition.
    #[must_use]
    pub fn key() -> Self {
        Self::new(Role::Key)
    }

    /// Create an empty response (system) partition.
    #[must_use]
    pub fn response() -> Self {
        Self::new(Role::Response)
    }

    /// Build a partition from `(mention, cluster)` pairs.
    ///
    /// Duplicate mentions keep their first cluster.
    pub fn from_pairs<I>(role: Role, pairs: I) -> Self
    where
        I: IntoIterator<Item = (MentionId, ClusterId)>,
    {
        let mut partition = Self::new(role);
        for (mention, cluster) in pairs {
            partition.add(mention, cluster);
        }
        partition
    }

    /// Build a partition from explicit chains; the chain's position is its
    /// cluster ID.
    pub fn from_chains<I, C>(role: Role, chains: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = MentionId>,
    {
        let mut partition = Self::new(role);
        for (cluster, chain) in chains.into_iter().enumerate() {
            for mention in chain {
                partition.add(mention, cluster as ClusterId);
            }
        }
        partition
    }

    /// The role this partition plays.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Whether this is the gold partition.
    #[must_use]
    pub fn is_key(&self) -> bool {
        self.role == Role::Key
    }

    pub(crate) fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Add `mention` to `cluster`.
    ///
    /// First write wins: if the mention is already present the call is a
    /// no-op and returns `false`. Upstream annotation data is often noisy, so
    /// duplicates are tolerated rather than rejected.
    pub fn add(&mut self, mention: MentionId, cluster: ClusterId) -> bool {
        if self.slots.contains_key(&mention) {
            log::trace!(
                "{} partition: ignoring duplicate mention {} (cluster {})",
                self.role,
                mention,
                cluster
            );
            return false;
        }

        let cluster_idx = match self.cluster_index.get(&cluster) {
            Some(&idx) => idx,
            None => {
                let idx = self.cluster_ids.len();
                self.cluster_index.insert(cluster, idx);
                self.cluster_ids.push(cluster);
                self.members.push(Vec::new());
                idx
            }
        };

        let slot = self.mentions.len();
        self.slots.insert(mention, slot);
        self.mentions.push(mention);
        self.mention_cluster.push(cluster_idx);
        self.matches.push(None);

        let chain = &mut self.members[cluster_idx];
        if let Err(pos) = chain.binary_search(&mention) {
            chain.insert(pos, mention);
        }
        true
    }

    /// Check whether the partition contains `mention`.
    #[must_use]
    pub fn contains(&self, mention: MentionId) -> bool {
        self.slots.contains_key(&mention)
    }

    /// Cluster the mention belongs to.
    #[must_use]
    pub fn cluster_of(&self, mention: MentionId) -> Option<ClusterId> {
        self.chain_index_of(mention).map(|idx| self.cluster_ids[idx])
    }

    /// Dense index of the mention's chain (position in [`chains`](Self::chains)).
    #[must_use]
    pub fn chain_index_of(&self, mention: MentionId) -> Option<usize> {
        self.slots
            .get(&mention)
            .map(|&slot| self.mention_cluster[slot])
    }

    /// Members of `cluster`, sorted by ID. Empty if the cluster is absent.
    #[must_use]
    pub fn chain(&self, cluster: ClusterId) -> &[MentionId] {
        self.cluster_index
            .get(&cluster)
            .map_or(&[], |&idx| self.members[idx].as_slice())
    }

    /// Chain at a dense index.
    #[must_use]
    pub fn chain_at(&self, index: usize) -> &[MentionId] {
        self.members.get(index).map_or(&[], Vec::as_slice)
    }

    /// The chain containing `mention`.
    #[must_use]
    pub fn chain_of(&self, mention: MentionId) -> Option<&[MentionId]> {
        self.chain_index_of(mention)
            .map(|idx| self.members[idx].as_slice())
    }

    /// Iterate over `(cluster_id, members)` for every cluster.
    ///
    /// The order is stable for an unmodified partition (order of first
    /// appearance) and matches [`chain_index_of`](Self::chain_index_of).
    pub fn chains(&self) -> impl Iterator<Item = (ClusterId, &[MentionId])> + '_ {
        self.cluster_ids
            .iter()
            .zip(self.members.iter())
            .map(|(&id, members)| (id, members.as_slice()))
    }

    /// Mention IDs in insertion order.
    pub fn mention_ids(&self) -> impl Iterator<Item = MentionId> + '_ {
        self.mentions.iter().copied()
    }

    /// Number of mentions (noun phrases).
    #[must_use]
    pub fn num_mentions(&self) -> usize {
        self.mentions.len()
    }

    /// Number of chains.
    #[must_use]
    pub fn num_chains(&self) -> usize {
        self.members.len()
    }

    /// Check if the partition has no mentions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    /// Whether every chain is a singleton.
    #[must_use]
    pub fn is_all_singletons(&self) -> bool {
        self.members.iter().all(|c| c.len() == 1)
    }

    /// Record that `mention` corresponds to `twin` in the other partition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMention`] if `mention` is not in this partition.
    pub fn set_match(&mut self, mention: MentionId, twin: MentionId) -> Result<()> {
        let slot = self.slot(mention)?;
        self.matches[slot] = Some(twin);
        Ok(())
    }

    /// Twin of `mention` in the other partition's numbering, if any.
    #[must_use]
    pub fn get_match(&self, mention: MentionId) -> Option<MentionId> {
        self.slots
            .get(&mention)
            .and_then(|&slot| self.matches[slot])
    }

    /// Whether `mention` has a twin.
    #[must_use]
    pub fn is_matched(&self, mention: MentionId) -> bool {
        self.get_match(mention).is_some()
    }

    /// Remove the match entry of `mention`, returning the old twin.
    pub fn clear_match(&mut self, mention: MentionId) -> Option<MentionId> {
        let slot = *self.slots.get(&mention)?;
        self.matches[slot].take()
    }

    /// Remove every match entry.
    pub fn clear_matches(&mut self) {
        self.matches.iter_mut().for_each(|m| *m = None);
    }

    /// Number of mentions with a twin.
    #[must_use]
    pub fn num_matched(&self) -> usize {
        self.matches.iter().filter(|m| m.is_some()).count()
    }

    /// `(mention, twin)` for every matched mention, in insertion order.
    pub fn matches(&self) -> impl Iterator<Item = (MentionId, MentionId)> + '_ {
        self.mentions
            .iter()
            .zip(self.matches.iter())
            .filter_map(|(&m, twin)| twin.map(|t| (m, t)))
    }

    /// Resolve the twin of `mention` against `target`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReferentialIntegrity`] if the match entry names a
    /// mention that `target` does not contain.
    pub fn twin_in(&self, mention: MentionId, target: &MentionPartition) -> Result<Option<MentionId>> {
        match self.get_match(mention) {
            Some(twin) if target.contains(twin) => Ok(Some(twin)),
            Some(twin) => Err(Error::referential_integrity(
                mention,
                twin,
                self.role.as_str(),
                target.role.as_str(),
            )),
            None => Ok(None),
        }
    }

    /// Dense chain index, in `target`, of the twin of `mention`.
    ///
    /// # Errors
    ///
    /// Same as [`twin_in`](Self::twin_in).
    pub fn twin_chain_index_in(
        &self,
        mention: MentionId,
        target: &MentionPartition,
    ) -> Result<Option<usize>> {
        match self.twin_in(mention, target)? {
            Some(twin) => target
                .chain_index_of(twin)
                .map(Some)
                .ok_or_else(|| {
                    Error::referential_integrity(mention, twin, self.role.as_str(), target.role.as_str())
                }),
            None => Ok(None),
        }
    }

    /// Check that every match entry resolves in `target`.
    ///
    /// # Errors
    ///
    /// The first dangling entry as [`Error::ReferentialIntegrity`].
    pub fn validate_matches(&self, target: &MentionPartition) -> Result<()> {
        for (mention, twin) in self.matches() {
            if !target.contains(twin) {
                return Err(Error::referential_integrity(
                    mention,
                    twin,
                    self.role.as_str(),
                    target.role.as_str(),
                ));
            }
        }
        Ok(())
    }

    fn slot(&self, mention: MentionId) -> Result<usize> {
        self.slots
            .get(&mention)
            .copied()
            .ok_or_else(|| Error::unknown_mention(mention, self.role.as_str()))
    }
}

impl PartialEq for MentionPartition {
    /// Two partitions are equal when they hold the same clusters, regardless
    /// of cluster numbering, insertion order or match entries.
    fn eq(&self, other: &Self) -> bool {
        if self.num_mentions() != other.num_mentions() || self.num_chains() != other.num_chains() {
            return false;
        }
        let mut a: Vec<&[MentionId]> = self.members.iter().map(Vec::as_slice).collect();
        let mut b: Vec<&[MentionId]> = other.members.iter().map(Vec::as_slice).collect();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }
}

// =============================================================================
// Tests
// =============================================================================
