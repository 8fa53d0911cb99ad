//! The shared candidate block tree.
//!
//! Built once at simulation start and then only ever read: every simulated
//! node holds beliefs about the same tree. Records live in an arena and
//! reference each other by index, so the tree is trivially shareable.

use crate::BlockHash;
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// Index of a record in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

/// Errors that can occur while constructing a block tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Fewer than one block requested.
    #[error("total blocks must be greater than 0, got {0}")]
    TooFewBlocks(usize),

    /// Fewer than one child per record allowed.
    #[error("max children per record must be greater than 0, got {0}")]
    TooFewChildren(usize),
}

/// A single record in the candidate tree.
#[derive(Debug, Clone)]
pub struct BlockRecord {
    /// Opaque unique label.
    pub hash: BlockHash,
    /// Depth in the tree: 0 at the root, parent depth + 1 for children.
    pub depth: u64,
    /// Parent record, `None` only for the root.
    pub parent: Option<BlockId>,
    /// Children in attachment order.
    pub children: Vec<BlockId>,
}

/// The shared consensus target tree.
///
/// Immutable after construction. [`BlockTree::all_records`] yields the
/// breadth-first order used everywhere deterministic enumeration matters:
/// belief initialization, invariant validation, and reporting.
#[derive(Debug, Clone)]
pub struct BlockTree {
    records: Vec<BlockRecord>,
    by_hash: HashMap<BlockHash, BlockId>,
}

impl BlockTree {
    /// Build a random tree with exactly `total_blocks` records.
    ///
    /// Records attach breadth-first: each new record becomes a child of the
    /// frontmost queued record that still has capacity, so the tree fills
    /// level by level up to `max_children_per_record` children each.
    pub fn build_random<R: Rng>(
        total_blocks: usize,
        max_children_per_record: usize,
        rng: &mut R,
    ) -> Result<Self, TreeError> {
        if total_blocks < 1 {
            return Err(TreeError::TooFewBlocks(total_blocks));
        }
        if max_children_per_record < 1 {
            return Err(TreeError::TooFewChildren(max_children_per_record));
        }

        let mut tree = Self {
            records: Vec::with_capacity(total_blocks),
            by_hash: HashMap::with_capacity(total_blocks),
        };

        let root = tree.push_record(BlockHash::random(rng), 0, None);
        let mut queue = VecDeque::from([root]);

        for _ in 1..total_blocks {
            let mut front = queue[0];
            if tree.records[front.0].children.len() >= max_children_per_record {
                queue.pop_front();
                front = queue[0];
            }

            let depth = tree.records[front.0].depth + 1;
            let child = tree.push_record(BlockHash::random(rng), depth, Some(front));
            tree.records[front.0].children.push(child);
            queue.push_back(child);
        }

        Ok(tree)
    }

    fn push_record(&mut self, hash: BlockHash, depth: u64, parent: Option<BlockId>) -> BlockId {
        let id = BlockId(self.records.len());
        self.records.push(BlockRecord {
            hash,
            depth,
            parent,
            children: Vec::new(),
        });
        self.by_hash.insert(hash, id);
        id
    }

    /// The root record.
    pub fn root(&self) -> BlockId {
        BlockId(0)
    }

    /// Look up a record by arena index.
    pub fn record(&self, id: BlockId) -> &BlockRecord {
        &self.records[id.0]
    }

    /// Look up a record id by its hash.
    pub fn find(&self, hash: &BlockHash) -> Option<BlockId> {
        self.by_hash.get(hash).copied()
    }

    /// Number of records in the tree.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the tree is empty. Never true for a constructed tree.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in breadth-first order, root first.
    ///
    /// Queue-based traversal: dequeue, emit, enqueue children. Deterministic
    /// for a given tree and non-mutating.
    pub fn all_records(&self) -> Vec<BlockId> {
        let mut out = Vec::with_capacity(self.records.len());
        let mut queue = VecDeque::from([self.root()]);

        while let Some(id) = queue.pop_front() {
            out.push(id);
            queue.extend(self.records[id.0].children.iter().copied());
        }

        out
    }
}
