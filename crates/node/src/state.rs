//! Node state and the three consensus steps: seed, sync, adjust.

use crate::Belief;
use indexmap::IndexMap;
use obelisk_network::{Mailbox, Message};
use obelisk_types::{BlockHash, BlockId, BlockTree, NodeIndex, PublicId};
use rand::Rng;
use thiserror::Error;
use tracing::trace;

/// Step size when nudging a child weight toward 0 or its parent's weight.
pub const CONSENSUS_APPROACH_FACTOR: f64 = 0.1;

/// Perturbation applied to each non-final child during weight seeding, so
/// that nodes start with distinct opinions.
pub const WEIGHT_INIT_FACTOR: f64 = 0.01;

/// Allowed drift between a record's weight and the sum of its children's.
pub const WEIGHT_TOLERANCE: f64 = 1e-7;

/// A node's weights stopped forming a flow over the tree.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "node {node_id}: block {block} carries weight {parent_weight} \
     but its children sum to {children_sum}"
)]
pub struct InvariantViolation {
    /// Node whose beliefs failed validation.
    pub node_id: NodeIndex,
    /// First block, in breadth-first order, whose children drifted.
    pub block: BlockHash,
    /// The block's own weight.
    pub parent_weight: f64,
    /// Sum of the children's weights.
    pub children_sum: f64,
}

/// One simulated participant.
///
/// A node holds a belief per block of the shared tree, a list of
/// subscriptions it polls for weights, and a mailbox of greeting traffic.
/// `seq_no` counts the node's own activations; subscribers read it during
/// sync to record how fresh their source was.
#[derive(Debug, Clone)]
pub struct NodeState {
    id: NodeIndex,
    public_id: PublicId,
    seq_no: u64,
    subscriptions: Vec<NodeIndex>,
    beliefs: IndexMap<BlockHash, Belief>,
    mailbox: Mailbox,
    delivered: Vec<Message>,
}

impl NodeState {
    /// Create a node with no subscriptions and no beliefs yet.
    pub fn new<R: Rng>(id: NodeIndex, rng: &mut R) -> Self {
        Self {
            id,
            public_id: PublicId::random(rng),
            seq_no: 0,
            subscriptions: Vec::new(),
            beliefs: IndexMap::new(),
            mailbox: Mailbox::new(),
            delivered: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeIndex {
        self.id
    }

    pub fn public_id(&self) -> &PublicId {
        &self.public_id
    }

    /// The node's activation counter.
    pub fn seq_no(&self) -> u64 {
        self.seq_no
    }

    pub fn subscriptions(&self) -> &[NodeIndex] {
        &self.subscriptions
    }

    pub fn set_subscriptions(&mut self, subscriptions: Vec<NodeIndex>) {
        self.subscriptions = subscriptions;
    }

    /// Read access to the belief about `hash`, if the node tracks it.
    pub fn belief(&self, hash: &BlockHash) -> Option<&Belief> {
        self.beliefs.get(hash)
    }

    /// The weight this node assigns to `hash`, if tracked.
    pub fn weight_for(&self, hash: &BlockHash) -> Option<f64> {
        self.beliefs.get(hash).map(|b| b.weight)
    }

    /// Queue an inbound message for later delivery.
    pub fn enqueue(&mut self, message: Message) {
        self.mailbox.push(message);
    }

    /// Messages delivered so far, in delivery order.
    pub fn delivered(&self) -> &[Message] {
        &self.delivered
    }

    /// Messages still in flight toward this node.
    pub fn pending_messages(&self) -> usize {
        self.mailbox.len()
    }

    /// Create one belief per tree record and seed the weights.
    ///
    /// The root gets weight 1.0; every record splits its weight across its
    /// children near-evenly, with a random `WEIGHT_INIT_FACTOR` nudge per
    /// child so no two nodes start identical. The split is exact: the last
    /// child absorbs whatever remains.
    pub fn initialize_beliefs<R: Rng>(&mut self, tree: &BlockTree, rng: &mut R) {
        self.beliefs = IndexMap::with_capacity(tree.len());
        for id in tree.all_records() {
            self.beliefs.insert(tree.record(id).hash, Belief::new(id));
        }
        self.seed_weights(tree, tree.root(), 1.0, rng);
    }

    fn seed_weights<R: Rng>(
        &mut self,
        tree: &BlockTree,
        block: BlockId,
        weight: f64,
        rng: &mut R,
    ) {
        let record = tree.record(block);
        self.belief_mut(&record.hash).weight = weight;
        if record.children.is_empty() {
            return;
        }

        let fair_share = weight / record.children.len() as f64;
        let last = record.children.len() - 1;
        let mut running = weight;

        for (i, &child) in record.children.iter().enumerate() {
            let assigned = if i == last || running <= fair_share {
                // Remainder, or nothing left worth splitting.
                running
            } else {
                let nudge = if rng.gen_bool(0.5) {
                    WEIGHT_INIT_FACTOR
                } else {
                    -WEIGHT_INIT_FACTOR
                };
                (fair_share + nudge).clamp(0.0, running)
            };
            running -= assigned;
            self.seed_weights(tree, child, assigned, rng);
        }
    }

    /// Start an activation at `tick`: bump the activation counter and drain
    /// every due message into the delivered log. Returns how many arrived.
    pub fn begin_activation(&mut self, tick: u64) -> usize {
        self.seq_no += 1;
        let due = self.mailbox.pop_due(tick);
        let count = due.len();
        if count > 0 {
            trace!(node = self.id, tick, count, "messages delivered");
        }
        self.delivered.extend(due);
        count
    }

    /// Overwrite the belief about `hash` with a freshly synced observation.
    pub fn apply_sync(&mut self, hash: &BlockHash, seq_no: u64, weight: f64, tick: u64) {
        let belief = self.belief_mut(hash);
        belief.seq_no = seq_no;
        belief.weight = weight;
        belief.last_sync_tick = tick;
    }

    /// Push every sibling group toward a winner-take-all split.
    ///
    /// Walks the tree top-down. Within each group, a child above the fair
    /// share gains `CONSENSUS_APPROACH_FACTOR` and one below loses it,
    /// clamped to the remaining budget and to zero. The last child takes
    /// the exact remainder, restoring the flow invariant that syncing with
    /// subscriptions may have disturbed.
    pub fn adjust_toward_consensus(&mut self, tree: &BlockTree) {
        self.adjust_children(tree, tree.root());
    }

    fn adjust_children(&mut self, tree: &BlockTree, block: BlockId) {
        let record = tree.record(block);
        if record.children.is_empty() {
            return;
        }

        let total = self.beliefs[&record.hash].weight;
        let fair_share = total / record.children.len() as f64;
        let last = record.children.len() - 1;
        let mut running = total;

        for (i, &child) in record.children.iter().enumerate() {
            let child_hash = tree.record(child).hash;
            let assigned = if i == last {
                running
            } else {
                let current = self.beliefs[&child_hash].weight;
                if current > fair_share {
                    (current + CONSENSUS_APPROACH_FACTOR).min(running)
                } else {
                    (current - CONSENSUS_APPROACH_FACTOR).max(0.0)
                }
            };
            self.belief_mut(&child_hash).weight = assigned;
            running -= assigned;
            self.adjust_children(tree, child);
        }
    }

    /// Check that every record's weight matches the sum of its children's,
    /// within `WEIGHT_TOLERANCE`. Records are checked in breadth-first
    /// order and the first drift found is reported.
    pub fn validate(&self, tree: &BlockTree) -> Result<(), InvariantViolation> {
        for id in tree.all_records() {
            let record = tree.record(id);
            if record.children.is_empty() {
                continue;
            }
            let parent_weight = self.beliefs[&record.hash].weight;
            let children_sum: f64 = record
                .children
                .iter()
                .map(|&child| self.beliefs[&tree.record(child).hash].weight)
                .sum();
            if (parent_weight - children_sum).abs() > WEIGHT_TOLERANCE {
                return Err(InvariantViolation {
                    node_id: self.id,
                    block: record.hash,
                    parent_weight,
                    children_sum,
                });
            }
        }
        Ok(())
    }

    // Beliefs cover every record of the shared tree once initialized.
    fn belief_mut(&mut self, hash: &BlockHash) -> &mut Belief {
        &mut self.beliefs[hash]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup(total_blocks: usize, seed: u64) -> (NodeState, BlockTree, ChaCha8Rng) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let tree = BlockTree::build_random(total_blocks, 2, &mut rng).unwrap();
        let mut node = NodeState::new(0, &mut rng);
        node.initialize_beliefs(&tree, &mut rng);
        (node, tree, rng)
    }

    fn root_hash(tree: &BlockTree) -> BlockHash {
        tree.record(tree.root()).hash
    }

    #[test]
    fn test_initialization_roots_at_one() {
        let (node, tree, _) = setup(7, 3);
        assert_eq!(node.weight_for(&root_hash(&tree)), Some(1.0));
    }

    #[test]
    fn test_initialization_satisfies_flow_invariant() {
        for seed in 0..20 {
            let (node, tree, _) = setup(9, seed);
            node.validate(&tree).unwrap();
        }
    }

    #[test]
    fn test_initialized_weights_stay_in_unit_interval() {
        for seed in 0..20 {
            let (node, tree, _) = setup(15, seed);
            for id in tree.all_records() {
                let weight = node.weight_for(&tree.record(id).hash).unwrap();
                assert!((0.0..=1.0).contains(&weight), "weight {weight} out of range");
            }
        }
    }

    #[test]
    fn test_siblings_start_with_distinct_weights() {
        // The per-child nudge should separate the two depth-1 siblings.
        let (node, tree, _) = setup(3, 7);
        let children = &tree.record(tree.root()).children;
        let a = node.weight_for(&tree.record(children[0]).hash).unwrap();
        let b = node.weight_for(&tree.record(children[1]).hash).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_begin_activation_bumps_seq_no_and_drains_mailbox() {
        let (mut node, _, _) = setup(3, 1);
        node.enqueue(Message::new(4, 0, 0, 1, "hi".to_string()));
        node.enqueue(Message::new(5, 0, 0, 9, "later".to_string()));

        assert_eq!(node.begin_activation(2), 1);
        assert_eq!(node.seq_no(), 1);
        assert_eq!(node.delivered().len(), 1);
        assert_eq!(node.delivered()[0].from, 4);
        assert_eq!(node.pending_messages(), 1);

        assert_eq!(node.begin_activation(3), 0);
        assert_eq!(node.seq_no(), 2);
    }

    #[test]
    fn test_apply_sync_stamps_all_fields() {
        let (mut node, tree, _) = setup(3, 2);
        let hash = root_hash(&tree);
        node.apply_sync(&hash, 17, 0.25, 42);

        let belief = node.belief(&hash).unwrap();
        assert_eq!(belief.seq_no, 17);
        assert_eq!(belief.weight, 0.25);
        assert_eq!(belief.last_sync_tick, 42);
    }

    #[test]
    fn test_adjust_restores_invariant_after_sync() {
        let (mut node, tree, _) = setup(7, 5);
        // Scribble over the depth-1 weights as a sync with disagreeing
        // subscriptions would.
        let children: Vec<BlockHash> = tree.record(tree.root()).children.iter()
            .map(|&c| tree.record(c).hash)
            .collect();
        node.apply_sync(&children[0], 1, 0.8, 1);
        node.apply_sync(&children[1], 1, 0.9, 1);
        assert!(node.validate(&tree).is_err());

        node.adjust_toward_consensus(&tree);
        node.validate(&tree).unwrap();
    }

    #[test]
    fn test_adjust_converges_to_winner_take_all() {
        let (mut node, tree, _) = setup(3, 11);
        for _ in 0..60 {
            node.adjust_toward_consensus(&tree);
            node.validate(&tree).unwrap();
        }

        let children = &tree.record(tree.root()).children;
        let mut weights: Vec<f64> = children.iter()
            .map(|&c| node.weight_for(&tree.record(c).hash).unwrap())
            .collect();
        weights.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(weights, vec![0.0, 1.0]);
    }

    #[test]
    fn test_validate_reports_first_drifting_block() {
        let (mut node, tree, _) = setup(3, 13);
        let children = &tree.record(tree.root()).children;
        let child_hash = tree.record(children[0]).hash;
        let old = node.weight_for(&child_hash).unwrap();
        node.apply_sync(&child_hash, 1, old + 0.5, 1);

        let violation = node.validate(&tree).unwrap_err();
        assert_eq!(violation.node_id, 0);
        assert_eq!(violation.block, root_hash(&tree));
        assert!((violation.children_sum - violation.parent_weight - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_validate_is_read_only() {
        let (node, tree, _) = setup(9, 17);
        node.validate(&tree).unwrap();
        node.validate(&tree).unwrap();
    }
}
