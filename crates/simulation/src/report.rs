//! Read-only state snapshots for display.

use obelisk_network::Message;
use obelisk_node::NodeState;
use obelisk_types::{BlockHash, BlockTree, NodeIndex, PublicId};

/// One node's belief about one block, flattened for printing.
#[derive(Debug, Clone, PartialEq)]
pub struct BeliefRow {
    pub block: BlockHash,
    /// Parent block, `None` for the root.
    pub parent: Option<BlockHash>,
    pub seq_no: u64,
    pub last_sync_tick: u64,
    pub weight: f64,
}

/// Snapshot of one node's externally visible state: identity, subscription
/// list, delivered-message log, and the full belief table in breadth-first
/// tree order so tables from different nodes line up.
#[derive(Debug, Clone)]
pub struct NodeReport {
    pub node: NodeIndex,
    pub public_id: PublicId,
    pub seq_no: u64,
    pub subscriptions: Vec<NodeIndex>,
    pub delivered: Vec<Message>,
    pub rows: Vec<BeliefRow>,
}

impl NodeReport {
    /// Capture `node`'s state over `tree`.
    pub fn collect(node: &NodeState, tree: &BlockTree) -> Self {
        let rows = tree
            .all_records()
            .iter()
            .map(|&id| {
                let record = tree.record(id);
                let (seq_no, last_sync_tick, weight) = match node.belief(&record.hash) {
                    Some(belief) => (belief.seq_no, belief.last_sync_tick, belief.weight),
                    None => (0, 0, 0.0),
                };
                BeliefRow {
                    block: record.hash,
                    parent: record.parent.map(|p| tree.record(p).hash),
                    seq_no,
                    last_sync_tick,
                    weight,
                }
            })
            .collect();

        Self {
            node: node.id(),
            public_id: *node.public_id(),
            seq_no: node.seq_no(),
            subscriptions: node.subscriptions().to_vec(),
            delivered: node.delivered().to_vec(),
            rows,
        }
    }
}
