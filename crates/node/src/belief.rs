//! One node's opinion about one block.

use obelisk_types::BlockId;

/// A node's belief about a single block in the shared tree.
///
/// `weight` is the node's estimate that this block ends up on the accepted
/// chain. At every point the weights a node holds form a flow over the
/// tree: the root carries 1.0 and every record's weight equals the sum of
/// its children's weights.
#[derive(Debug, Clone, PartialEq)]
pub struct Belief {
    /// Record this belief is about.
    pub block: BlockId,
    /// Highest activation counter observed among subscriptions holding
    /// this block, as of the last sync.
    pub seq_no: u64,
    /// Tick of the last sync that touched this belief.
    pub last_sync_tick: u64,
    /// Estimated probability of acceptance, in `[0, 1]`.
    pub weight: f64,
}

impl Belief {
    /// A fresh belief with zero weight and no sync history.
    pub fn new(block: BlockId) -> Self {
        Self {
            block,
            seq_no: 0,
            last_sync_tick: 0,
            weight: 0.0,
        }
    }
}
