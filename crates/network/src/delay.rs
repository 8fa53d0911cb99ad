//! Pairwise communication latency.

use obelisk_types::NodeIndex;
use std::collections::HashMap;

/// Tick delay for messages between each ordered pair of nodes.
///
/// Built once at initialization. Today every pair gets the same constant
/// delay, but the shape admits arbitrary per-pair latencies.
#[derive(Debug, Clone)]
pub struct DelayMatrix {
    delays: HashMap<(NodeIndex, NodeIndex), u64>,
}

impl DelayMatrix {
    /// Build a matrix with the same `delay` for every ordered pair of
    /// `node_count` nodes.
    pub fn constant(node_count: NodeIndex, delay: u64) -> Self {
        let mut delays = HashMap::new();
        for from in 0..node_count {
            for to in 0..node_count {
                delays.insert((from, to), delay);
            }
        }
        Self { delays }
    }

    /// Delay in ticks for a message from `from` to `to`.
    pub fn delay(&self, from: NodeIndex, to: NodeIndex) -> u64 {
        self.delays.get(&(from, to)).copied().unwrap_or(0)
    }
}
