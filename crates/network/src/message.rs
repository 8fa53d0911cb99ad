//! Messages exchanged between simulated nodes.

use obelisk_types::NodeIndex;

/// A message in flight between two nodes.
///
/// Messages are pure side-channel traffic: they are scheduled through the
/// delay matrix, delivered by arrival tick, and appended to the recipient's
/// delivered log, but their content never feeds the belief computation.
/// Nodes learn about each other by polling subscriptions directly. This is
/// deliberate compatibility with the modeled protocol, not an omission.
///
/// Direction is also deliberate: a node greets the nodes it subscribes to
/// (its information sources), not the nodes subscribed to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Sending node.
    pub from: NodeIndex,
    /// Receiving node.
    pub to: NodeIndex,
    /// Tick at which the message was sent.
    pub sent_tick: u64,
    /// Tick at which the message becomes deliverable.
    pub arrival_tick: u64,
    /// Human-readable payload. Informational only.
    pub payload: String,
}

impl Message {
    /// Construct a message scheduled to arrive `delay` ticks after `sent_tick`.
    pub fn new(
        from: NodeIndex,
        to: NodeIndex,
        sent_tick: u64,
        delay: u64,
        payload: String,
    ) -> Self {
        Self {
            from,
            to,
            sent_tick,
            arrival_tick: sent_tick + delay,
            payload,
        }
    }
}
