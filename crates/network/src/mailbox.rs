//! Per-node inbound message queue.

use crate::Message;

/// Pending inbound messages for one node, sorted by arrival tick.
///
/// Each node owns exactly one mailbox; it is only mutated during that
/// node's own activation (draining) or when a peer's activation enqueues
/// a message. The scheduler serializes activations, so no locking is
/// needed.
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    messages: Vec<Message>,
}

impl Mailbox {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a message, keeping arrival-tick order.
    ///
    /// The sort is stable, so messages with equal arrival ticks keep their
    /// insertion order. O(n log n) per push is fine at simulation scale.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.messages.sort_by_key(|m| m.arrival_tick);
    }

    /// Remove and return every message due at or before `current_tick`.
    ///
    /// Returned in arrival-tick order. Messages already popped are gone;
    /// calling again with the same tick returns nothing new.
    pub fn pop_due(&mut self, current_tick: u64) -> Vec<Message> {
        let due = self
            .messages
            .iter()
            .take_while(|m| m.arrival_tick <= current_tick)
            .count();
        self.messages.drain(..due).collect()
    }

    /// Number of pending messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no messages are pending.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
