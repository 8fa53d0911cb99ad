//! Tick-delayed message delivery between simulated nodes.
//!
//! Models the network as a [`DelayMatrix`] of per-pair tick latencies and a
//! per-node [`Mailbox`] of pending [`Message`]s. The simulation's logical
//! clock drives delivery: a message becomes visible once the global tick
//! reaches its arrival tick.

mod delay;
mod mailbox;
mod message;

pub use delay::DelayMatrix;
pub use mailbox::Mailbox;
pub use message::Message;
