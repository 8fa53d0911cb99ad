//! Per-node belief state and the consensus steps applied on activation.
//!
//! A node's life is: seed beliefs over the shared tree once, then on every
//! activation pull weights from its subscriptions, average them in, and
//! nudge each sibling group toward a winner-take-all split. The flow
//! invariant, parent weight equals the sum of child weights, is validated
//! after every activation.

mod belief;
mod state;

pub use belief::Belief;
pub use state::{
    InvariantViolation, NodeState, CONSENSUS_APPROACH_FACTOR, WEIGHT_INIT_FACTOR,
    WEIGHT_TOLERANCE,
};
