//! Deterministic gossip consensus simulation.
//!
//! Wires the shared block tree, the subscription topology, the delayed
//! message network, and the per-node consensus steps into a single-threaded
//! driver. Given the same configuration and seed, a run replays exactly.

mod config;
mod report;
mod runner;

pub use config::{ConfigError, SimulationConfig};
pub use report::{BeliefRow, NodeReport};
pub use runner::{Outcome, Simulation, SimulationError};
