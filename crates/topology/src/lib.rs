//! Subscription topology construction.
//!
//! Decides who gossips with whom. Two policies exist: plain uniform-random
//! peer selection, and the annual-ring policy, which places all other nodes
//! on a random square grid and admits peers band by band as an annulus
//! around the reference radius widens.

mod grid;
mod policy;

pub use grid::NodeGrid;
pub use policy::{
    annual_ring, select_subscriptions, uniform_random, ParsePolicyError, TopologyPolicy,
};
