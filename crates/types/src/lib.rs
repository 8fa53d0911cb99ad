//! Core types for the Obelisk consensus simulator.
//!
//! The simulator models a gossiping population of nodes converging on a
//! single path through a shared tree of candidate blocks. This crate holds
//! the pieces every other crate agrees on: opaque identifiers and the
//! shared [`BlockTree`].

mod block_tree;
mod hash;
mod identifiers;

pub use block_tree::{BlockId, BlockRecord, BlockTree, TreeError};
pub use hash::BlockHash;
pub use identifiers::{NodeIndex, PublicId};
