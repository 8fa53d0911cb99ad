//! Presentation layer for the `obelisk-sim` binary.

mod render;

pub use render::{render_belief_table, render_outcome};
