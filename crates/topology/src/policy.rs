//! Subscription selection policies.

use crate::NodeGrid;
use obelisk_types::NodeIndex;
use rand::Rng;
use std::str::FromStr;
use thiserror::Error;

/// How the ring half-width grows between annual-ring scan passes.
const RING_WIDTH_STEP: f64 = 0.1;

/// How a node's gossip partners are chosen at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TopologyPolicy {
    /// Draw uniformly random distinct peers.
    UniformRandom,
    /// Scan expanding distance bands on a randomly populated grid.
    #[default]
    AnnualRing,
}

/// Error parsing a policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown topology policy {0:?} (expected \"uniform\" or \"annual-ring\")")]
pub struct ParsePolicyError(String);

impl FromStr for TopologyPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uniform" | "uniform-random" => Ok(Self::UniformRandom),
            "annual-ring" | "ring" => Ok(Self::AnnualRing),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// Select `subscriber_count` subscriptions for `center` under `policy`.
///
/// Requires `subscriber_count < node_count`; the simulation config
/// validates this before any selection runs.
pub fn select_subscriptions<R: Rng>(
    policy: TopologyPolicy,
    rng: &mut R,
    center: NodeIndex,
    node_count: NodeIndex,
    subscriber_count: usize,
) -> Vec<NodeIndex> {
    match policy {
        TopologyPolicy::UniformRandom => {
            uniform_random(rng, center, node_count, subscriber_count)
        }
        TopologyPolicy::AnnualRing => annual_ring(rng, center, node_count, subscriber_count),
    }
}

/// Uniform-random policy: redraw until `subscriber_count` distinct peers
/// other than `center` are collected.
pub fn uniform_random<R: Rng>(
    rng: &mut R,
    center: NodeIndex,
    node_count: NodeIndex,
    subscriber_count: usize,
) -> Vec<NodeIndex> {
    let mut subscriptions = Vec::with_capacity(subscriber_count);

    while subscriptions.len() < subscriber_count {
        let candidate = rng.gen_range(0..node_count);
        if candidate != center && !subscriptions.contains(&candidate) {
            subscriptions.push(candidate);
        }
    }

    subscriptions
}

/// Annual-ring policy: place all other nodes on a random grid, then sweep
/// a widening distance band centered at the reference radius (the grid
/// side length) until enough peers fall inside it.
pub fn annual_ring<R: Rng>(
    rng: &mut R,
    center: NodeIndex,
    node_count: NodeIndex,
    subscriber_count: usize,
) -> Vec<NodeIndex> {
    let grid = NodeGrid::populate(rng, center, node_count);
    let side = grid.side() as f64;

    let mut subscriptions = Vec::with_capacity(subscriber_count);
    let mut ratio = 0.0;

    'widen: while subscriptions.len() < subscriber_count {
        ratio += RING_WIDTH_STEP;
        let half_width = side * ratio / 2.0;
        let inner = side - half_width;
        let outer = side + half_width;

        for row in 0..grid.side() {
            for col in 0..grid.side() {
                let Some(occupant) = grid.get(row, col) else {
                    continue;
                };
                let distance = ((row * row + col * col) as f64).sqrt();
                if distance >= inner
                    && distance <= outer
                    && !subscriptions.contains(&occupant)
                {
                    subscriptions.push(occupant);
                    if subscriptions.len() == subscriber_count {
                        break 'widen;
                    }
                }
            }
        }
    }

    subscriptions
}
