//! Deterministic simulation driver.
//!
//! Owns the shared tree, the roster, the delay matrix, and the single RNG
//! that feeds every random decision. Activations are serialized: each
//! iteration picks one node, advances the clock one tick, and runs that
//! node's full activation inline, so a given seed replays exactly.

use crate::{ConfigError, NodeReport, SimulationConfig};
use obelisk_network::{DelayMatrix, Message};
use obelisk_node::{InvariantViolation, NodeState};
use obelisk_topology::select_subscriptions;
use obelisk_types::{BlockHash, BlockTree, NodeIndex, TreeError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info, trace};

/// Why a simulation could not start or had to stop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("block tree construction failed: {0}")]
    Tree(#[from] TreeError),

    /// A node's weights stopped forming a flow over the tree. Iteration 0
    /// means the violation was detected right after initialization.
    #[error("iteration {iteration}: {violation}")]
    Invariant {
        iteration: u64,
        violation: InvariantViolation,
    },
}

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every node agrees on a single chain through the tree.
    Converged { iteration: u64 },
    /// The iteration budget ran out first.
    Exhausted { iterations: u64 },
}

/// One simulation run.
///
/// Created fully initialized: tree built, subscriptions wired, beliefs
/// seeded and validated. [`Simulation::run`] then consumes the iteration
/// budget. State stays inspectable afterwards for reporting.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    tree: BlockTree,
    delays: DelayMatrix,
    nodes: Vec<NodeState>,
    rng: ChaCha8Rng,
    tick: u64,
}

impl Simulation {
    /// Build and initialize a run from `config`.
    ///
    /// All randomness, tree shape, public ids, subscription choices and
    /// belief seeding, is drawn from one RNG seeded with `config.seed`.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let tree =
            BlockTree::build_random(config.total_blocks, config.max_children_per_record, &mut rng)?;
        let delays = DelayMatrix::constant(config.node_count, 1);

        let mut nodes: Vec<NodeState> = (0..config.node_count)
            .map(|id| NodeState::new(id, &mut rng))
            .collect();

        for node in &mut nodes {
            let subscriptions = select_subscriptions(
                config.topology,
                &mut rng,
                node.id(),
                config.node_count,
                config.subscriber_count,
            );
            trace!(node = node.id(), ?subscriptions, "subscriptions assigned");
            node.set_subscriptions(subscriptions);
            node.initialize_beliefs(&tree, &mut rng);
        }

        for node in &nodes {
            node.validate(&tree).map_err(|violation| {
                SimulationError::Invariant {
                    iteration: 0,
                    violation,
                }
            })?;
        }

        info!(
            nodes = config.node_count,
            subscribers = config.subscriber_count,
            blocks = config.total_blocks,
            max_children = config.max_children_per_record,
            topology = ?config.topology,
            seed = config.seed,
            "simulation initialized"
        );

        Ok(Self {
            config,
            tree,
            delays,
            nodes,
            rng,
            tick: 0,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tree(&self) -> &BlockTree {
        &self.tree
    }

    /// Current logical time.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn node(&self, id: NodeIndex) -> Option<&NodeState> {
        self.nodes.get(id as usize)
    }

    pub fn nodes(&self) -> &[NodeState] {
        &self.nodes
    }

    /// Snapshot one node's state for display.
    pub fn node_report(&self, id: NodeIndex) -> Option<NodeReport> {
        self.node(id).map(|node| NodeReport::collect(node, &self.tree))
    }

    /// Snapshot every node, in roster order.
    pub fn reports(&self) -> Vec<NodeReport> {
        self.nodes
            .iter()
            .map(|node| NodeReport::collect(node, &self.tree))
            .collect()
    }

    /// Run activations until convergence or the iteration budget is spent.
    pub fn run(&mut self) -> Result<Outcome, SimulationError> {
        for iteration in 1..=self.config.max_iterations {
            let idx = self.rng.gen_range(0..self.nodes.len());
            self.tick += 1;
            self.activate(idx, iteration)?;

            if self.check_convergence() {
                info!(iteration, tick = self.tick, "consensus reached");
                return Ok(Outcome::Converged { iteration });
            }
        }

        info!(
            iterations = self.config.max_iterations,
            tick = self.tick,
            "iteration budget exhausted without consensus"
        );
        Ok(Outcome::Exhausted {
            iterations: self.config.max_iterations,
        })
    }

    /// One node activation: drain mail, sync with subscriptions, adjust,
    /// greet, validate.
    fn activate(&mut self, idx: usize, iteration: u64) -> Result<(), SimulationError> {
        let tick = self.tick;
        let delivered = self.nodes[idx].begin_activation(tick);

        // Pull-average every block from the subscriptions. The node's own
        // prior weight is not part of the average; the follow-up adjustment
        // re-anchors the table to the tree invariant.
        let updates: Vec<(BlockHash, u64, f64)> = {
            let node = &self.nodes[idx];
            self.tree
                .all_records()
                .iter()
                .map(|&id| {
                    let hash = self.tree.record(id).hash;
                    let mut sum = 0.0;
                    let mut count = 0u32;
                    let mut max_seq = 0;
                    for &sub in node.subscriptions() {
                        let peer = &self.nodes[sub as usize];
                        if let Some(weight) = peer.weight_for(&hash) {
                            sum += weight;
                            count += 1;
                            max_seq = max_seq.max(peer.seq_no());
                        }
                    }
                    let weight = if count == 0 { 0.0 } else { sum / count as f64 };
                    (hash, max_seq, weight)
                })
                .collect()
        };

        let node = &mut self.nodes[idx];
        for (hash, seq_no, weight) in &updates {
            node.apply_sync(hash, *seq_no, *weight, tick);
        }
        node.adjust_toward_consensus(&self.tree);

        let from = node.id();
        let subscriptions = node.subscriptions().to_vec();
        for to in subscriptions {
            let delay = self.delays.delay(from, to);
            let message = Message::new(from, to, tick, delay, format!("hello from node {from}"));
            self.nodes[to as usize].enqueue(message);
        }

        debug!(node = from, tick, iteration, delivered, "node activated");

        self.nodes[idx]
            .validate(&self.tree)
            .map_err(|violation| SimulationError::Invariant {
                iteration,
                violation,
            })
    }

    /// Consensus holds when every block's weight is exactly 0.0 or 1.0 and
    /// identical across all nodes. Exact comparison is intentional: the
    /// adjustment step clamps weights onto those exact values.
    pub fn check_convergence(&self) -> bool {
        for id in self.tree.all_records() {
            let hash = self.tree.record(id).hash;
            let reference = match self.nodes[0].weight_for(&hash) {
                Some(weight) if weight == 0.0 || weight == 1.0 => weight,
                _ => return false,
            };
            for node in &self.nodes[1..] {
                if node.weight_for(&hash) != Some(reference) {
                    return false;
                }
            }
        }
        true
    }
}
