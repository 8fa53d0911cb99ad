//! Simulation parameters and their validation.

use obelisk_topology::TopologyPolicy;
use thiserror::Error;

/// A configuration value outside the supported range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Fewer than three nodes leaves nothing to gossip about.
    #[error("node count must be at least 3, got {0}")]
    TooFewNodes(u32),

    /// Every node needs at least one subscription, and fewer peers exist
    /// than nodes.
    #[error("subscriber count must be between 1 and {nodes} - 1, got {subscribers}")]
    BadSubscriberCount {
        subscribers: usize,
        nodes: u32,
    },

    /// A run of zero iterations can never converge.
    #[error("iteration budget must be at least 1, got {0}")]
    NoIterationBudget(u64),

    /// The tree needs a root and at least one sibling pair to disagree over.
    #[error("total blocks must be at least 3, got {0}")]
    TooFewBlocks(usize),

    /// Branching below 2 makes a chain; at or above the block count the
    /// tree degenerates to a star.
    #[error("max children must be between 2 and {blocks} - 1, got {max_children}")]
    BadBranching {
        max_children: usize,
        blocks: usize,
    },
}

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of simulated nodes.
    pub node_count: u32,
    /// Subscriptions per node.
    pub subscriber_count: usize,
    /// Activation budget before the run is declared exhausted.
    pub max_iterations: u64,
    /// Records in the shared block tree.
    pub total_blocks: usize,
    /// Maximum children per tree record.
    pub max_children_per_record: usize,
    /// How subscriptions are chosen.
    pub topology: TopologyPolicy,
    /// Seed for every random decision in the run.
    pub seed: u64,
}

impl SimulationConfig {
    /// A config with workable defaults for everything but the roster and
    /// tree sizes.
    pub fn new(node_count: u32, total_blocks: usize) -> Self {
        Self {
            node_count,
            subscriber_count: 2,
            max_iterations: 100_000,
            total_blocks,
            max_children_per_record: 3,
            topology: TopologyPolicy::default(),
            seed: 0,
        }
    }

    pub fn with_subscriber_count(mut self, subscriber_count: usize) -> Self {
        self.subscriber_count = subscriber_count;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_children(mut self, max_children_per_record: usize) -> Self {
        self.max_children_per_record = max_children_per_record;
        self
    }

    pub fn with_topology(mut self, topology: TopologyPolicy) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every parameter range. Called once before a run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_count < 3 {
            return Err(ConfigError::TooFewNodes(self.node_count));
        }
        if self.subscriber_count < 1 || self.subscriber_count >= self.node_count as usize {
            return Err(ConfigError::BadSubscriberCount {
                subscribers: self.subscriber_count,
                nodes: self.node_count,
            });
        }
        if self.max_iterations < 1 {
            return Err(ConfigError::NoIterationBudget(self.max_iterations));
        }
        if self.total_blocks < 3 {
            return Err(ConfigError::TooFewBlocks(self.total_blocks));
        }
        if self.max_children_per_record < 2
            || self.max_children_per_record >= self.total_blocks
        {
            return Err(ConfigError::BadBranching {
                max_children: self.max_children_per_record,
                blocks: self.total_blocks,
            });
        }
        Ok(())
    }
}
