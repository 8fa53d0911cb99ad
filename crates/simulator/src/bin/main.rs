//! Gossip consensus simulator CLI.
//!
//! Runs one deterministic simulation: builds a random block tree, wires a
//! subscription topology, then activates random nodes until their weight
//! tables settle on a single chain or the iteration budget runs out.
//!
//! # Example
//!
//! ```bash
//! # Fixed seed, annual-ring topology
//! obelisk-sim --nodes 20 --subscribers 4 --blocks 15 --seed 42
//!
//! # Random seed (printed so the run can be replayed)
//! obelisk-sim --nodes 50 --subscribers 6 --blocks 31 --topology uniform
//! ```

use clap::{CommandFactory, Parser};
use obelisk_simulation::{Simulation, SimulationConfig};
use obelisk_simulator::{render_belief_table, render_outcome};
use obelisk_topology::TopologyPolicy;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Gossip consensus simulator. Single-threaded and reproducible when the
/// same seed is used.
#[derive(Parser, Debug)]
#[command(name = "obelisk-sim")]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of nodes
    #[arg(short = 'n', long, default_value = "10")]
    nodes: u32,

    /// Subscriptions per node
    #[arg(short = 's', long, default_value = "3")]
    subscribers: usize,

    /// Maximum node activations before giving up
    #[arg(short = 'i', long, default_value = "100000")]
    iterations: u64,

    /// Number of blocks in the shared tree
    #[arg(short = 'b', long, default_value = "7")]
    blocks: usize,

    /// Maximum children per block
    #[arg(long, default_value = "3")]
    max_children: usize,

    /// Random seed for reproducible results. When omitted, a random seed
    /// is used and printed.
    #[arg(long)]
    seed: Option<u64>,

    /// Subscription topology: "uniform" or "annual-ring"
    #[arg(long, default_value = "annual-ring")]
    topology: TopologyPolicy,

    /// Log node activations as they happen
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "debug"
    } else {
        "warn,obelisk_simulation=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let seed = args.seed.unwrap_or_else(rand::random);

    let config = SimulationConfig::new(args.nodes, args.blocks)
        .with_subscriber_count(args.subscribers)
        .with_max_iterations(args.iterations)
        .with_max_children(args.max_children)
        .with_topology(args.topology)
        .with_seed(seed);

    if let Err(err) = config.validate() {
        eprintln!("error: {err}");
        eprintln!("{}", Args::command().render_usage());
        std::process::exit(2);
    }

    info!(
        nodes = args.nodes,
        subscribers = args.subscribers,
        iterations = args.iterations,
        blocks = args.blocks,
        max_children = args.max_children,
        topology = ?args.topology,
        seed,
        "starting simulation"
    );

    let mut sim = match Simulation::new(config) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    println!("=== Initial beliefs (seed {seed}) ===");
    print_belief_tables(&sim);

    let outcome = match sim.run() {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    println!("\n=== Final beliefs (tick {}) ===", sim.tick());
    print_belief_tables(&sim);

    println!("\n{}", render_outcome(&outcome));
}

fn print_belief_tables(sim: &Simulation) {
    for report in sim.reports() {
        print!("{}", render_belief_table(&report));
    }
}
