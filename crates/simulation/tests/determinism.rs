//! Replay determinism: the same seed must produce the same run, tick for
//! tick and weight for weight.

use obelisk_simulation::{BeliefRow, NodeReport, Simulation, SimulationConfig};
use obelisk_topology::TopologyPolicy;

fn test_config(seed: u64) -> SimulationConfig {
    SimulationConfig::new(4, 5)
        .with_subscriber_count(2)
        .with_max_iterations(50_000)
        .with_max_children(2)
        .with_topology(TopologyPolicy::UniformRandom)
        .with_seed(seed)
}

fn belief_tables(sim: &Simulation) -> Vec<Vec<BeliefRow>> {
    sim.nodes()
        .iter()
        .map(|node| NodeReport::collect(node, sim.tree()).rows)
        .collect()
}

#[test]
fn test_same_seed_replays_exactly() {
    let mut first = Simulation::new(test_config(1234)).unwrap();
    let outcome1 = first.run().unwrap();

    let mut second = Simulation::new(test_config(1234)).unwrap();
    let outcome2 = second.run().unwrap();

    assert_eq!(outcome1, outcome2);
    assert_eq!(first.tick(), second.tick());
    assert_eq!(belief_tables(&first), belief_tables(&second));
}

#[test]
fn test_same_seed_builds_same_tree() {
    let first = Simulation::new(test_config(42)).unwrap();
    let second = Simulation::new(test_config(42)).unwrap();

    let hashes = |sim: &Simulation| -> Vec<_> {
        sim.tree()
            .all_records()
            .iter()
            .map(|&id| sim.tree().record(id).hash)
            .collect()
    };
    assert_eq!(hashes(&first), hashes(&second));
}

#[test]
fn test_different_seeds_build_different_trees() {
    let first = Simulation::new(test_config(1)).unwrap();
    let second = Simulation::new(test_config(2)).unwrap();

    let root = |sim: &Simulation| sim.tree().record(sim.tree().root()).hash;
    assert_ne!(root(&first), root(&second));
}

#[test]
fn test_initial_state_is_deterministic_before_running() {
    // Initialization alone consumes randomness; the belief tables it
    // produces must already match across runs.
    let first = Simulation::new(test_config(7)).unwrap();
    let second = Simulation::new(test_config(7)).unwrap();

    assert_eq!(belief_tables(&first), belief_tables(&second));
    for (a, b) in first.nodes().iter().zip(second.nodes()) {
        assert_eq!(a.subscriptions(), b.subscriptions());
    }
}
