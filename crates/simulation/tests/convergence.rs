//! End-to-end runs: initialization invariants, convergence on small
//! configurations, and the error paths out of `Simulation::new`.

use obelisk_simulation::{
    ConfigError, NodeReport, Outcome, Simulation, SimulationConfig, SimulationError,
};
use obelisk_topology::TopologyPolicy;
use tracing_test::traced_test;

fn small_config(seed: u64) -> SimulationConfig {
    SimulationConfig::new(3, 3)
        .with_subscriber_count(1)
        .with_max_iterations(100_000)
        .with_max_children(2)
        .with_seed(seed)
}

#[traced_test]
#[test]
fn test_small_run_converges() {
    let mut sim = Simulation::new(small_config(7)).unwrap();
    let outcome = sim.run().unwrap();

    assert!(
        matches!(outcome, Outcome::Converged { .. }),
        "expected convergence, got {outcome:?}"
    );
    assert!(sim.check_convergence());

    // Converged weights are exactly 0 or 1 everywhere, and the root still
    // carries the full weight.
    for node in sim.nodes() {
        node.validate(sim.tree()).unwrap();
        for id in sim.tree().all_records() {
            let weight = node.weight_for(&sim.tree().record(id).hash).unwrap();
            assert!(weight == 0.0 || weight == 1.0, "weight {weight} not settled");
        }
        let root_hash = sim.tree().record(sim.tree().root()).hash;
        assert_eq!(node.weight_for(&root_hash), Some(1.0));
    }
}

#[test]
fn test_all_nodes_converge_on_the_same_chain() {
    let mut sim = Simulation::new(small_config(21)).unwrap();
    sim.run().unwrap();

    if sim.check_convergence() {
        let reference = NodeReport::collect(&sim.nodes()[0], sim.tree());
        for node in &sim.nodes()[1..] {
            let report = NodeReport::collect(node, sim.tree());
            for (a, b) in reference.rows.iter().zip(&report.rows) {
                assert_eq!(a.block, b.block);
                assert_eq!(a.weight, b.weight);
            }
        }
    }
}

#[test]
fn test_initialization_satisfies_invariant_on_every_node() {
    let sim = Simulation::new(
        SimulationConfig::new(6, 9)
            .with_subscriber_count(3)
            .with_max_children(2)
            .with_seed(5),
    )
    .unwrap();

    for node in sim.nodes() {
        node.validate(sim.tree()).unwrap();
        assert_eq!(node.subscriptions().len(), 3);
        assert_eq!(node.seq_no(), 0);
    }
    assert_eq!(sim.tick(), 0);
}

#[test]
fn test_annual_ring_topology_run_completes() {
    let mut sim = Simulation::new(
        SimulationConfig::new(5, 5)
            .with_subscriber_count(2)
            .with_max_iterations(100_000)
            .with_max_children(2)
            .with_topology(TopologyPolicy::AnnualRing)
            .with_seed(3),
    )
    .unwrap();

    sim.run().unwrap();
    for node in sim.nodes() {
        node.validate(sim.tree()).unwrap();
    }
}

#[test]
fn test_greetings_are_delivered() {
    let mut sim = Simulation::new(small_config(11)).unwrap();
    sim.run().unwrap();

    // Every activation greets each subscription, so traffic must exist.
    let total: usize = sim
        .nodes()
        .iter()
        .map(|n| n.delivered().len() + n.pending_messages())
        .sum();
    assert!(total > 0, "no messages moved at all");
}

#[test]
fn test_exhaustion_is_reported_not_an_error() {
    // One iteration cannot converge a fresh three-node run.
    let mut sim = Simulation::new(small_config(9).with_max_iterations(1)).unwrap();
    let outcome = sim.run().unwrap();
    assert_eq!(outcome, Outcome::Exhausted { iterations: 1 });
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    let err = Simulation::new(small_config(1).with_subscriber_count(5)).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Config(ConfigError::BadSubscriberCount { .. })
    ));
}
