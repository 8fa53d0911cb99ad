//! Plain-text rendering of belief tables and run outcomes.

use obelisk_simulation::{NodeReport, Outcome};
use obelisk_types::BlockHash;

/// Hex prefix length used when printing block hashes in tables.
const SHORT_HASH_LEN: usize = 16;

fn short(hash: &BlockHash) -> String {
    let hex = hash.to_hex();
    hex[..SHORT_HASH_LEN].to_string()
}

/// Render one node's belief table, rows in breadth-first tree order.
pub fn render_belief_table(report: &NodeReport) -> String {
    let mut out = format!(
        "node {} (pub {:?}) seqNo {} subscriptions {:?} delivered {}\n",
        report.node,
        report.public_id,
        report.seq_no,
        report.subscriptions,
        report.delivered.len()
    );
    out.push_str(&format!(
        "  {:<16} {:<16} {:>7} {:>13} {:>10}\n",
        "block", "parent", "seqNo", "lastSyncTick", "weight"
    ));
    for row in &report.rows {
        let parent = row.parent.as_ref().map(short).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "  {:<16} {:<16} {:>7} {:>13} {:>10.6}\n",
            short(&row.block),
            parent,
            row.seq_no,
            row.last_sync_tick,
            row.weight
        ));
    }
    out
}

/// One-line summary of how the run ended.
pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Converged { iteration } => {
            format!("consensus reached after {iteration} iterations")
        }
        Outcome::Exhausted { iterations } => {
            format!("no consensus after {iterations} iterations")
        }
    }
}
