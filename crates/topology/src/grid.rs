//! Random spatial placement used by the annual-ring policy.

use obelisk_types::NodeIndex;
use rand::Rng;

/// A square grid of node placements built around one center node.
///
/// Side length equals the roster size. Every node except the center is
/// placed at a uniformly random unused cell; the center itself never
/// appears in its own grid. Grids are transient: they exist only while one
/// node's subscriptions are being assigned and are discarded afterwards.
#[derive(Debug)]
pub struct NodeGrid {
    side: usize,
    cells: Vec<Option<NodeIndex>>,
}

impl NodeGrid {
    /// Place every node other than `center` on a fresh `node_count` x
    /// `node_count` grid.
    pub fn populate<R: Rng>(rng: &mut R, center: NodeIndex, node_count: NodeIndex) -> Self {
        let side = node_count as usize;
        let mut grid = Self {
            side,
            cells: vec![None; side * side],
        };

        for node in 0..node_count {
            if node == center {
                continue;
            }
            loop {
                let row = rng.gen_range(0..side);
                let col = rng.gen_range(0..side);
                let cell = &mut grid.cells[row * side + col];
                if cell.is_none() {
                    *cell = Some(node);
                    break;
                }
            }
        }

        grid
    }

    /// Side length of the grid.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Occupant of cell (`row`, `col`), if any.
    pub fn get(&self, row: usize, col: usize) -> Option<NodeIndex> {
        self.cells[row * self.side + col]
    }
}
