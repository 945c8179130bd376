//! Anytime heuristic-backtracking search engine.
//!
//! Single-threaded and synchronous; interruptible but not preemptive. Polls
//! the wall clock at each recursive entry and at the top of the candidate
//! loop, nowhere else.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::{
    candidate,
    footprint::Footprint,
    grid::{CarrierGrid, GridSnapshot},
    record::{CarrierDimensions, PlacementRecord},
};

/// Tunable knobs for a search run, separate from the carrier's own
/// structural parameters.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    /// Wall-clock budget for the whole search.
    pub max_time: Duration,
    /// Cap on candidates considered per block per depth (`None` = unbounded).
    pub candidate_limit: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_time: Duration::from_secs(5),
            candidate_limit: None,
        }
    }
}

/// Tracks the best-so-far solution across the recursive search.
struct BestSoFar {
    placed_count: usize,
    score: f64,
    snapshot: GridSnapshot,
}

/// Mutable search state threaded through the recursion.
struct SearchState<'a> {
    grid: CarrierGrid,
    blocks: &'a [Footprint],
    start: Instant,
    deadline: Duration,
    candidate_limit: Option<usize>,
    best: BestSoFar,
}

/// Objective value: `(placed_count, score)`, compared lexicographically.
fn objective(grid: &CarrierGrid) -> (usize, f64) {
    let (placed_count, utilisation) = grid.score();
    // total is recovered by the caller; see `run`, which closes over it via
    // `SearchState::blocks.len()`.
    (placed_count, utilisation)
}

impl SearchState<'_> {
    fn elapsed_exceeds_budget(&self) -> bool {
        self.start.elapsed() > self.deadline
    }

    fn total(&self) -> usize {
        self.blocks.len()
    }

    fn current_score(&self) -> f64 {
        let (placed_count, utilisation) = self.grid.score();
        if self.total() == 0 {
            return 1.0;
        }
        0.7 * (placed_count as f64 / self.total() as f64) + 0.3 * utilisation
    }

    fn maybe_record_best(&mut self) {
        let (placed_count, _) = objective(&self.grid);
        let score = self.current_score();
        if (placed_count, score) > (self.best.placed_count, self.best.score) {
            self.best = BestSoFar {
                placed_count,
                score,
                snapshot: self.grid.snapshot(),
            };
            info!(
                depth_placed = placed_count,
                score, elapsed_s = self.start.elapsed().as_secs_f64(), "new best-so-far"
            );
        }
    }

    /// Recursive step at depth `d`, placing or skipping `self.blocks[d]`.
    fn recurse(&mut self, d: usize) {
        if self.elapsed_exceeds_budget() {
            return;
        }
        self.maybe_record_best();

        if d == self.blocks.len() {
            return;
        }

        // pruning: can this subtree possibly beat the best block-count?
        let (placed_count, _) = self.grid.score();
        let remaining = self.blocks.len() - d;
        if placed_count + remaining < self.best.placed_count {
            return;
        }

        let block = &self.blocks[d];
        let is_first = d == 0;
        let candidates = candidate::generate(&self.grid, block, self.candidate_limit, is_first);

        debug!(depth = d, block = block.id(), candidates = candidates.len(), "expanding depth");

        for c in &candidates {
            if self.elapsed_exceeds_budget() {
                return;
            }
            if self.grid.place(block, c.rotation, c.x, c.y) {
                self.recurse(d + 1);
                self.grid.remove(block.id());
            }
        }

        // skip branch: essential for partial solutions; without it the
        // search returns nothing on an infeasible instance
        self.recurse(d + 1);
    }
}

/// Runs a full search over `blocks` against a fresh `grid`, returning the
/// best-so-far [`PlacementRecord`] found within `options.max_time`.
///
/// `blocks` must already be sorted in search order (widest first, then
/// largest area, then densest, then by id); [`order_blocks`] produces that
/// order.
pub fn search(grid: CarrierGrid, ship_name: &str, blocks: &[Footprint], options: SearchOptions) -> PlacementRecord {
    let start = Instant::now();
    let carrier_dimensions = CarrierDimensions {
        width: grid.width(),
        height: grid.height(),
    };

    let mut state = SearchState {
        best: BestSoFar {
            placed_count: 0,
            score: if blocks.is_empty() { 1.0 } else { 0.0 },
            snapshot: grid.snapshot(),
        },
        grid,
        blocks,
        start,
        deadline: options.max_time,
        candidate_limit: options.candidate_limit,
    };

    state.recurse(0);

    let placed_ids: std::collections::HashSet<&str> =
        state.best.snapshot.poses.iter().map(|p| p.block_id.as_str()).collect();
    let mut unplaced_ids: Vec<String> = blocks
        .iter()
        .map(Footprint::id)
        .filter(|id| !placed_ids.contains(id))
        .map(str::to_string)
        .collect();
    unplaced_ids.sort();

    PlacementRecord {
        ship_name: ship_name.to_string(),
        carrier_dimensions,
        placed: state.best.snapshot.poses,
        unplaced_ids,
        score: state.best.score,
        placed_count: state.best.placed_count,
        total_count: blocks.len(),
        elapsed_seconds: start.elapsed().as_secs_f64(),
    }
}

/// Sorts footprints into the canonical search order: widest first, then
/// largest area, then densest, then by id.
pub fn order_blocks(mut blocks: Vec<Footprint>) -> Vec<Footprint> {
    blocks.sort();
    blocks
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::Cell;

    fn solid(id: &str, w: i32, h: i32) -> Footprint {
        let mut cells: Vec<Cell> = Vec::new();
        for x in 0..w {
            for y in 0..h {
                cells.push((x, y, (0, 1, 0)));
            }
        }
        Footprint::new(id, &cells).unwrap()
    }

    fn opts(seconds: f64) -> SearchOptions {
        SearchOptions {
            max_time: Duration::from_secs_f64(seconds),
            candidate_limit: None,
        }
    }

    #[test]
    fn s1_single_block_fills_grid() {
        let grid = CarrierGrid::new(10, 10, 0, 0, 0, 0).unwrap();
        let blocks = order_blocks(vec![solid("A", 10, 10)]);
        let record = search(grid, "ship", &blocks, opts(1.0));
        assert_eq!(record.placed_count, 1);
        assert!(record.complete());
        assert_eq!(record.placed[0].x, 0);
        assert_eq!(record.placed[0].y, 0);
    }

    #[test]
    fn s2_two_blocks_widest_first_bottom_bias() {
        let grid = CarrierGrid::new(10, 5, 0, 0, 0, 0).unwrap();
        let blocks = order_blocks(vec![solid("A", 5, 5), solid("B", 5, 5)]);
        let record = search(grid, "ship", &blocks, opts(1.0));
        assert_eq!(record.placed_count, 2);
        assert!(record.complete());
    }

    #[test]
    fn s3_clearance_forbids_both() {
        let grid = CarrierGrid::new(10, 5, 0, 0, 0, 1).unwrap();
        let blocks = order_blocks(vec![solid("A", 5, 5), solid("B", 5, 5)]);
        let record = search(grid, "ship", &blocks, opts(1.0));
        assert_eq!(record.placed_count, 1);
    }

    #[test]
    fn s4_rotation_required_for_one() {
        // A (5x4) takes the full width at the top, leaving a 5x3 strip below
        // it. B is 3x5 unrotated, which cannot fit that strip at all (needs
        // height 5); only its 90-degree rotation (5x3) fits, so a complete
        // packing is reachable only if the search rotates B.
        let grid = CarrierGrid::new(5, 7, 0, 0, 0, 0).unwrap();
        let blocks = order_blocks(vec![solid("A", 5, 4), solid("B", 3, 5)]);
        let record = search(grid, "ship", &blocks, opts(1.0));
        assert_eq!(record.placed_count, 2);
    }

    /// An L-pentomino in a 3x3 bounding box: a vertical leg down the left
    /// edge plus a horizontal leg along the top, 5 of the 9 cells filled.
    fn l_shape(id: &str) -> Footprint {
        let cells: Vec<Cell> = vec![
            (0, 0, (0, 1, 0)),
            (1, 0, (0, 1, 0)),
            (2, 0, (0, 1, 0)),
            (0, 1, (0, 1, 0)),
            (0, 2, (0, 1, 0)),
        ];
        Footprint::new(id, &cells).unwrap()
    }

    #[test]
    fn s6_l_shaped_footprints_pack_by_cells_not_bounding_box() {
        let grid = CarrierGrid::new(6, 6, 0, 0, 0, 0).unwrap();
        let blocks = order_blocks(vec![l_shape("A"), l_shape("B"), l_shape("C")]);
        let record = search(grid, "ship", &blocks, opts(2.0));
        assert_eq!(record.placed_count, 3);
        assert!(record.complete());
    }

    #[test]
    fn s5_margins_limit_to_one() {
        let grid = CarrierGrid::new(12, 4, 2, 2, 0, 0).unwrap();
        let blocks = order_blocks(vec![solid("A", 5, 4), solid("B", 5, 4)]);
        let record = search(grid, "ship", &blocks, opts(1.0));
        assert_eq!(record.placed_count, 1);
    }

    #[test]
    fn empty_block_list_is_complete() {
        let grid = CarrierGrid::new(5, 5, 0, 0, 0, 0).unwrap();
        let blocks: Vec<Footprint> = Vec::new();
        let record = search(grid, "ship", &blocks, opts(1.0));
        assert_eq!(record.placed_count, 0);
        assert!(record.complete());
        assert_eq!(record.score, 1.0);
    }

    #[test]
    fn oversized_single_block_is_unplaced() {
        let grid = CarrierGrid::new(5, 5, 0, 0, 0, 0).unwrap();
        let blocks = order_blocks(vec![solid("A", 10, 10)]);
        let record = search(grid, "ship", &blocks, opts(1.0));
        assert_eq!(record.placed_count, 0);
        assert!(!record.complete());
        assert_eq!(record.unplaced_ids, vec!["A".to_string()]);
    }

    #[test]
    fn zero_time_budget_returns_well_formed_record() {
        let grid = CarrierGrid::new(5, 5, 0, 0, 0, 0).unwrap();
        let blocks = order_blocks(vec![solid("A", 3, 3)]);
        let record = search(grid, "ship", &blocks, opts(0.0));
        assert!(record.placed_count <= 1);
        assert_eq!(record.placed_count + record.unplaced_ids.len(), 1);
    }

    #[test]
    fn deterministic_across_runs() {
        let blocks_a = order_blocks(vec![solid("A", 3, 3), solid("B", 2, 2), solid("C", 4, 1)]);
        let grid_a = CarrierGrid::new(10, 10, 0, 0, 0, 0).unwrap();
        let record_a = search(grid_a, "ship", &blocks_a, opts(2.0));

        let blocks_b = order_blocks(vec![solid("C", 4, 1), solid("A", 3, 3), solid("B", 2, 2)]);
        let grid_b = CarrierGrid::new(10, 10, 0, 0, 0, 0).unwrap();
        let record_b = search(grid_b, "ship", &blocks_b, opts(2.0));

        assert_eq!(record_a.placed, record_b.placed);
        assert_eq!(record_a.placed_count, record_b.placed_count);
    }
}
