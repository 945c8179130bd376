//! Candidate position generator: enumerates and ranks feasible poses for a
//! footprint against the current grid state.

use crate::{
    footprint::{Footprint, Rotation},
    grid::CarrierGrid,
};

/// A ranked candidate placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// X origin.
    pub x: u32,
    /// Y origin.
    pub y: u32,
    /// Rotation.
    pub rotation: Rotation,
    /// Heuristic score in `[0, 1]`, higher is better.
    pub score: f64,
}

/// Scale factor used to convert the heuristic score to a fixed-point integer
/// sort key, so the compound sort is immune to floating-point ordering
/// instability.
const SCORE_SCALE: f64 = 10_000.0;

/// Produces a ranked sequence of candidate poses for `footprint` against the
/// current state of `grid`, capped at `limit` candidates (`None` = unbounded).
///
/// Deterministic given its inputs: enumeration order, tie-breaking, and
/// scoring are all fixed.
pub fn generate(
    grid: &CarrierGrid,
    footprint: &Footprint,
    limit: Option<usize>,
    is_first_block: bool,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let (ix0, iy0, ix1, iy1) = grid.usable_interior();

    if is_first_block {
        for &rotation in footprint.distinct_rotations() {
            for (x, y) in strategic_seeds(grid, footprint, rotation) {
                push_if_feasible(grid, footprint, rotation, x, y, &mut candidates);
            }
        }
    }

    for &rotation in footprint.distinct_rotations() {
        let (w, h) = footprint.bounds(rotation);
        if w > ix1.saturating_sub(ix0) || h > iy1.saturating_sub(iy0) {
            continue;
        }
        let x_min = ix0;
        let x_max = ix1 - w;
        let y_min = iy0;
        let y_max = iy1 - h;
        if x_max < x_min || y_max < y_min {
            continue;
        }

        // high-x first, low-y first
        let mut y = y_min;
        loop {
            let mut x = x_max;
            loop {
                push_if_feasible(grid, footprint, rotation, x, y, &mut candidates);
                if x == x_min {
                    break;
                }
                x -= 1;
            }
            if y == y_max {
                break;
            }
            y += 1;
        }
    }

    candidates.sort_by_key(|c| std::cmp::Reverse(sort_key(c)));
    candidates.dedup_by(|a, b| a.x == b.x && a.y == b.y && a.rotation == b.rotation);

    if let Some(limit) = limit {
        candidates.truncate(limit);
    }
    candidates
}

/// Fixed-point sort key: `(score * SCORE_SCALE, -y, -x, -rotation_rank)`, so
/// that sorting descending on the tuple yields the canonical tie-break
/// order (ascending y, ascending x, rotation 0 before 90) among equal
/// scores.
fn sort_key(c: &Candidate) -> (i64, i64, i64, i64) {
    let rotation_rank = match c.rotation {
        Rotation::R0 => 0,
        Rotation::R90 => 1,
    };
    (
        (c.score * SCORE_SCALE).round() as i64,
        -i64::from(c.y),
        -i64::from(c.x),
        -rotation_rank,
    )
}

fn push_if_feasible(
    grid: &CarrierGrid,
    footprint: &Footprint,
    rotation: Rotation,
    x: u32,
    y: u32,
    out: &mut Vec<Candidate>,
) {
    if !grid.can_place(footprint, rotation, x, y) {
        return;
    }
    out.push(Candidate {
        x,
        y,
        rotation,
        score: score(grid, footprint, rotation, x, y),
    });
}

/// The four corners of the usable interior plus the interior midline, used
/// to seed the very first placement on an empty grid.
fn strategic_seeds(grid: &CarrierGrid, footprint: &Footprint, rotation: Rotation) -> Vec<(u32, u32)> {
    let (ix0, iy0, ix1, iy1) = grid.usable_interior();
    let (w, h) = footprint.bounds(rotation);
    if w > ix1.saturating_sub(ix0) || h > iy1.saturating_sub(iy0) {
        return Vec::new();
    }
    let x_max = ix1 - w;
    let y_max = iy1 - h;
    let x_mid = ix0 + (x_max.saturating_sub(ix0)) / 2;
    let y_mid = iy0 + (y_max.saturating_sub(iy0)) / 2;

    let mut seeds = vec![(ix0, iy0), (x_max, iy0), (ix0, y_max), (x_max, y_max)];
    seeds.push((x_mid, iy0));
    seeds.push((x_mid, y_max));
    seeds.push((ix0, y_mid));
    seeds.push((x_max, y_mid));
    seeds.sort_unstable();
    seeds.dedup();
    seeds
}

/// Computes the six-component heuristic score for a feasible candidate.
/// Assumes the candidate has already passed the clearance oracle.
fn score(grid: &CarrierGrid, footprint: &Footprint, rotation: Rotation, x: u32, y: u32) -> f64 {
    let w_carrier = f64::from(grid.width());
    let h_carrier = f64::from(grid.height());
    let area = f64::from(footprint.area());

    let bottom_bias = 1.0 - f64::from(y) / h_carrier;
    let left_alignment = 1.0 - f64::from(x) / w_carrier;

    let mut perimeter_cells = 0u32;
    let mut adjacent_cells = 0u32;
    let mut boundary_cells = 0u32;
    let (ix0, iy0, ix1, iy1) = grid.usable_interior();

    for &(cx, cy, _) in footprint.cells(rotation) {
        let ax = x + cx as u32;
        let ay = y + cy as u32;
        let is_perimeter = [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)].iter().any(|&(dx, dy)| {
            !footprint
                .cells(rotation)
                .iter()
                .any(|&(ocx, ocy, _)| ocx == cx + dx && ocy == cy + dy)
        });
        if !is_perimeter {
            continue;
        }
        perimeter_cells += 1;

        let touches_edge_or_block = [(-1i32, 0i32), (1, 0), (0, -1), (0, 1)].iter().any(|&(dx, dy)| {
            let nx = ax as i64 + i64::from(dx);
            let ny = ay as i64 + i64::from(dy);
            if nx < 0 || ny < 0 || nx >= i64::from(grid.width()) || ny >= i64::from(grid.height()) {
                return true;
            }
            matches!(grid.owner(nx as u32, ny as u32), Ok(Some(_)))
        });
        if touches_edge_or_block {
            adjacent_cells += 1;
        }

        if ax == ix0 || ax + 1 == ix1 || ay == iy0 || ay + 1 == iy1 {
            boundary_cells += 1;
        }
    }

    let adjacency = if perimeter_cells == 0 {
        0.0
    } else {
        f64::from(adjacent_cells) / f64::from(perimeter_cells)
    };
    let boundary = f64::from(boundary_cells) / area;

    0.40 * bottom_bias
        + 0.20 * left_alignment
        + 0.20 * adjacency
        + 0.10 * (area / (w_carrier * h_carrier))
        + 0.05 * boundary
        + 0.05 * footprint.density()
}
