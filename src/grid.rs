//! Carrier grid: 2D occupancy over the deck, with margins, clearance, and the
//! clearance oracle that decides whether a candidate placement is feasible.
//!
//! Cells are stored as a flat row-major array of small integer handles, so
//! snapshots become a single array copy rather than a grid of owned
//! strings. A process-local interning table maps block ids to handles and
//! back.

use rustc_hash::FxHashMap;

use crate::{
    error::{PackError, Result},
    footprint::{Footprint, Rotation},
    record::Pose,
};

/// Sentinel handle meaning "no block occupies this cell".
const EMPTY: u32 = u32::MAX;

/// 4- vs 8-neighbourhood policy for inter-block clearance, exposed as
/// configuration rather than hardcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceMetric {
    /// 4-neighbourhood (taxicab) inflation. The default.
    #[default]
    Manhattan,
    /// 8-neighbourhood (square) inflation.
    Chebyshev,
}

/// A block's cell ownership and pose, tracked so `remove` can clear exactly
/// the cells it claimed without re-deriving them from the footprint.
#[derive(Debug)]
struct PlacedEntry {
    pose: Pose,
    cells: Vec<(u32, u32)>,
}

/// The carrier's 2D occupancy grid.
#[derive(Debug)]
pub struct CarrierGrid {
    width: u32,
    height: u32,
    bow_margin: u32,
    stern_margin: u32,
    side_margin: u32,
    block_clearance: u32,
    clearance_metric: ClearanceMetric,
    cells: Vec<u32>,
    handle_of: FxHashMap<String, u32>,
    id_of: Vec<String>,
    placed: FxHashMap<u32, PlacedEntry>,
}

impl CarrierGrid {
    /// Builds a new, empty carrier grid.
    ///
    /// Fails fast if dimensions are non-positive or margins exceed the
    /// carrier's extents.
    pub fn new(
        width: u32,
        height: u32,
        bow_margin: u32,
        stern_margin: u32,
        side_margin: u32,
        block_clearance: u32,
    ) -> Result<Self> {
        Self::with_metric(
            width,
            height,
            bow_margin,
            stern_margin,
            side_margin,
            block_clearance,
            ClearanceMetric::default(),
        )
    }

    /// As [`CarrierGrid::new`], with an explicit clearance metric.
    pub fn with_metric(
        width: u32,
        height: u32,
        bow_margin: u32,
        stern_margin: u32,
        side_margin: u32,
        block_clearance: u32,
        clearance_metric: ClearanceMetric,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(PackError::InvalidConfig(
                "carrier width and height must be positive".to_string(),
            ));
        }
        if bow_margin + stern_margin >= width {
            return Err(PackError::InvalidConfig(format!(
                "bow_margin + stern_margin ({}) must be less than width ({width})",
                bow_margin + stern_margin
            )));
        }
        if side_margin * 2 >= height {
            return Err(PackError::InvalidConfig(format!(
                "side_margin * 2 ({}) must be less than height ({height})",
                side_margin * 2
            )));
        }

        Ok(Self {
            width,
            height,
            bow_margin,
            stern_margin,
            side_margin,
            block_clearance,
            clearance_metric,
            cells: vec![EMPTY; (width * height) as usize],
            handle_of: FxHashMap::default(),
            id_of: Vec::new(),
            placed: FxHashMap::default(),
        })
    }

    /// Carrier width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Carrier height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Configured inter-block clearance, in cells.
    pub fn block_clearance(&self) -> u32 {
        self.block_clearance
    }

    /// The configured clearance metric.
    pub fn clearance_metric(&self) -> ClearanceMetric {
        self.clearance_metric
    }

    /// `[x_min, x_max) x [y_min, y_max)` usable interior after subtracting
    /// edge margins.
    pub fn usable_interior(&self) -> (u32, u32, u32, u32) {
        (
            self.stern_margin,
            self.side_margin,
            self.width - self.bow_margin,
            self.height - self.side_margin,
        )
    }

    /// Number of cells in the usable interior.
    pub fn usable_interior_area(&self) -> u32 {
        let (x0, y0, x1, y1) = self.usable_interior();
        (x1 - x0) * (y1 - y0)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Whether `(x, y)` is unoccupied. Errors on out-of-bounds coordinates:
    /// these are defects, not silent failures.
    pub fn is_empty(&self, x: u32, y: u32) -> Result<bool> {
        self.check_bounds(x, y)?;
        Ok(self.cells[self.index(x, y)] == EMPTY)
    }

    /// The block id occupying `(x, y)`, if any.
    pub fn owner(&self, x: u32, y: u32) -> Result<Option<&str>> {
        self.check_bounds(x, y)?;
        let handle = self.cells[self.index(x, y)];
        if handle == EMPTY {
            Ok(None)
        } else {
            Ok(Some(self.id_of[handle as usize].as_str()))
        }
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(PackError::Defect(format!(
                "coordinate ({x}, {y}) out of bounds for {}x{} grid",
                self.width, self.height
            )));
        }
        Ok(())
    }

    fn handle_for(&mut self, block_id: &str) -> u32 {
        if let Some(&h) = self.handle_of.get(block_id) {
            return h;
        }
        let h = self.id_of.len() as u32;
        self.id_of.push(block_id.to_string());
        self.handle_of.insert(block_id.to_string(), h);
        h
    }

    /// Whether the given candidate placement is feasible, per the clearance
    /// oracle below. A pure predicate; never mutates state.
    pub fn can_place(&self, footprint: &Footprint, rotation: Rotation, x: u32, y: u32) -> bool {
        clearance_check(self, footprint, rotation, x, y)
    }

    /// Attempts to place `footprint` at `(x, y)` with the given rotation.
    ///
    /// All-or-nothing: on success every rotated cell is claimed by the
    /// footprint's id; on failure the grid is left completely unchanged.
    pub fn place(&mut self, footprint: &Footprint, rotation: Rotation, x: u32, y: u32) -> bool {
        if !self.can_place(footprint, rotation, x, y) {
            return false;
        }

        let handle = self.handle_for(footprint.id());
        let mut claimed = Vec::with_capacity(footprint.area() as usize);
        for &(cx, cy, _) in footprint.cells(rotation) {
            let ax = x + cx as u32;
            let ay = y + cy as u32;
            let idx = self.index(ax, ay);
            self.cells[idx] = handle;
            claimed.push((ax, ay));
        }

        self.placed.insert(
            handle,
            PlacedEntry {
                pose: Pose {
                    block_id: footprint.id().to_string(),
                    x,
                    y,
                    rotation,
                },
                cells: claimed,
            },
        );
        true
    }

    /// Clears all cells owned by `block_id`. A no-op if the block is not
    /// currently placed.
    pub fn remove(&mut self, block_id: &str) -> bool {
        let Some(&handle) = self.handle_of.get(block_id) else {
            return false;
        };
        let Some(entry) = self.placed.remove(&handle) else {
            return false;
        };
        for (x, y) in entry.cells {
            let idx = self.index(x, y);
            self.cells[idx] = EMPTY;
        }
        true
    }

    /// Whether `block_id` currently occupies any cell.
    pub fn is_placed(&self, block_id: &str) -> bool {
        self.handle_of
            .get(block_id)
            .is_some_and(|h| self.placed.contains_key(h))
    }

    /// The pose of `block_id`, if currently placed.
    pub fn pose_of(&self, block_id: &str) -> Option<&Pose> {
        let handle = *self.handle_of.get(block_id)?;
        self.placed.get(&handle).map(|e| &e.pose)
    }

    /// All currently placed poses, in undefined but stable (insertion-order
    /// independent of `HashMap`) order — callers that need deterministic
    /// order should sort by `block_id`.
    pub fn placed_poses(&self) -> impl Iterator<Item = &Pose> {
        self.placed.values().map(|e| &e.pose)
    }

    /// `(placed_count, utilisation)`, where `utilisation` is the fraction of
    /// the usable interior currently occupied.
    pub fn score(&self) -> (usize, f64) {
        let placed_count = self.placed.len();
        let occupied: u32 = self
            .placed
            .values()
            .map(|e| e.cells.len() as u32)
            .sum();
        let utilisation = f64::from(occupied) / f64::from(self.usable_interior_area());
        (placed_count, utilisation)
    }

    /// A deep copy of the grid's cell array and placed set, used by the
    /// search engine to snapshot a new best-so-far without holding a
    /// reference into the live working grid.
    pub fn snapshot(&self) -> GridSnapshot {
        let mut poses: Vec<Pose> = self.placed.values().map(|e| e.pose.clone()).collect();
        poses.sort_by(|a, b| a.block_id.cmp(&b.block_id));
        GridSnapshot { poses }
    }
}

/// An immutable snapshot of which blocks are placed and where.
#[derive(Debug, Clone)]
pub struct GridSnapshot {
    /// Placed poses, sorted by block id for determinism.
    pub poses: Vec<Pose>,
}

/// Implements the clearance oracle as a free function so it can be unit
/// tested independent of `CarrierGrid`'s mutation methods.
fn clearance_check(grid: &CarrierGrid, footprint: &Footprint, rotation: Rotation, x: u32, y: u32) -> bool {
    let (ix0, iy0, ix1, iy1) = grid.usable_interior();

    let mut absolute = Vec::with_capacity(footprint.area() as usize);
    for &(cx, cy, _) in footprint.cells(rotation) {
        let ax = x as i64 + i64::from(cx);
        let ay = y as i64 + i64::from(cy);

        // 1. interior containment
        if ax < i64::from(ix0) || ax >= i64::from(ix1) || ay < i64::from(iy0) || ay >= i64::from(iy1) {
            return false;
        }
        let (ax, ay) = (ax as u32, ay as u32);

        // 2. non-overlap
        match grid.is_empty(ax, ay) {
            Ok(true) => {}
            _ => return false,
        }
        absolute.push((ax, ay));
    }

    // 3. inter-block clearance
    let clearance = grid.block_clearance();
    if clearance == 0 {
        return true;
    }
    let c = clearance as i64;

    for &(ax, ay) in &absolute {
        for dy in -c..=c {
            for dx in -c..=c {
                let within = match grid.clearance_metric() {
                    ClearanceMetric::Manhattan => dx.abs() + dy.abs() <= c,
                    ClearanceMetric::Chebyshev => dx.abs().max(dy.abs()) <= c,
                };
                if !within {
                    continue;
                }
                let nx = ax as i64 + dx;
                let ny = ay as i64 + dy;
                if nx < 0 || ny < 0 || nx >= i64::from(grid.width()) || ny >= i64::from(grid.height()) {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                if let Ok(Some(owner)) = grid.owner(nx, ny) {
                    if owner != footprint.id() {
                        return false;
                    }
                }
            }
        }
    }

    true
}
