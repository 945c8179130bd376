//! Block footprint definitions and rotation.
//!
//! A footprint is a 2.5D voxel occupancy pattern: a set of occupied `(x, y)`
//! cells, each carrying an opaque `(below_empty, filled, above_empty)` stack
//! triple that the packing core stores and forwards but never inspects.

use std::cmp::Ordering;

use crate::error::{PackError, Result};

/// Opaque per-cell stack metadata: `(below_empty, filled, above_empty)`.
///
/// The core never reads these values beyond the `filled` field at
/// construction time (to decide whether a cell is occupied); they are
/// carried through rotation and into the output untouched.
pub type StackMeta = (i32, i32, i32);

/// A single occupied cell: offset plus its stack metadata.
pub type Cell = (i32, i32, StackMeta);

/// The two permitted rotations. Only 0 and 90 degrees are supported; the
/// system makes no attempt at arbitrary-angle rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum Rotation {
    /// Unrotated.
    R0,
    /// Rotated 90 degrees.
    R90,
}

impl Rotation {
    /// Both rotations, in the canonical tie-break order (R0 before R90).
    pub const ALL: [Rotation; 2] = [Rotation::R0, Rotation::R90];
}

/// Immutable 2.5D voxel footprint for a single block.
///
/// Constructed once from the external voxeliser (or a config file) and never
/// mutated afterward; both rotated views are precomputed at construction so
/// the hot search loop never re-derives them.
#[derive(Debug, Clone)]
pub struct Footprint {
    /// Opaque block identifier.
    id: String,
    /// Occupied cells at rotation 0, normalized so min x/y are zero.
    cells_r0: Vec<Cell>,
    /// Occupied cells at rotation 90, derived from `cells_r0`.
    cells_r90: Vec<Cell>,
    /// (width, height) at rotation 0.
    bounds_r0: (u32, u32),
    /// (width, height) at rotation 90 (the swap of `bounds_r0`).
    bounds_r90: (u32, u32),
    /// Whether rotating 90 degrees produces the same occupied-cell pattern.
    rotation_is_redundant: bool,
}

impl Footprint {
    /// Builds a footprint from a raw, unnormalized cell list.
    ///
    /// Only cells with `filled > 0` are kept. Fails if no cell is filled, or
    /// if any retained coordinate is negative after normalization (which
    /// cannot happen by construction, but is checked defensively since
    /// malformed voxeliser output is a configuration-time concern, not a
    /// search-time one).
    pub fn new(id: impl Into<String>, raw_cells: &[Cell]) -> Result<Self> {
        let id = id.into();
        let filled: Vec<Cell> = raw_cells
            .iter()
            .copied()
            .filter(|&(_, _, (_, filled, _))| filled > 0)
            .collect();

        if filled.is_empty() {
            return Err(PackError::InvalidFootprint {
                id,
                reason: "no filled cells".to_string(),
            });
        }

        let min_x = filled.iter().map(|&(x, _, _)| x).min().unwrap();
        let min_y = filled.iter().map(|&(_, y, _)| y).min().unwrap();

        let normalized: Vec<Cell> = filled
            .iter()
            .map(|&(x, y, stack)| (x - min_x, y - min_y, stack))
            .collect();

        let max_x = normalized.iter().map(|&(x, _, _)| x).max().unwrap();
        let max_y = normalized.iter().map(|&(_, y, _)| y).max().unwrap();
        if max_x < 0 || max_y < 0 {
            return Err(PackError::InvalidFootprint {
                id,
                reason: "negative coordinates after normalization".to_string(),
            });
        }
        let width = (max_x + 1) as u32;
        let height = (max_y + 1) as u32;

        let rotated = rotate_90(&normalized, width);
        let rotation_is_redundant = same_pattern(&normalized, &rotated);

        Ok(Self {
            id,
            cells_r0: normalized,
            bounds_r0: (width, height),
            bounds_r90: (height, width),
            cells_r90: rotated,
            rotation_is_redundant,
        })
    }

    /// The block's opaque identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Occupied cell offsets for the given rotation.
    pub fn cells(&self, rotation: Rotation) -> &[Cell] {
        match rotation {
            Rotation::R0 => &self.cells_r0,
            Rotation::R90 => &self.cells_r90,
        }
    }

    /// `(width, height)` of the bounding box for the given rotation.
    pub fn bounds(&self, rotation: Rotation) -> (u32, u32) {
        match rotation {
            Rotation::R0 => self.bounds_r0,
            Rotation::R90 => self.bounds_r90,
        }
    }

    /// Occupied-cell count, invariant under rotation.
    pub fn area(&self) -> u32 {
        self.cells_r0.len() as u32
    }

    /// `area / (width * height)` for the given rotation; invariant under
    /// rotation since width and height merely swap.
    pub fn density(&self) -> f64 {
        let (w, h) = self.bounds_r0;
        f64::from(self.area()) / f64::from(w * h)
    }

    /// The rotations the candidate generator should consider for this
    /// footprint: both, unless 90 degrees produces an identical occupied-cell
    /// pattern (e.g. a symmetric square piece), in which case only `R0`.
    pub fn distinct_rotations(&self) -> &'static [Rotation] {
        if self.rotation_is_redundant {
            &[Rotation::R0]
        } else {
            &Rotation::ALL
        }
    }
}

/// Rotates a normalized cell list 90 degrees: `(cx, cy) -> (cy, W - 1 - cx)`.
fn rotate_90(cells: &[Cell], width: u32) -> Vec<Cell> {
    let w = width as i32;
    cells
        .iter()
        .map(|&(cx, cy, stack)| (cy, w - 1 - cx, stack))
        .collect()
}

/// Whether two cell lists describe the same occupied pattern, ignoring stack
/// metadata and cell order.
fn same_pattern(a: &[Cell], b: &[Cell]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_xy: Vec<(i32, i32)> = a.iter().map(|&(x, y, _)| (x, y)).collect();
    let mut b_xy: Vec<(i32, i32)> = b.iter().map(|&(x, y, _)| (x, y)).collect();
    a_xy.sort_unstable();
    b_xy.sort_unstable();
    a_xy == b_xy
}

impl PartialEq for Footprint {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Footprint {}

impl PartialOrd for Footprint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Footprint {
    /// Search ordering: widest first, then largest area, then densest, then
    /// by id for determinism.
    fn cmp(&self, other: &Self) -> Ordering {
        let (self_w, _) = self.bounds_r0;
        let (other_w, _) = other.bounds_r0;
        other_w
            .cmp(&self_w)
            .then_with(|| other.area().cmp(&self.area()))
            .then_with(|| {
                other
                    .density()
                    .partial_cmp(&self.density())
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(id: &str, w: i32, h: i32) -> Footprint {
        let mut cells = Vec::new();
        for x in 0..w {
            for y in 0..h {
                cells.push((x, y, (0, 1, 0)));
            }
        }
        Footprint::new(id, &cells).unwrap()
    }

    #[test]
    fn rejects_empty_footprint() {
        let cells: Vec<Cell> = vec![(0, 0, (0, 0, 0))];
        let err = Footprint::new("empty", &cells).unwrap_err();
        assert!(matches!(err, PackError::InvalidFootprint { .. }));
    }

    #[test]
    fn normalizes_to_origin() {
        let cells = vec![(3, 5, (0, 1, 0)), (4, 5, (0, 1, 0))];
        let fp = Footprint::new("shifted", &cells).unwrap();
        let mut got: Vec<(i32, i32)> = fp.cells(Rotation::R0).iter().map(|&(x, y, _)| (x, y)).collect();
        got.sort_unstable();
        assert_eq!(got, vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn rotation_swaps_bounds() {
        let fp = solid("rect", 5, 3);
        assert_eq!(fp.bounds(Rotation::R0), (5, 3));
        assert_eq!(fp.bounds(Rotation::R90), (3, 5));
        assert_eq!(fp.distinct_rotations().len(), 2);
    }

    #[test]
    fn square_footprint_deduplicates_rotation() {
        let fp = solid("square", 4, 4);
        assert_eq!(fp.distinct_rotations(), &[Rotation::R0]);
    }

    #[test]
    fn l_shape_rotation_is_not_redundant() {
        // L-tromino: not symmetric under 90 degree rotation.
        let cells = vec![(0, 0, (0, 1, 0)), (0, 1, (0, 1, 0)), (1, 0, (0, 1, 0))];
        let fp = Footprint::new("l", &cells).unwrap();
        assert_eq!(fp.distinct_rotations().len(), 2);
        assert_eq!(fp.area(), 3);
    }

    #[test]
    fn density_matches_rectangle() {
        let fp = solid("rect", 5, 2);
        assert!((fp.density() - 1.0).abs() < 1e-9);
    }
}
