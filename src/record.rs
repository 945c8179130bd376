//! The placement record: the immutable result of a search, and the pose type
//! it is built from.

use serde::{Deserialize, Serialize};

use crate::footprint::Rotation;

/// A single block's placement: origin plus rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pose {
    /// The placed block's id.
    pub block_id: String,
    /// X origin within the carrier grid.
    pub x: u32,
    /// Y origin within the carrier grid.
    pub y: u32,
    /// Rotation applied to the footprint for this placement.
    pub rotation: Rotation,
}

/// Carrier dimensions, carried in a [`PlacementRecord`] for downstream
/// consumers that don't otherwise have access to the carrier config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierDimensions {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

/// Immutable snapshot of a (possibly partial) packing solution.
///
/// Emitted at the end of a search, and on request during one for progress
/// reporting. Safe to serialise and share with external collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRecord {
    /// Opaque label for the carrier this record was produced for.
    pub ship_name: String,
    /// Dimensions of the carrier.
    pub carrier_dimensions: CarrierDimensions,
    /// Placed blocks, sorted by block id for determinism.
    pub placed: Vec<Pose>,
    /// Ids of blocks that could not be placed within the time budget.
    pub unplaced_ids: Vec<String>,
    /// `0.7 * (placed_count / total) + 0.3 * utilisation`.
    pub score: f64,
    /// Number of blocks placed.
    pub placed_count: usize,
    /// Total number of blocks considered.
    pub total_count: usize,
    /// Wall-clock time spent searching, in seconds.
    pub elapsed_seconds: f64,
}

impl PlacementRecord {
    /// `placed_count / total_count`, or `1.0` when there were no blocks to
    /// place at all (an empty block list is a complete, well-formed record).
    pub fn success_rate(&self) -> f64 {
        if self.total_count == 0 {
            1.0
        } else {
            self.placed_count as f64 / self.total_count as f64
        }
    }

    /// `true` iff every input block was placed.
    pub fn complete(&self) -> bool {
        self.unplaced_ids.is_empty()
    }

    /// Renders a human-readable text report: one line per fact, not a
    /// decoded visualisation of the grid (the core has no notion of
    /// rendering footprint shapes to text).
    pub fn to_report(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "carrier: {} ({}x{})\n",
            self.ship_name, self.carrier_dimensions.width, self.carrier_dimensions.height
        ));
        out.push_str(&format!(
            "placed {}/{} ({:.1}% , complete={})\n",
            self.placed_count,
            self.total_count,
            self.success_rate() * 100.0,
            self.complete()
        ));
        out.push_str(&format!(
            "score {:.4}  elapsed {:.3}s\n",
            self.score, self.elapsed_seconds
        ));
        for pose in &self.placed {
            out.push_str(&format!(
                "  {} @ ({}, {}) rot={:?}\n",
                pose.block_id, pose.x, pose.y, pose.rotation
            ));
        }
        if !self.unplaced_ids.is_empty() {
            out.push_str(&format!("  unplaced: {}\n", self.unplaced_ids.join(", ")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_record_is_complete() {
        let record = PlacementRecord {
            ship_name: "s".to_string(),
            carrier_dimensions: CarrierDimensions { width: 1, height: 1 },
            placed: Vec::new(),
            unplaced_ids: Vec::new(),
            score: 1.0,
            placed_count: 0,
            total_count: 0,
            elapsed_seconds: 0.0,
        };
        assert!(record.complete());
        assert_eq!(record.success_rate(), 1.0);
    }

    #[test]
    fn report_snapshot() {
        let record = PlacementRecord {
            ship_name: "Nordkapp".to_string(),
            carrier_dimensions: CarrierDimensions { width: 10, height: 5 },
            placed: vec![
                Pose {
                    block_id: "A".to_string(),
                    x: 0,
                    y: 0,
                    rotation: Rotation::R0,
                },
                Pose {
                    block_id: "B".to_string(),
                    x: 5,
                    y: 0,
                    rotation: Rotation::R90,
                },
            ],
            unplaced_ids: vec!["C".to_string()],
            score: 0.8167,
            placed_count: 2,
            total_count: 3,
            elapsed_seconds: 0.042,
        };
        insta::assert_snapshot!(record.to_report(), @r###"
        carrier: Nordkapp (10x5)
        placed 2/3 (66.7% , complete=false)
        score 0.8167  elapsed 0.042s
          A @ (0, 0) rot=R0
          B @ (5, 0) rot=R90
          unplaced: C
        "###);
    }

    #[test]
    fn serde_round_trip_preserves_placements() {
        let record = PlacementRecord {
            ship_name: "s".to_string(),
            carrier_dimensions: CarrierDimensions { width: 10, height: 5 },
            placed: vec![Pose {
                block_id: "A".to_string(),
                x: 1,
                y: 2,
                rotation: Rotation::R90,
            }],
            unplaced_ids: vec!["B".to_string()],
            score: 0.5,
            placed_count: 1,
            total_count: 2,
            elapsed_seconds: 0.01,
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: PlacementRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.placed, record.placed);
        assert_eq!(back.unplaced_ids, record.unplaced_ids);
        assert_eq!(back.score, record.score);
    }
}
