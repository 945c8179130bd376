//! Shipyard block-packing engine.
//!
//! Given a rectangular carrier deck and a set of 2.5D voxel-footprint
//! blocks, finds a placement that maximises the number of blocks placed
//! subject to margin and inter-block clearance constraints. The search is
//! anytime: it always returns the best partial solution found within its
//! wall-clock budget, never nothing.

pub mod candidate;
pub mod config;
pub mod error;
pub mod footprint;
pub mod grid;
pub mod persistence;
pub mod record;
pub mod search;

pub use config::CarrierConfig;
pub use error::{PackError, Result};
pub use footprint::{Footprint, Rotation};
pub use grid::{CarrierGrid, ClearanceMetric};
pub use record::{CarrierDimensions, PlacementRecord, Pose};
pub use search::{order_blocks, search, SearchOptions};

/// Runs a full search from a parsed carrier config: builds the grid and
/// footprint list, orders the blocks, and runs the search engine.
///
/// This is the convenience entry point the CLI (`main.rs`) drives; library
/// consumers that need finer control can call [`config::CarrierConfig::grid`],
/// [`order_blocks`], and [`search`] directly.
pub fn run(config: &CarrierConfig) -> Result<PlacementRecord> {
    let grid = config.grid()?;
    let footprints = config.footprints()?;
    let blocks = order_blocks(footprints);
    Ok(search(grid, &config.carrier.ship_name, &blocks, config.search_options()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_end_to_end_from_config() {
        let config = CarrierConfig::parse(
            r#"
[carrier]
ship_name = "Test"
width = 10
height = 10
max_time_seconds = 1.0

[[block]]
id = "A"
cells = [[0,0,[0,1,0]]]
"#,
        )
        .unwrap();
        let record = run(&config).unwrap();
        assert_eq!(record.placed_count, 1);
        assert!(record.complete());
    }
}
