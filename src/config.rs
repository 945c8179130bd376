//! TOML configuration for a carrier + block batch.
//!
//! Deserialised with `serde`, then validated before any engine call — a
//! config error is always reported before search begins.

use std::{collections::HashSet, fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    error::{PackError, Result},
    footprint::{Cell, Footprint},
    grid::{CarrierGrid, ClearanceMetric},
    search::SearchOptions,
};

/// On-disk carrier section of a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierSection {
    /// Opaque label for the carrier.
    pub ship_name: String,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Reserved columns at the +x end.
    #[serde(default)]
    pub bow_margin: u32,
    /// Reserved columns at the -x end.
    #[serde(default)]
    pub stern_margin: u32,
    /// Reserved rows at both y ends.
    #[serde(default)]
    pub side_margin: u32,
    /// Inter-block keep-out distance, in cells.
    #[serde(default)]
    pub block_clearance: u32,
    /// Search wall-clock budget, in seconds.
    pub max_time_seconds: f64,
    /// 4- vs 8-neighbourhood clearance policy.
    #[serde(default)]
    pub clearance_metric: ClearanceMetric,
    /// Explicit subset/order of block ids to attempt; defaults to every
    /// block in declaration order when omitted.
    #[serde(default)]
    pub block_ids: Option<Vec<String>>,
}

/// On-disk block definition: an id and its raw occupied-cell list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockDef {
    /// Opaque block identifier.
    pub id: String,
    /// Raw occupied cells, `(x, y, (below_empty, filled, above_empty))`.
    pub cells: Vec<Cell>,
}

/// A fully parsed (but not yet validated) config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierConfig {
    /// Carrier parameters.
    pub carrier: CarrierSection,
    /// Block definitions, under the `[[block]]` TOML key.
    #[serde(rename = "block", default)]
    pub blocks: Vec<BlockDef>,
}

impl CarrierConfig {
    /// Parses a config from a TOML file, then validates it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses a config from an in-memory TOML string, then validates it.
    pub fn parse(text: &str) -> Result<Self> {
        let config: CarrierConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates structural invariants before any engine call:
    /// non-positive dimensions, margins exceeding extents, negative
    /// clearance (unrepresentable since fields are unsigned, so this
    /// validates duplicate ids and unknown `block_ids` entries instead),
    /// and footprint-level checks delegated to [`Footprint::new`].
    pub fn validate(&self) -> Result<()> {
        if self.carrier.width == 0 || self.carrier.height == 0 {
            return Err(PackError::InvalidConfig(
                "carrier width and height must be positive".to_string(),
            ));
        }
        if self.carrier.max_time_seconds <= 0.0 {
            return Err(PackError::InvalidConfig(
                "max_time_seconds must be positive".to_string(),
            ));
        }
        if self.carrier.bow_margin + self.carrier.stern_margin >= self.carrier.width {
            return Err(PackError::InvalidConfig(
                "bow_margin + stern_margin must be less than width".to_string(),
            ));
        }
        if self.carrier.side_margin * 2 >= self.carrier.height {
            return Err(PackError::InvalidConfig(
                "side_margin * 2 must be less than height".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for block in &self.blocks {
            if !seen.insert(block.id.as_str()) {
                return Err(PackError::InvalidConfig(format!(
                    "duplicate block id: {}",
                    block.id
                )));
            }
        }

        if let Some(ids) = &self.carrier.block_ids {
            for id in ids {
                if !seen.contains(id.as_str()) {
                    return Err(PackError::UnknownBlockId(id.clone()));
                }
            }
        }

        Ok(())
    }

    /// Builds the engine's native [`Footprint`] list, in the order given by
    /// `block_ids` (or declaration order, if absent).
    pub fn footprints(&self) -> Result<Vec<Footprint>> {
        let selected: Vec<&BlockDef> = match &self.carrier.block_ids {
            Some(ids) => ids
                .iter()
                .map(|id| {
                    self.blocks
                        .iter()
                        .find(|b| &b.id == id)
                        .ok_or_else(|| PackError::UnknownBlockId(id.clone()))
                })
                .collect::<Result<Vec<_>>>()?,
            None => self.blocks.iter().collect(),
        };

        selected
            .into_iter()
            .map(|b| Footprint::new(b.id.clone(), &b.cells))
            .collect()
    }

    /// Builds a fresh, empty [`CarrierGrid`] from the carrier section.
    pub fn grid(&self) -> Result<CarrierGrid> {
        CarrierGrid::with_metric(
            self.carrier.width,
            self.carrier.height,
            self.carrier.bow_margin,
            self.carrier.stern_margin,
            self.carrier.side_margin,
            self.carrier.block_clearance,
            self.carrier.clearance_metric,
        )
    }

    /// Search options derived from the carrier section.
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_time: Duration::from_secs_f64(self.carrier.max_time_seconds),
            candidate_limit: None,
        }
    }
}
