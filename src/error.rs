//! Crate-wide error type for the packing engine and its ambient stack.

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type used throughout the crate.
pub type Result<T> = StdResult<T, PackError>;

/// Unified error type distinguishing configuration, footprint, and I/O failures.
#[derive(Debug, Error)]
pub enum PackError {
    /// A carrier configuration is structurally invalid (bad dimensions, margins, etc).
    #[error("invalid carrier configuration: {0}")]
    InvalidConfig(String),

    /// A footprint definition is structurally invalid (no filled cells, etc).
    #[error("invalid footprint {id}: {reason}")]
    InvalidFootprint {
        /// Offending block id.
        id: String,
        /// Why the footprint was rejected.
        reason: String,
    },

    /// A `block_ids` entry in a carrier config does not name a known footprint.
    #[error("unknown block id: {0}")]
    UnknownBlockId(String),

    /// Failed to parse a config file as TOML.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O failure reading a config or cache file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A cached placement record failed a decode-time consistency check.
    #[error("corrupt cache entry: {0}")]
    CorruptCache(String),

    /// An internal invariant was violated; this is always a bug, never user input.
    #[error("internal invariant violated: {0}")]
    Defect(String),
}
