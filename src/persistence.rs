//! On-disk cache for placement records.
//!
//! A dual text/binary save: a human-readable text report plus a compact
//! binary cache keyed by a content hash of the normalised carrier config,
//! so identical inputs hit the cache and changed inputs miss it. The binary
//! format carries an explicit magic/version header so format changes are
//! detected and rejected rather than silently misread.
//!
//! Binary format (little endian):
//! - 4 bytes: magic (`BPKR`)
//! - u8: format version
//! - u32: length-prefixed JSON-encoded `PlacementRecord`

use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

use crate::{
    config::CarrierConfig,
    error::{PackError, Result},
    record::PlacementRecord,
};

const FILE_MAGIC: [u8; 4] = *b"BPKR";
const FILE_VERSION: u8 = 1;

/// Content-addressed key for a carrier config, used to name cache files.
///
/// Hashes the TOML-reserialised config bytes, so any change to carrier
/// parameters or block definitions (including ordering) produces a new key.
pub fn cache_key(config: &CarrierConfig) -> Result<String> {
    let bytes = toml::to_string(config).map_err(|e| PackError::Defect(e.to_string()))?;
    let mut hasher = FxHasher::default();
    bytes.hash(&mut hasher);
    Ok(format!("{:016x}", hasher.finish()))
}

fn paths(cache_dir: &Path, key: &str) -> (PathBuf, PathBuf) {
    (
        cache_dir.join(format!("{key}.bin")),
        cache_dir.join(format!("{key}.txt")),
    )
}

/// Saves a placement record's binary cache entry and human-readable text
/// report under `cache_dir`, creating the directory if needed.
pub fn save(cache_dir: &Path, key: &str, record: &PlacementRecord) -> Result<()> {
    fs::create_dir_all(cache_dir)?;
    let (bin_path, txt_path) = paths(cache_dir, key);

    let mut file = fs::File::create(&txt_path)?;
    write!(file, "{}", record.to_report())?;

    let json = serde_json::to_vec(record).map_err(|e| PackError::Defect(e.to_string()))?;
    let mut file = fs::File::create(&bin_path)?;
    file.write_all(&FILE_MAGIC)?;
    file.write_all(&[FILE_VERSION])?;
    file.write_all(&(json.len() as u32).to_le_bytes())?;
    file.write_all(&json)?;

    Ok(())
}

/// Loads a cached placement record, if present and well-formed.
///
/// A corrupt or unreadable cache entry is treated as a miss (returns
/// `Ok(None)`), never as a hard failure.
pub fn load(cache_dir: &Path, key: &str) -> Result<Option<PlacementRecord>> {
    let (bin_path, _) = paths(cache_dir, key);
    let Ok(mut file) = fs::File::open(&bin_path) else {
        return Ok(None);
    };

    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_err() || magic != FILE_MAGIC {
        return Ok(None);
    }
    let mut version = [0u8; 1];
    if file.read_exact(&mut version).is_err() || version[0] != FILE_VERSION {
        return Ok(None);
    }
    let mut len_bytes = [0u8; 4];
    if file.read_exact(&mut len_bytes).is_err() {
        return Ok(None);
    }
    let len = u32::from_le_bytes(len_bytes) as usize;

    let mut json = vec![0u8; len];
    if file.read_exact(&mut json).is_err() {
        return Ok(None);
    }

    match serde_json::from_slice(&json) {
        Ok(record) => Ok(Some(record)),
        Err(_) => Ok(None),
    }
}
