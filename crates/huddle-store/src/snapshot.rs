//! Whole-store JSON snapshots. Loading falls back to an empty store when no
//! snapshot exists yet; saving writes a temp file and renames it into place
//! so a crash mid-write never corrupts the previous checkpoint.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::Store;

pub fn load(path: &Path) -> Result<Store> {
    if !path.exists() {
        info!("no snapshot at {}, starting empty", path.display());
        return Ok(Store::default());
    }
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let store = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    info!("loaded snapshot from {}", path.display());
    Ok(store)
}

pub fn save(path: &Path, store: &Store) -> Result<()> {
    let bytes = serde_json::to_vec(store).context("serializing store")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &bytes).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("renaming into {}", path.display()))?;
    Ok(())
}
