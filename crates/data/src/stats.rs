use crate::schema::{SavedStats, StatsRecord};
use crate::load::load_json;
use anyhow::{bail, Context};
use std::fs;
use std::path::{Path, PathBuf};

const STATS_SCHEMA_VERSION: u32 = 1;

pub fn default_stats_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ROULETTE_STATS") {
        return Some(PathBuf::from(path));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".roulette_stats.json"))
}

pub fn save_stats(path: &Path, record: &StatsRecord) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let payload = SavedStats {
        version: STATS_SCHEMA_VERSION,
        record: record.clone(),
    };
    let body = serde_json::to_string_pretty(&payload)?;
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

/// A missing file is an empty record; a file from another schema version is
/// an error.
pub fn load_stats(path: &Path) -> anyhow::Result<StatsRecord> {
    if !path.exists() {
        return Ok(StatsRecord::default());
    }
    let payload: SavedStats = load_json(path)?;
    if payload.version != STATS_SCHEMA_VERSION {
        bail!(
            "unsupported stats version {} (expected {})",
            payload.version,
            STATS_SCHEMA_VERSION
        );
    }
    Ok(payload.record)
}
