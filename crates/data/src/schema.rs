use serde::{Deserialize, Serialize};

pub use roulette_core::{BatchTier, GameSettings, ItemWeight, RulesConfig, StatsRecord};

pub const RULES_FILE: &str = "rules.json";
pub const SETTINGS_FILE: &str = "settings.json";

/// On-disk wrapper for the lifetime stats record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedStats {
    pub version: u32,
    pub record: StatsRecord,
}
