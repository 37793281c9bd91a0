use crate::schema::{GameSettings, RulesConfig, RULES_FILE, SETTINGS_FILE};
use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> anyhow::Result<T> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let value = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(value)
}

/// Reads and validates a rules file.
pub fn load_rules_file(path: &Path) -> anyhow::Result<RulesConfig> {
    let rules: RulesConfig = load_json(path)?;
    validate_rules(&rules).with_context(|| format!("validate {}", path.display()))?;
    Ok(rules)
}

/// `rules.json` from `dir`, or the built-in rules when the file is absent.
pub fn load_rules(dir: &Path) -> anyhow::Result<RulesConfig> {
    let path = dir.join(RULES_FILE);
    if !path.exists() {
        debug!(path = %path.display(), "no rules file, using defaults");
        return Ok(RulesConfig::default());
    }
    load_rules_file(&path)
}

pub fn validate_rules(rules: &RulesConfig) -> anyhow::Result<()> {
    if rules.max_items == 0 {
        bail!("max_items must be positive");
    }
    if rules.normal_hp == 0 {
        bail!("normal_hp must be positive");
    }
    if rules.min_shells < 2 {
        bail!("min_shells must be at least 2, got {}", rules.min_shells);
    }
    if rules.max_shells < rules.min_shells {
        bail!(
            "max_shells {} is below min_shells {}",
            rules.max_shells,
            rules.min_shells
        );
    }
    for (name, value) in [
        ("live_bias_percent", rules.live_bias_percent),
        ("phone_lie_percent", rules.phone_lie_percent),
    ] {
        if value > 100 {
            bail!("{name} must be at most 100, got {value}");
        }
    }

    if rules.total_weight() == 0 {
        bail!("item weights must have a positive total");
    }
    let mut seen = HashSet::new();
    for entry in &rules.item_weights {
        if entry.item.is_special() {
            bail!("special item {} cannot be in the base table", entry.item.id());
        }
        if !seen.insert(entry.item) {
            bail!("duplicate weight for {}", entry.item.id());
        }
    }

    let Some(first) = rules.batch_tiers.first() else {
        bail!("batch_tiers cannot be empty");
    };
    if first.from_round != 1 {
        bail!("first batch tier must start at round 1, got {}", first.from_round);
    }
    for pair in rules.batch_tiers.windows(2) {
        if pair[1].from_round <= pair[0].from_round {
            bail!(
                "batch tiers must be sorted by round ({} after {})",
                pair[1].from_round,
                pair[0].from_round
            );
        }
    }

    if rules.hard_mode_stage_wins == 0 {
        bail!("hard_mode_stage_wins must be positive");
    }
    let stages = (rules.hard_mode_stage_wins * 2 - 1) as usize;
    if rules.hard_mode_hp.len() < stages {
        bail!(
            "hard_mode_hp lists {} stages, {} needed",
            rules.hard_mode_hp.len(),
            stages
        );
    }
    if rules.hard_mode_hp.contains(&0) {
        bail!("hard_mode_hp entries must be positive");
    }
    Ok(())
}

/// `settings.json` from `dir`; missing fields and a missing file fall back
/// to defaults.
pub fn load_settings(dir: &Path) -> anyhow::Result<GameSettings> {
    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(GameSettings::default());
    }
    load_json(path)
}

pub fn save_settings(dir: &Path, settings: &GameSettings) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(SETTINGS_FILE);
    let body = serde_json::to_string_pretty(settings)?;
    fs::write(&path, body).with_context(|| format!("write {}", path.display()))
}
