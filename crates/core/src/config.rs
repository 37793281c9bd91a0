use crate::ItemType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemWeight {
    pub item: ItemType,
    pub weight: u32,
}

/// Items granted per side per batch, starting at `from_round`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchTier {
    pub from_round: u32,
    pub items: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    pub max_items: usize,
    pub normal_hp: u32,
    pub hard_mode_hp: Vec<u32>,
    pub hard_mode_stage_wins: u32,
    pub min_shells: usize,
    pub max_shells: usize,
    pub live_bias_percent: u32,
    pub phone_lie_percent: u32,
    pub item_weights: Vec<ItemWeight>,
    pub batch_tiers: Vec<BatchTier>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_items: 8,
            normal_hp: 4,
            hard_mode_hp: vec![2, 3, 4],
            hard_mode_stage_wins: 2,
            min_shells: 2,
            max_shells: 8,
            live_bias_percent: 60,
            phone_lie_percent: 5,
            item_weights: vec![
                ItemWeight { item: ItemType::Beer, weight: 20 },
                ItemWeight { item: ItemType::Cigs, weight: 14 },
                ItemWeight { item: ItemType::Glass, weight: 12 },
                ItemWeight { item: ItemType::Cuffs, weight: 14 },
                ItemWeight { item: ItemType::Phone, weight: 16 },
                ItemWeight { item: ItemType::Saw, weight: 10 },
                ItemWeight { item: ItemType::Inverter, weight: 16 },
                ItemWeight { item: ItemType::Adrenaline, weight: 10 },
            ],
            batch_tiers: vec![
                BatchTier { from_round: 1, items: 2 },
                BatchTier { from_round: 4, items: 3 },
                BatchTier { from_round: 10, items: 4 },
            ],
        }
    }
}

impl RulesConfig {
    pub fn total_weight(&self) -> u32 {
        self.item_weights.iter().map(|entry| entry.weight).sum()
    }

    /// Items per side for the given 1-based batch round.
    pub fn batch_size(&self, round: u32) -> usize {
        self.batch_tiers
            .iter()
            .filter(|tier| tier.from_round <= round)
            .max_by_key(|tier| tier.from_round)
            .map(|tier| tier.items)
            .unwrap_or(0)
    }

    /// HP for a 1-based hard-mode stage; later stages reuse the last entry.
    pub fn hard_mode_hp_for(&self, stage: u32) -> u32 {
        let index = (stage.max(1) as usize - 1).min(self.hard_mode_hp.len().saturating_sub(1));
        self.hard_mode_hp.get(index).copied().unwrap_or(self.normal_hp)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomSettings {
    pub rounds: u32,
    pub hp: u32,
    pub items_per_shipment: usize,
}

impl RoomSettings {
    pub fn wins_needed(&self) -> u32 {
        self.rounds.div_ceil(2).max(1)
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            rounds: 3,
            hp: 4,
            items_per_shipment: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchMode {
    Normal,
    Hard,
    Multiplayer(RoomSettings),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchConfig {
    pub mode: MatchMode,
    pub seed: u64,
}

impl MatchConfig {
    pub fn normal(seed: u64) -> Self {
        Self {
            mode: MatchMode::Normal,
            seed,
        }
    }

    pub fn hard(seed: u64) -> Self {
        Self {
            mode: MatchMode::Hard,
            seed,
        }
    }
}

/// Client settings stored alongside a match. The engine never reads them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GameSettings {
    #[serde(default = "default_scale")]
    pub mouse_sensitivity: f32,
    #[serde(default = "default_scale")]
    pub master_volume: f32,
    #[serde(default = "default_scale")]
    pub music_volume: f32,
    #[serde(default = "default_scale")]
    pub sfx_volume: f32,
    #[serde(default = "default_fov")]
    pub fov: f32,
}

fn default_scale() -> f32 {
    1.0
}

fn default_fov() -> f32 {
    75.0
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: default_scale(),
            master_volume: default_scale(),
            music_volume: default_scale(),
            sfx_volume: default_scale(),
            fov: default_fov(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weight_table_totals_112() {
        assert_eq!(RulesConfig::default().total_weight(), 112);
    }

    #[test]
    fn batch_size_follows_round_tiers() {
        let rules = RulesConfig::default();
        assert_eq!(rules.batch_size(1), 2);
        assert_eq!(rules.batch_size(3), 2);
        assert_eq!(rules.batch_size(4), 3);
        assert_eq!(rules.batch_size(9), 3);
        assert_eq!(rules.batch_size(10), 4);
        assert_eq!(rules.batch_size(42), 4);
    }

    #[test]
    fn hard_mode_hp_schedule() {
        let rules = RulesConfig::default();
        assert_eq!(rules.hard_mode_hp_for(1), 2);
        assert_eq!(rules.hard_mode_hp_for(2), 3);
        assert_eq!(rules.hard_mode_hp_for(3), 4);
        assert_eq!(rules.hard_mode_hp_for(4), 4);
    }

    #[test]
    fn wins_needed_rounds_up() {
        let room = |rounds| RoomSettings {
            rounds,
            hp: 3,
            items_per_shipment: 2,
        };
        assert_eq!(room(1).wins_needed(), 1);
        assert_eq!(room(3).wins_needed(), 2);
        assert_eq!(room(4).wins_needed(), 2);
        assert_eq!(room(5).wins_needed(), 3);
    }
}
