use crate::{ItemWeight, RngState, RulesConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemType {
    Glass,
    Beer,
    Cigs,
    Cuffs,
    Saw,
    Phone,
    Inverter,
    Adrenaline,
    Choke,
    Remote,
    BigInverter,
    Contract,
}

impl ItemType {
    pub const ALL: [ItemType; 12] = [
        ItemType::Glass,
        ItemType::Beer,
        ItemType::Cigs,
        ItemType::Cuffs,
        ItemType::Saw,
        ItemType::Phone,
        ItemType::Inverter,
        ItemType::Adrenaline,
        ItemType::Choke,
        ItemType::Remote,
        ItemType::BigInverter,
        ItemType::Contract,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ItemType::Glass => "glass",
            ItemType::Beer => "beer",
            ItemType::Cigs => "cigs",
            ItemType::Cuffs => "cuffs",
            ItemType::Saw => "saw",
            ItemType::Phone => "phone",
            ItemType::Inverter => "inverter",
            ItemType::Adrenaline => "adrenaline",
            ItemType::Choke => "choke",
            ItemType::Remote => "remote",
            ItemType::BigInverter => "big_inverter",
            ItemType::Contract => "contract",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|item| item.id() == id)
    }

    /// Items that never come out of the base roll.
    pub fn is_special(self) -> bool {
        matches!(
            self,
            ItemType::Choke | ItemType::Remote | ItemType::BigInverter | ItemType::Contract
        )
    }

    pub fn is_stealable(self) -> bool {
        self != ItemType::Adrenaline
    }
}

pub fn roll_item(weights: &[ItemWeight], rng: &mut RngState) -> Option<ItemType> {
    let entries: Vec<&ItemWeight> = weights.iter().filter(|entry| entry.weight > 0).collect();
    let total: u64 = entries.iter().map(|entry| u64::from(entry.weight)).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.below(total);
    for entry in entries {
        let weight = u64::from(entry.weight);
        if roll < weight {
            return Some(entry.item);
        }
        roll -= weight;
    }
    None
}

pub fn roll_items(weights: &[ItemWeight], count: usize, rng: &mut RngState) -> Vec<ItemType> {
    (0..count).filter_map(|_| roll_item(weights, rng)).collect()
}

/// A shipment of items announced at batch start. Revealed first, merged into
/// the inventories only when committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LootGrant {
    pub player: Vec<ItemType>,
    pub dealer: Vec<ItemType>,
    pub reset_all: bool,
}

/// Rolls independent batches for both sides. `per_side` overrides the
/// round-based batch size (room settings in multiplayer).
pub fn distribute(
    rules: &RulesConfig,
    round: u32,
    per_side: Option<usize>,
    reset_all: bool,
    rng: &mut RngState,
) -> LootGrant {
    let count = per_side.unwrap_or_else(|| rules.batch_size(round));
    LootGrant {
        player: roll_items(&rules.item_weights, count, rng),
        dealer: roll_items(&rules.item_weights, count, rng),
        reset_all,
    }
}

/// Appends `incoming` to `items` (or replaces them) and truncates to `max`.
pub fn merge_items(items: &mut Vec<ItemType>, incoming: &[ItemType], max: usize, reset_all: bool) {
    if reset_all {
        items.clear();
    }
    items.extend_from_slice(incoming);
    items.truncate(max);
}
