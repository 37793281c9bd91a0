use serde::{Deserialize, Serialize};

/// Tuning for the dealer's decision procedure. Probabilities are the chance
/// that the current shell is live.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DealerConfig {
    pub seed: u64,
    /// Eject an unknown shell with BEER below this.
    pub eject_below: f64,
    pub cuff_above: f64,
    pub saw_above: f64,
    pub shoot_opponent_above: f64,
    pub shoot_self_below: f64,
    pub critical_hp: u32,
    pub phone_trust_percent: u32,
    pub max_items_per_turn: u32,
}

impl Default for DealerConfig {
    fn default() -> Self {
        Self {
            seed: 0xD3A1E5,
            eject_below: 0.45,
            cuff_above: 0.6,
            saw_above: 0.65,
            shoot_opponent_above: 0.55,
            shoot_self_below: 0.45,
            critical_hp: 2,
            phone_trust_percent: 90,
            max_items_per_turn: 16,
        }
    }
}

impl DealerConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}
