use roulette_core::{ItemType, Side};
use serde::{Deserialize, Serialize};

/// One decision cycle's choice.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DealerAction {
    UseItem { index: usize, item: ItemType },
    Steal { index: usize, item: ItemType },
    Fire { target: Side },
}

impl DealerAction {
    pub fn short_label(&self) -> String {
        match self {
            Self::UseItem { item, .. } => format!("use {}", item.id()),
            Self::Steal { item, .. } => format!("steal {}", item.id()),
            Self::Fire { target } => format!("fire {}", target.label()),
        }
    }
}
