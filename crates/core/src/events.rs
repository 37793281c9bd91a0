use crate::{ItemFailure, ItemType, MatchMode, Shell, Side};
use serde::{Deserialize, Serialize};

/// Named outcomes emitted for presentation, in the order they happened.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    MatchStarted { mode: MatchMode },
    BatchLoaded { round: u32, live: usize, blank: usize },
    ItemsRevealed {
        player: Vec<ItemType>,
        dealer: Vec<ItemType>,
    },
    ItemsCommitted,
    TurnStarted { side: Side },
    GunRaised { side: Side, aim: Side },
    AimChanged { side: Side, target: Side },
    GunLowered { side: Side },
    ShotFired {
        shooter: Side,
        target: Side,
        shells: Vec<Shell>,
        damage: u32,
    },
    DamageDealt { target: Side, amount: u32, hp: u32 },
    ItemUsed { side: Side, item: ItemType },
    ItemFailed {
        side: Side,
        item: ItemType,
        reason: ItemFailure,
        refunded: bool,
    },
    /// Private knowledge: only ever emitted for the local player.
    ShellRevealed { viewer: Side, offset: usize, shell: Shell },
    /// Another seat looked at a shell; the identity stays hidden.
    ShellInspected { side: Side },
    ShellEjected { side: Side, shell: Shell },
    ShellInverted { side: Side, all: bool },
    ShellsSwapped { side: Side },
    Healed { side: Side, hp: u32 },
    Handcuffed { side: Side },
    HandcuffSkipped { side: Side },
    SawPrimed { side: Side },
    ChokePrimed { side: Side },
    ContractSigned { side: Side, hp: u32, granted: usize },
    StealStarted { side: Side },
    ItemStolen { side: Side, item: ItemType },
    TurnPassed { to: Side },
    Eliminated { side: Side },
    StageEnded {
        winner: Side,
        player_wins: u32,
        dealer_wins: u32,
    },
    MatchEnded { winner: Side, score: i64 },
}

impl Event {
    /// Suggested pause after the event, for presentation pacing only.
    pub fn duration_hint_ms(&self) -> u64 {
        match self {
            Event::MatchStarted { .. } => 1_500,
            Event::BatchLoaded { .. } => 2_000,
            Event::ItemsRevealed { .. } => 1_200,
            Event::ShotFired { .. } => 900,
            Event::DamageDealt { .. } => 700,
            Event::ShellRevealed { .. } | Event::ShellEjected { .. } => 1_000,
            Event::ItemUsed { .. } | Event::ItemStolen { .. } => 600,
            Event::StageEnded { .. } | Event::MatchEnded { .. } => 2_500,
            Event::GunRaised { .. } | Event::AimChanged { .. } => 300,
            _ => 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }
}
