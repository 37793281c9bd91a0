use crate::{DealerConfig, DealerMemory};
use roulette_core::{GameSnapshot, ItemType, RngState, SeatView, Shell, Side};
use tracing::debug;

/// Odds the deciding seat assigns to the shell under the cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShellOdds {
    pub known: Option<Shell>,
    pub current_live: f64,
    pub unknown_live: f64,
}

pub fn seats(snapshot: &GameSnapshot, side: Side) -> (&SeatView, &SeatView) {
    match side {
        Side::Player => (&snapshot.player, &snapshot.dealer),
        Side::Dealer => (&snapshot.dealer, &snapshot.player),
    }
}

pub fn remaining(snapshot: &GameSnapshot) -> usize {
    snapshot.shells_total.saturating_sub(snapshot.shells_spent)
}

/// Memory must already be synced to the snapshot's cursor.
pub fn shell_odds(snapshot: &GameSnapshot, memory: &DealerMemory) -> ShellOdds {
    let unknown_count = remaining(snapshot).saturating_sub(memory.len());
    let unknown_live_count = snapshot.live_remaining.saturating_sub(memory.known_live());
    let unknown_live = unknown_live_count as f64 / unknown_count.max(1) as f64;
    let known = memory.current();
    let current_live = match known {
        Some(Shell::Live) => 1.0,
        Some(Shell::Blank) => 0.0,
        None => unknown_live,
    };
    ShellOdds {
        known,
        current_live,
        unknown_live: unknown_live.min(1.0),
    }
}

/// First eligible item in priority order, or `None` to shoot.
pub fn choose_item(
    snapshot: &GameSnapshot,
    side: Side,
    memory: &DealerMemory,
    odds: ShellOdds,
    config: &DealerConfig,
) -> Option<ItemType> {
    let (me, them) = seats(snapshot, side);
    let holds = |item: ItemType| me.items.contains(&item);
    let left = remaining(snapshot);
    let p = odds.current_live;
    let known_blank = odds.known == Some(Shell::Blank);

    if holds(ItemType::Cigs) && me.hp <= config.critical_hp && me.hp < me.max_hp {
        return Some(ItemType::Cigs);
    }
    if holds(ItemType::Glass) && odds.known.is_none() && left >= 2 {
        return Some(ItemType::Glass);
    }
    if holds(ItemType::Phone) && left >= 3 && has_unknown_ahead(snapshot, memory) {
        return Some(ItemType::Phone);
    }
    if holds(ItemType::Beer)
        && left > 1
        && (known_blank || (odds.known.is_none() && p < config.eject_below))
    {
        return Some(ItemType::Beer);
    }
    if holds(ItemType::Inverter) && known_blank {
        return Some(ItemType::Inverter);
    }
    if holds(ItemType::Cuffs) && !them.is_handcuffed && p > config.cuff_above {
        return Some(ItemType::Cuffs);
    }
    if holds(ItemType::Saw) && !me.is_sawed_active && p > config.saw_above && them.hp > 1 {
        return Some(ItemType::Saw);
    }
    if holds(ItemType::Adrenaline) && them.items.iter().any(|item| item.is_stealable()) {
        return Some(ItemType::Adrenaline);
    }
    if holds(ItemType::Cigs) && me.hp < me.max_hp {
        return Some(ItemType::Cigs);
    }
    None
}

/// PHONE only reports shells at least two past the cursor.
fn has_unknown_ahead(snapshot: &GameSnapshot, memory: &DealerMemory) -> bool {
    (snapshot.shells_spent + 2..snapshot.shells_total).any(|index| !memory.is_known(index))
}

const STEAL_ORDER: [ItemType; 7] = [
    ItemType::Saw,
    ItemType::Inverter,
    ItemType::Cuffs,
    ItemType::Phone,
    ItemType::Glass,
    ItemType::Cigs,
    ItemType::Beer,
];

/// Index into the opponent's items to take, preferring the fixed order and
/// pulling CIGS to the front at critical HP.
pub fn choose_steal(opponent_items: &[ItemType], own_hp: u32, config: &DealerConfig) -> Option<usize> {
    let find = |wanted: ItemType| opponent_items.iter().position(|item| *item == wanted);
    if own_hp <= config.critical_hp {
        if let Some(index) = find(ItemType::Cigs) {
            return Some(index);
        }
    }
    STEAL_ORDER
        .iter()
        .find_map(|item| find(*item))
        .or_else(|| opponent_items.iter().position(|item| item.is_stealable()))
}

pub fn choose_target(odds: ShellOdds, side: Side, config: &DealerConfig, rng: &mut RngState) -> Side {
    let p = odds.current_live;
    let target = if p >= 1.0 || p > config.shoot_opponent_above {
        side.opponent()
    } else if p <= 0.0 || p < config.shoot_self_below {
        side
    } else if rng.coin_flip() {
        side.opponent()
    } else {
        side
    };
    debug!(?side, live = p, ?target, "chose target");
    target
}
