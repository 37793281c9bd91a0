use crate::{merge_items, roll_items, ItemType, ItemWeight, RngState, RulesConfig, Shell, Side, Table};
use serde::{Deserialize, Serialize};

/// Why an item did nothing. The state is left as it was apart from the
/// consumed item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ItemFailure {
    AlreadyCuffed,
    AlreadyActive,
    FullHealth,
    NoIntel,
    NothingToSteal,
    OneShellLeft,
    ChamberEmpty,
}

impl ItemFailure {
    pub fn message(self) -> &'static str {
        match self {
            ItemFailure::AlreadyCuffed => "already cuffed",
            ItemFailure::AlreadyActive => "already active",
            ItemFailure::FullHealth => "already at full health",
            ItemFailure::NoIntel => "no intel available",
            ItemFailure::NothingToSteal => "nothing to steal",
            ItemFailure::OneShellLeft => "only one shell left",
            ItemFailure::ChamberEmpty => "chamber is empty",
        }
    }
}

/// Randomness item effects consume. Local play draws from the match RNG;
/// multiplayer replay supplies the draws the authority already made.
pub trait DrawSource {
    /// Index in `[lo, hi)` for a PHONE peek.
    fn peek_index(&mut self, lo: usize, hi: usize) -> usize;
    fn lie(&mut self, percent: u32) -> bool;
    fn roll_items(&mut self, weights: &[ItemWeight], count: usize) -> Vec<ItemType>;
}

impl DrawSource for RngState {
    fn peek_index(&mut self, lo: usize, hi: usize) -> usize {
        lo + self.below((hi - lo) as u64) as usize
    }

    fn lie(&mut self, percent: u32) -> bool {
        self.percent(percent)
    }

    fn roll_items(&mut self, weights: &[ItemWeight], count: usize) -> Vec<ItemType> {
        roll_items(weights, count, self)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedDraws {
    #[serde(default)]
    pub peek_index: Option<usize>,
    #[serde(default)]
    pub lie: bool,
    #[serde(default)]
    pub items: Vec<ItemType>,
}

impl DrawSource for RecordedDraws {
    fn peek_index(&mut self, lo: usize, hi: usize) -> usize {
        self.peek_index.unwrap_or(lo).clamp(lo, hi.saturating_sub(1).max(lo))
    }

    fn lie(&mut self, _percent: u32) -> bool {
        self.lie
    }

    fn roll_items(&mut self, _weights: &[ItemWeight], count: usize) -> Vec<ItemType> {
        self.items.iter().copied().take(count).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ItemEffect {
    Revealed { index: usize, shell: Shell },
    Ejected { shell: Shell },
    Healed { hp: u32 },
    Cuffed,
    SawPrimed,
    ChokePrimed,
    /// PHONE result. `reported` may be a lie.
    Intel { index: usize, reported: Shell },
    Inverted { index: usize },
    InvertedAll,
    Swapped { index: usize },
    StealReady,
    Contract { hp: u32, granted: Vec<ItemType> },
    Failed { reason: ItemFailure, refunded: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemOutcome {
    pub user: Side,
    pub item: ItemType,
    pub effect: ItemEffect,
    pub chamber_exhausted: bool,
    pub eliminated: Option<Side>,
}

impl ItemOutcome {
    pub fn failed(&self) -> Option<ItemFailure> {
        match self.effect {
            ItemEffect::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }

    pub fn refunded(&self) -> bool {
        matches!(self.effect, ItemEffect::Failed { refunded: true, .. })
    }
}

/// Applies `item` for `user` and returns the effect it had on the table, or
/// `ItemEffect::Failed` when a precondition stops it. The item must already
/// be out of the user's inventory. The controller wraps the effect in an
/// `ItemOutcome` and puts a refunded item back. Preconditions are checked
/// before anything is touched.
pub fn apply_item<D: DrawSource + ?Sized>(
    table: &mut Table,
    user: Side,
    item: ItemType,
    rules: &RulesConfig,
    draws: &mut D,
) -> ItemEffect {
    let cursor = table.chamber.cursor();
    match item {
        ItemType::Glass => match table.chamber.current() {
            Some(shell) => ItemEffect::Revealed {
                index: cursor,
                shell,
            },
            None => failed(ItemFailure::ChamberEmpty),
        },
        ItemType::Beer => {
            if table.chamber.is_exhausted() {
                return failed(ItemFailure::ChamberEmpty);
            }
            match table.chamber.consume(1) {
                Ok(shells) => ItemEffect::Ejected { shell: shells[0] },
                Err(_) => failed(ItemFailure::ChamberEmpty),
            }
        }
        ItemType::Cigs => {
            let seat = table.seat_mut(user);
            if seat.hp >= seat.max_hp {
                return failed(ItemFailure::FullHealth);
            }
            seat.hp = (seat.hp + 1).min(seat.max_hp);
            ItemEffect::Healed { hp: seat.hp }
        }
        ItemType::Cuffs => {
            let target = table.seat_mut(user.opponent());
            if target.is_handcuffed {
                return ItemEffect::Failed {
                    reason: ItemFailure::AlreadyCuffed,
                    refunded: true,
                };
            }
            target.is_handcuffed = true;
            ItemEffect::Cuffed
        }
        ItemType::Saw => {
            let seat = table.seat_mut(user);
            if seat.is_sawed_active {
                return failed(ItemFailure::AlreadyActive);
            }
            seat.is_sawed_active = true;
            ItemEffect::SawPrimed
        }
        ItemType::Choke => {
            let seat = table.seat_mut(user);
            if seat.is_choke_active {
                return failed(ItemFailure::AlreadyActive);
            }
            seat.is_choke_active = true;
            ItemEffect::ChokePrimed
        }
        ItemType::Phone => {
            let lo = cursor + 2;
            let hi = table.chamber.len();
            if lo >= hi {
                return failed(ItemFailure::NoIntel);
            }
            let index = draws.peek_index(lo, hi);
            let Some(actual) = table.chamber.peek(index) else {
                return failed(ItemFailure::NoIntel);
            };
            let reported = if draws.lie(rules.phone_lie_percent) {
                actual.flipped()
            } else {
                actual
            };
            ItemEffect::Intel { index, reported }
        }
        ItemType::Inverter => match table.chamber.invert(cursor) {
            Ok(_) => ItemEffect::Inverted { index: cursor },
            Err(_) => failed(ItemFailure::ChamberEmpty),
        },
        ItemType::BigInverter => {
            if table.chamber.is_exhausted() {
                return failed(ItemFailure::ChamberEmpty);
            }
            table.chamber.invert_all();
            ItemEffect::InvertedAll
        }
        ItemType::Remote => {
            if table.chamber.remaining() < 2 {
                return failed(ItemFailure::OneShellLeft);
            }
            match table.chamber.swap_adjacent(cursor) {
                Ok(()) => ItemEffect::Swapped { index: cursor },
                Err(_) => failed(ItemFailure::OneShellLeft),
            }
        }
        ItemType::Adrenaline => {
            if table.seat(user.opponent()).has_stealable() {
                ItemEffect::StealReady
            } else {
                failed(ItemFailure::NothingToSteal)
            }
        }
        ItemType::Contract => {
            let granted = draws.roll_items(&rules.item_weights, 2);
            let seat = table.seat_mut(user);
            seat.take_damage(1);
            merge_items(&mut seat.items, &granted, rules.max_items, false);
            ItemEffect::Contract {
                hp: seat.hp,
                granted,
            }
        }
    }
}

fn failed(reason: ItemFailure) -> ItemEffect {
    ItemEffect::Failed {
        reason,
        refunded: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Chamber, Combatant};
    use Shell::{Blank, Live};

    fn table(shells: Vec<Shell>) -> Table {
        Table::new(
            Chamber::from_shells(shells),
            Combatant::new(4),
            Combatant::new(4),
        )
    }

    fn apply(table: &mut Table, user: Side, item: ItemType, rng: &mut RngState) -> ItemEffect {
        apply_item(table, user, item, &RulesConfig::default(), rng)
    }

    #[test]
    fn glass_reveals_without_mutating() {
        let mut t = table(vec![Blank, Live]);
        let before = t.clone();
        let mut rng = RngState::scripted(vec![0]);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Glass, &mut rng),
            ItemEffect::Revealed {
                index: 0,
                shell: Blank
            }
        );
        assert_eq!(t, before);
    }

    #[test]
    fn beer_ejects_current_shell() {
        let mut t = table(vec![Live, Blank]);
        let mut rng = RngState::scripted(vec![0]);
        assert_eq!(
            apply(&mut t, Side::Dealer, ItemType::Beer, &mut rng),
            ItemEffect::Ejected { shell: Live }
        );
        assert_eq!(t.chamber.cursor(), 1);
        assert_eq!(t.chamber.live_remaining(), 0);
        assert_eq!(t.player.hp, 4);
        assert_eq!(t.dealer.hp, 4);
    }

    #[test]
    fn cigs_heal_clamped_or_wasted() {
        let mut t = table(vec![Live, Blank]);
        let mut rng = RngState::scripted(vec![0]);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Cigs, &mut rng),
            ItemEffect::Failed {
                reason: ItemFailure::FullHealth,
                refunded: false
            }
        );
        t.player.hp = 2;
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Cigs, &mut rng),
            ItemEffect::Healed { hp: 3 }
        );
    }

    #[test]
    fn cuffs_on_cuffed_target_refund() {
        let mut t = table(vec![Live, Blank]);
        t.dealer.is_handcuffed = true;
        let before = t.clone();
        let mut rng = RngState::scripted(vec![0]);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Cuffs, &mut rng),
            ItemEffect::Failed {
                reason: ItemFailure::AlreadyCuffed,
                refunded: true
            }
        );
        assert_eq!(t, before);
    }

    #[test]
    fn saw_and_choke_do_not_stack() {
        let mut t = table(vec![Live, Blank]);
        let mut rng = RngState::scripted(vec![0]);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Saw, &mut rng),
            ItemEffect::SawPrimed
        );
        assert!(apply(&mut t, Side::Player, ItemType::Saw, &mut rng) != ItemEffect::SawPrimed);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Choke, &mut rng),
            ItemEffect::ChokePrimed
        );
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Choke, &mut rng),
            ItemEffect::Failed {
                reason: ItemFailure::AlreadyActive,
                refunded: false
            }
        );
        assert!(t.player.is_sawed_active && t.player.is_choke_active);
    }

    #[test]
    fn phone_needs_a_shell_two_ahead() {
        let mut t = table(vec![Live, Blank]);
        let mut rng = RngState::scripted(vec![0]);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Phone, &mut rng),
            ItemEffect::Failed {
                reason: ItemFailure::NoIntel,
                refunded: false
            }
        );
    }

    #[test]
    fn phone_reports_truth_or_lie() {
        let mut t = table(vec![Live, Blank, Blank, Live]);
        // peek draw picks offset 1 of [2, 4) -> index 3; lie roll 50 >= 5.
        let mut rng = RngState::scripted(vec![1, 50]);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Phone, &mut rng),
            ItemEffect::Intel {
                index: 3,
                reported: Live
            }
        );
        // Same peek, lie roll 4 < 5.
        let mut rng = RngState::scripted(vec![1, 4]);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Phone, &mut rng),
            ItemEffect::Intel {
                index: 3,
                reported: Blank
            }
        );
    }

    #[test]
    fn inverter_recounts() {
        let mut t = table(vec![Blank, Blank, Live]);
        let mut rng = RngState::scripted(vec![0]);
        apply(&mut t, Side::Player, ItemType::Inverter, &mut rng);
        assert_eq!(t.chamber.current(), Some(Live));
        assert_eq!(t.chamber.live_remaining(), 2);
        assert_eq!(t.chamber.blank_remaining(), 1);
    }

    #[test]
    fn big_inverter_twice_restores_chamber() {
        let mut t = table(vec![Blank, Live, Live, Blank]);
        t.chamber.consume(1).unwrap();
        let before = t.clone();
        let mut rng = RngState::scripted(vec![0]);
        apply(&mut t, Side::Player, ItemType::BigInverter, &mut rng);
        assert_eq!(t.chamber.live_remaining(), 1);
        apply(&mut t, Side::Player, ItemType::BigInverter, &mut rng);
        assert_eq!(t, before);
    }

    #[test]
    fn remote_swaps_next_two() {
        let mut t = table(vec![Live, Blank]);
        let mut rng = RngState::scripted(vec![0]);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Remote, &mut rng),
            ItemEffect::Swapped { index: 0 }
        );
        assert_eq!(t.chamber.remaining_shells(), &[Blank, Live]);
        t.chamber.consume(1).unwrap();
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Remote, &mut rng),
            ItemEffect::Failed {
                reason: ItemFailure::OneShellLeft,
                refunded: false
            }
        );
    }

    #[test]
    fn adrenaline_requires_stealable_item() {
        let mut t = table(vec![Live, Blank]);
        let mut rng = RngState::scripted(vec![0]);
        t.dealer.items.push(ItemType::Adrenaline);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Adrenaline, &mut rng),
            ItemEffect::Failed {
                reason: ItemFailure::NothingToSteal,
                refunded: false
            }
        );
        t.dealer.items.push(ItemType::Saw);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Adrenaline, &mut rng),
            ItemEffect::StealReady
        );
    }

    #[test]
    fn contract_trades_hp_for_items() {
        let mut t = table(vec![Live, Blank]);
        t.player.hp = 1;
        let mut rng = RngState::scripted(vec![0, 25]);
        assert_eq!(
            apply(&mut t, Side::Player, ItemType::Contract, &mut rng),
            ItemEffect::Contract {
                hp: 0,
                granted: vec![ItemType::Beer, ItemType::Cigs]
            }
        );
        assert_eq!(t.player.items, vec![ItemType::Beer, ItemType::Cigs]);
    }

    #[test]
    fn recorded_draws_drive_phone_and_contract() {
        let mut t = table(vec![Live, Blank, Blank, Live, Blank]);
        let mut draws = RecordedDraws {
            peek_index: Some(4),
            lie: true,
            items: vec![ItemType::Saw, ItemType::Glass],
        };
        let rules = RulesConfig::default();
        assert_eq!(
            apply_item(&mut t, Side::Dealer, ItemType::Phone, &rules, &mut draws),
            ItemEffect::Intel {
                index: 4,
                reported: Live
            }
        );
        apply_item(&mut t, Side::Dealer, ItemType::Contract, &rules, &mut draws);
        assert_eq!(t.dealer.items, vec![ItemType::Saw, ItemType::Glass]);
    }
}
