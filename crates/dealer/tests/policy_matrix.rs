use roulette_core::{
    GamePhase, GameSnapshot, ItemType, MatchContext, MatchMode, RngState, SeatView, Shell, Side,
};
use roulette_dealer::{
    choose_item, choose_steal, choose_target, shell_odds, DealerConfig, DealerMemory, ShellOdds,
};

struct Setup {
    total: usize,
    spent: usize,
    live: usize,
    known: Vec<(usize, Shell)>,
    dealer: SeatView,
    player: SeatView,
}

fn seat(hp: u32) -> SeatView {
    SeatView {
        hp,
        max_hp: 4,
        items: Vec::new(),
        is_handcuffed: false,
        is_sawed_active: false,
        is_choke_active: false,
    }
}

impl Setup {
    fn new() -> Self {
        Self {
            total: 6,
            spent: 0,
            live: 3,
            known: Vec::new(),
            dealer: seat(4),
            player: seat(4),
        }
    }

    fn decide(&self) -> Option<ItemType> {
        let snapshot = GameSnapshot {
            phase: GamePhase::DealerTurn,
            turn_owner: Side::Dealer,
            shells_total: self.total,
            shells_spent: self.spent,
            live_remaining: self.live,
            blank_remaining: self.total - self.spent - self.live,
            player: self.player.clone(),
            dealer: self.dealer.clone(),
            context: MatchContext::new(MatchMode::Normal),
            aim: None,
            winner: None,
        };
        let mut memory = DealerMemory::new();
        memory.sync(1, self.spent);
        for (index, shell) in &self.known {
            memory.record(*index, *shell);
        }
        let odds = shell_odds(&snapshot, &memory);
        choose_item(
            &snapshot,
            Side::Dealer,
            &memory,
            odds,
            &DealerConfig::default(),
        )
    }
}

macro_rules! priority_case {
    ($name:ident, |$s:ident| $setup:block, $expected:expr) => {
        #[test]
        fn $name() {
            let mut $s = Setup::new();
            $setup
            assert_eq!($s.decide(), $expected);
        }
    };
}

use ItemType::*;
use Shell::{Blank, Live};

priority_case!(heal_at_critical_hp, |s| {
    s.dealer.hp = 2;
    s.dealer.items = vec![Glass, Cigs];
}, Some(Cigs));
priority_case!(no_heal_at_full_health, |s| {
    s.dealer.hp = 2;
    s.dealer.max_hp = 2;
    s.dealer.items = vec![Cigs];
}, None);
priority_case!(glass_when_current_unknown, |s| {
    s.dealer.items = vec![Beer, Glass];
}, Some(Glass));
priority_case!(glass_skipped_on_last_shell, |s| {
    s.spent = 5;
    s.live = 1;
    s.dealer.items = vec![Glass];
}, None);
priority_case!(known_live_goes_to_saw, |s| {
    s.known = vec![(0, Live)];
    s.dealer.items = vec![Glass, Saw];
}, Some(Saw));
priority_case!(phone_with_three_left, |s| {
    s.known = vec![(0, Live)];
    s.dealer.items = vec![Phone];
}, Some(Phone));
priority_case!(phone_needs_unknown_shells_ahead, |s| {
    s.total = 3;
    s.live = 2;
    s.known = vec![(2, Live)];
    s.dealer.items = vec![Phone];
}, None);
priority_case!(beer_on_known_blank, |s| {
    s.known = vec![(0, Blank)];
    s.dealer.items = vec![Inverter, Beer];
}, Some(Beer));
priority_case!(beer_on_low_odds, |s| {
    s.live = 1;
    s.dealer.items = vec![Beer];
}, Some(Beer));
priority_case!(beer_kept_for_last_shell, |s| {
    s.spent = 5;
    s.live = 0;
    s.dealer.items = vec![Beer];
}, None);
priority_case!(inverter_on_known_blank, |s| {
    s.known = vec![(0, Blank)];
    s.dealer.items = vec![Inverter];
}, Some(Inverter));
priority_case!(cuffs_when_likely_live, |s| {
    s.live = 5;
    s.dealer.items = vec![Saw, Cuffs];
}, Some(Cuffs));
priority_case!(cuffs_skipped_when_already_cuffed, |s| {
    s.live = 5;
    s.player.is_handcuffed = true;
    s.dealer.items = vec![Cuffs];
}, None);
priority_case!(saw_when_very_likely_live, |s| {
    s.live = 5;
    s.dealer.items = vec![Saw];
}, Some(Saw));
priority_case!(saw_skipped_against_one_hp, |s| {
    s.live = 5;
    s.player.hp = 1;
    s.dealer.items = vec![Saw];
}, None);
priority_case!(saw_skipped_when_primed, |s| {
    s.live = 5;
    s.dealer.is_sawed_active = true;
    s.dealer.items = vec![Saw];
}, None);
priority_case!(adrenaline_when_something_to_steal, |s| {
    s.player.items = vec![Beer];
    s.dealer.items = vec![Adrenaline];
}, Some(Adrenaline));
priority_case!(adrenaline_never_targets_adrenaline, |s| {
    s.player.items = vec![Adrenaline];
    s.dealer.items = vec![Adrenaline];
}, None);
priority_case!(top_off_heal, |s| {
    s.dealer.hp = 3;
    s.dealer.items = vec![Cigs];
}, Some(Cigs));
priority_case!(special_items_are_left_alone, |s| {
    s.live = 5;
    s.dealer.items = vec![Choke, Remote, BigInverter, Contract];
}, None);

macro_rules! steal_case {
    ($name:ident, [$($item:expr),*], hp: $hp:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let items: Vec<ItemType> = vec![$($item),*];
            assert_eq!(choose_steal(&items, $hp, &DealerConfig::default()), $expected);
        }
    };
}

steal_case!(steal_prefers_saw, [Beer, Saw, Cigs], hp: 4, Some(1));
steal_case!(steal_cigs_when_critical, [Beer, Saw, Cigs], hp: 2, Some(2));
steal_case!(steal_inverter_over_cuffs, [Cuffs, Inverter], hp: 4, Some(1));
steal_case!(steal_falls_back_to_first_stealable, [Adrenaline, Remote], hp: 4, Some(1));
steal_case!(steal_nothing, [Adrenaline], hp: 4, None);

fn odds(p: f64) -> ShellOdds {
    ShellOdds {
        known: None,
        current_live: p,
        unknown_live: p,
    }
}

macro_rules! target_case {
    ($name:ident, $p:expr, $draw:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let mut rng = RngState::scripted(vec![$draw]);
            assert_eq!(
                choose_target(odds($p), Side::Dealer, &DealerConfig::default(), &mut rng),
                $expected
            );
        }
    };
}

target_case!(target_known_live, 1.0, 1, Side::Player);
target_case!(target_likely_live, 0.6, 1, Side::Player);
target_case!(target_known_blank, 0.0, 0, Side::Dealer);
target_case!(target_likely_blank, 0.3, 0, Side::Dealer);
target_case!(target_coin_heads, 0.5, 0, Side::Player);
target_case!(target_coin_tails, 0.5, 1, Side::Dealer);

#[test]
fn unknown_odds_exclude_known_shells() {
    let snapshot = GameSnapshot {
        phase: GamePhase::DealerTurn,
        turn_owner: Side::Dealer,
        shells_total: 6,
        shells_spent: 0,
        live_remaining: 3,
        blank_remaining: 3,
        player: seat(4),
        dealer: seat(4),
        context: MatchContext::new(MatchMode::Normal),
        aim: None,
        winner: None,
    };
    let mut memory = DealerMemory::new();
    memory.sync(1, 0);
    memory.record(3, Live);
    let odds = shell_odds(&snapshot, &memory);
    assert_eq!(odds.known, None);
    assert!((odds.current_live - 0.4).abs() < 1e-9);
    memory.record(0, Blank);
    assert_eq!(shell_odds(&snapshot, &memory).current_live, 0.0);
}
