use roulette_core::{
    Chamber, Event, EventBus, GamePhase, ItemType, LootGrant, MatchConfig, MatchState,
    RngState, RulesConfig, Shell, Side,
};
use roulette_dealer::{
    simulate, simulate_batch, DealerAction, DealerAgent, DealerConfig, DealerError, PlayerPolicy,
    SimulationConfig, SimulationStatus,
};
use Shell::{Blank, Live};

/// Dealer to act on `[Blank, Live, Live]` with nothing but `dealer_items`.
fn dealer_to_act(dealer_items: Vec<ItemType>) -> (MatchState, EventBus, DealerAgent) {
    dealer_to_act_with(dealer_items, DealerConfig::default())
}

fn dealer_to_act_with(
    dealer_items: Vec<ItemType>,
    config: DealerConfig,
) -> (MatchState, EventBus, DealerAgent) {
    let mut events = EventBus::default();
    let mut state = MatchState::new(RulesConfig::default(), MatchConfig::normal(1));
    state
        .request_start_match(MatchConfig::normal(1), &mut events)
        .unwrap();
    state.commit_loot(&mut events).unwrap();
    let grant = LootGrant {
        player: Vec::new(),
        dealer: dealer_items,
        reset_all: true,
    };
    state
        .begin_batch_with(
            Chamber::from_shells(vec![Blank, Blank, Live, Live]),
            grant,
            &mut events,
        )
        .unwrap();
    state.commit_loot(&mut events).unwrap();
    state.fire(Side::Player, Side::Dealer, &mut events).unwrap();
    assert_eq!(state.phase(), GamePhase::DealerTurn);

    let mut agent = DealerAgent::new(config);
    for event in events.drain() {
        agent.observe(&event);
    }
    (state, events, agent)
}

#[test]
fn glass_then_self_shot_then_opponent() {
    let (mut state, mut events, mut agent) = dealer_to_act(vec![ItemType::Glass]);
    let report = agent.take_turn(&mut state, &mut events).unwrap();
    assert_eq!(
        report.actions,
        vec![
            DealerAction::UseItem {
                index: 0,
                item: ItemType::Glass
            },
            DealerAction::Fire {
                target: Side::Dealer
            },
            DealerAction::Fire {
                target: Side::Player
            },
        ]
    );
    assert_eq!(state.seat(Side::Player).hp, 3);
    assert_eq!(state.turn_owner(), Side::Player);
    assert!(!agent.is_in_flight());
}

#[test]
fn inverted_blank_is_fired_at_the_opponent() {
    let (mut state, mut events, mut agent) =
        dealer_to_act_with(vec![ItemType::Glass, ItemType::Inverter], DealerConfig::with_seed(11));
    let report = agent.take_turn(&mut state, &mut events).unwrap();
    assert_eq!(
        report.actions,
        vec![
            DealerAction::UseItem {
                index: 0,
                item: ItemType::Glass
            },
            DealerAction::UseItem {
                index: 0,
                item: ItemType::Inverter
            },
            DealerAction::Fire {
                target: Side::Player
            },
        ]
    );
    assert_eq!(state.seat(Side::Player).hp, 3);
    assert_eq!(state.turn_owner(), Side::Player);
}

/// Dealer holding only PHONE, with the match draws pinned to a truthful
/// report on shell 3.
fn phone_turn(trust: u32) -> (MatchState, EventBus, DealerAgent) {
    let config = DealerConfig {
        phone_trust_percent: trust,
        ..DealerConfig::with_seed(11)
    };
    let (state, events, agent) = dealer_to_act_with(vec![ItemType::Phone], config);
    (state.with_rng(RngState::scripted(vec![50])), events, agent)
}

#[test]
fn trusted_phone_report_is_remembered() {
    let (mut state, mut events, mut agent) = phone_turn(100);
    let action = agent.step(&mut state, &mut events).unwrap();
    assert_eq!(
        action,
        Some(DealerAction::UseItem {
            index: 0,
            item: ItemType::Phone
        })
    );
    assert_eq!(agent.memory().get(3), Some(Live));
}

#[test]
fn distrusted_phone_report_is_dropped() {
    let (mut state, mut events, mut agent) = phone_turn(0);
    agent.step(&mut state, &mut events).unwrap();
    assert_eq!(agent.memory().get(3), None);
    assert!(state.seat(Side::Dealer).items.is_empty());
}

#[test]
fn dealer_reveals_stay_private() {
    let (mut state, mut events, mut agent) = dealer_to_act(vec![ItemType::Glass]);
    agent.take_turn(&mut state, &mut events).unwrap();
    let log: Vec<Event> = events.drain().collect();
    assert!(log
        .iter()
        .any(|event| matches!(event, Event::ShellInspected { side: Side::Dealer })));
    assert!(log
        .iter()
        .all(|event| !matches!(event, Event::ShellRevealed { .. })));
}

#[test]
fn stepped_turn_blocks_a_second_driver() {
    let (mut state, mut events, mut agent) = dealer_to_act(vec![ItemType::Glass]);
    let first = agent.step(&mut state, &mut events).unwrap();
    assert!(matches!(first, Some(DealerAction::UseItem { .. })));
    assert!(agent.is_in_flight());
    assert!(matches!(
        agent.take_turn(&mut state, &mut events),
        Err(DealerError::InFlight)
    ));
    while agent.step(&mut state, &mut events).unwrap().is_some() {}
    assert!(!agent.is_in_flight());
    assert_eq!(state.phase(), GamePhase::PlayerTurn);
}

#[test]
fn idle_when_not_its_turn() {
    let (mut state, mut events, mut agent) = dealer_to_act(Vec::new());
    agent.take_turn(&mut state, &mut events).unwrap();
    let report = agent.take_turn(&mut state, &mut events).unwrap();
    assert!(report.actions.is_empty());
}

#[test]
fn adrenaline_steal_is_used_at_once() {
    let (mut state, mut events, mut agent) = dealer_to_act(vec![ItemType::Adrenaline]);
    assert!(state.grant_item(Side::Player, ItemType::Saw));
    agent.step(&mut state, &mut events).unwrap();
    assert_eq!(state.phase(), GamePhase::Stealing);
    let steal = agent.step(&mut state, &mut events).unwrap();
    assert_eq!(
        steal,
        Some(DealerAction::Steal {
            index: 0,
            item: ItemType::Saw
        })
    );
    assert!(state.seat(Side::Player).items.is_empty());
    assert!(state.seat(Side::Dealer).is_sawed_active);
    assert_eq!(state.phase(), GamePhase::DealerTurn);
}

#[test]
fn simulated_matches_finish() {
    let rules = RulesConfig::default();
    for player in [
        PlayerPolicy::Mirror(DealerConfig::default()),
        PlayerPolicy::Aggressive,
        PlayerPolicy::Random { seed: 3 },
    ] {
        let config = SimulationConfig {
            seed: 42,
            player,
            record_steps: true,
            ..SimulationConfig::default()
        };
        let report = simulate(rules.clone(), &config).unwrap();
        assert_eq!(report.status, SimulationStatus::Finished);
        let winner = report.winner.unwrap();
        assert_eq!(report.score > 0, winner == Side::Player);
        assert!(!report.steps.is_empty());
    }
}

#[test]
fn hard_mode_batch_summary_adds_up() {
    let config = SimulationConfig {
        seed: 7,
        hard_mode: true,
        ..SimulationConfig::default()
    };
    let summary = simulate_batch(&RulesConfig::default(), &config, 8).unwrap();
    assert_eq!(summary.matches, 8);
    assert_eq!(
        summary.player_wins + summary.dealer_wins + summary.unfinished,
        8
    );
    assert_eq!(summary.unfinished, 0);
    assert!(summary.reports.iter().all(|report| report.hard_mode));
    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("player_wins"));
}

mod any_seed {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn every_seed_reaches_a_winner(seed in any::<u64>(), hard in any::<bool>()) {
            let config = SimulationConfig {
                seed,
                hard_mode: hard,
                ..SimulationConfig::default()
            };
            let report = simulate(RulesConfig::default(), &config).unwrap();
            prop_assert_eq!(report.status, SimulationStatus::Finished);
            prop_assert!(report.winner.is_some());
            prop_assert!(report.stats.shots_hit <= report.stats.shots_fired);
        }
    }
}
