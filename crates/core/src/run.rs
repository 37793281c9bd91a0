use crate::{
    Chamber, ChamberError, Combatant, GamePhase, GameSettings, GameSnapshot, ItemType, LootGrant,
    MatchConfig, MatchContext, MatchStats, RngState, RulesConfig, Side, Table,
};
use thiserror::Error;

mod actions;
mod lifecycle;
mod replay;

pub use actions::{FireRequest, Submitted};
pub use replay::{InboundAction, Intent};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("invalid phase: {0:?}")]
    InvalidPhase(GamePhase),
    #[error("not the {0:?} seat's turn")]
    NotYourTurn(Side),
    #[error("another action is still resolving")]
    Busy,
    #[error("invalid item index {0}")]
    InvalidItemIndex(usize),
    #[error("{0:?} cannot be stolen")]
    NotStealable(ItemType),
    #[error("lower the gun before using items")]
    GunRaised,
    #[error("outcomes are decided by the remote authority")]
    RemoteAuthoritative,
    #[error("match is not multiplayer")]
    NotMultiplayer,
    #[error("chamber error: {0}")]
    Chamber(#[from] ChamberError),
}

/// The single authoritative match: chamber, both seats, progression context
/// and phase. Every mutation goes through its methods, one at a time.
#[derive(Debug)]
pub struct MatchState {
    pub rules: RulesConfig,
    pub settings: GameSettings,
    config: MatchConfig,
    rng: RngState,
    table: Table,
    context: MatchContext,
    phase: GamePhase,
    turn_owner: Side,
    stats: MatchStats,
    winner: Option<Side>,
    aim: Option<Side>,
    processing: bool,
    pending_loot: Option<LootGrant>,
    stealer: Option<Side>,
    batch_id: u64,
    outbound: Vec<Intent>,
}

impl MatchState {
    pub fn new(rules: RulesConfig, config: MatchConfig) -> Self {
        let hp = rules.normal_hp;
        Self {
            rules,
            settings: GameSettings::default(),
            config,
            rng: RngState::from_seed(config.seed),
            table: Table::new(Chamber::empty(), Combatant::new(hp), Combatant::new(hp)),
            context: MatchContext::new(config.mode),
            phase: GamePhase::Boot,
            turn_owner: Side::Player,
            stats: MatchStats::default(),
            winner: None,
            aim: None,
            processing: false,
            pending_loot: None,
            stealer: None,
            batch_id: 0,
            outbound: Vec::new(),
        }
    }

    /// Replaces the random source. Takes effect for every later draw.
    pub fn with_rng(mut self, rng: RngState) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> MatchConfig {
        self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn turn_owner(&self) -> Side {
        self.turn_owner
    }

    pub fn context(&self) -> &MatchContext {
        &self.context
    }

    pub fn stats(&self) -> &MatchStats {
        &self.stats
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn aim(&self) -> Option<Side> {
        self.aim
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn pending_loot(&self) -> Option<&LootGrant> {
        self.pending_loot.as_ref()
    }

    /// Seat currently allowed to take an item from its opponent.
    pub fn stealer(&self) -> Option<Side> {
        self.stealer
    }

    /// Increments every time a chamber is installed.
    pub fn batch_id(&self) -> u64 {
        self.batch_id
    }

    pub fn seat(&self, side: Side) -> &Combatant {
        self.table.seat(side)
    }

    /// Authoritative table, hidden shell order included. Not for display.
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let chamber = &self.table.chamber;
        GameSnapshot {
            phase: self.phase,
            turn_owner: self.turn_owner,
            shells_total: chamber.len(),
            shells_spent: chamber.cursor(),
            live_remaining: chamber.live_remaining(),
            blank_remaining: chamber.blank_remaining(),
            player: (&self.table.player).into(),
            dealer: (&self.table.dealer).into(),
            context: self.context.clone(),
            aim: self.aim,
            winner: self.winner,
        }
    }

    /// Adds any item, special ones included, up to the inventory limit.
    /// Returns false when the inventory is full.
    pub fn grant_item(&mut self, side: Side, item: ItemType) -> bool {
        let max = self.rules.max_items;
        let items = &mut self.table.seat_mut(side).items;
        if items.len() >= max {
            return false;
        }
        items.push(item);
        true
    }

    /// Intents queued by local requests in multiplayer, for the transport.
    pub fn take_outbound(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.outbound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventBus, MatchMode, Shell};

    fn started(seed: u64) -> (MatchState, EventBus) {
        let mut events = EventBus::default();
        let mut state = MatchState::new(RulesConfig::default(), MatchConfig::normal(seed));
        state
            .request_start_match(MatchConfig::normal(seed), &mut events)
            .unwrap();
        state.commit_loot(&mut events).unwrap();
        (state, events)
    }

    #[test]
    fn start_reveals_then_commits_loot() {
        let mut events = EventBus::default();
        let mut state = MatchState::new(RulesConfig::default(), MatchConfig::normal(1));
        state
            .request_start_match(MatchConfig::normal(1), &mut events)
            .unwrap();
        assert_eq!(state.phase(), GamePhase::Looting);
        let grant = state.pending_loot().cloned().unwrap();
        assert_eq!(grant.player.len(), 2);
        assert!(state.seat(Side::Player).items.is_empty());
        state.commit_loot(&mut events).unwrap();
        assert_eq!(state.seat(Side::Player).items, grant.player);
        assert_eq!(state.seat(Side::Dealer).items, grant.dealer);
        assert_eq!(state.phase(), GamePhase::PlayerTurn);
    }

    #[test]
    fn busy_flag_rejects_new_actions() {
        let (mut state, mut events) = started(2);
        state.processing = true;
        assert_eq!(
            state.request_fire(Side::Dealer, &mut events),
            Err(RunError::Busy)
        );
        state.processing = false;
        assert!(state.request_fire(Side::Dealer, &mut events).is_ok());
    }

    #[test]
    fn snapshot_hides_shell_order() {
        let (state, _) = started(3);
        let json = serde_json::to_string(&state.snapshot()).unwrap();
        assert!(!json.contains("Live\""));
        assert!(json.contains("live_remaining"));
    }

    #[test]
    fn handcuffed_dealer_is_skipped_once() {
        let (mut state, mut events) = started(4);
        state.table.chamber = Chamber::from_shells(vec![Shell::Blank, Shell::Blank, Shell::Live]);
        state.table.dealer.is_handcuffed = true;
        state.fire(Side::Player, Side::Dealer, &mut events).unwrap();
        assert_eq!(state.turn_owner(), Side::Player);
        assert!(!state.seat(Side::Dealer).is_handcuffed);
        state.fire(Side::Player, Side::Dealer, &mut events).unwrap();
        assert_eq!(state.turn_owner(), Side::Dealer);
    }

    #[test]
    fn multiplayer_context_records_room() {
        let room = crate::RoomSettings {
            rounds: 5,
            hp: 3,
            items_per_shipment: 1,
        };
        let state = MatchState::new(
            RulesConfig::default(),
            MatchConfig {
                mode: MatchMode::Multiplayer(room),
                seed: 0,
            },
        );
        assert!(state.context().is_multiplayer);
        assert_eq!(state.context().room_settings, Some(room));
    }
}
