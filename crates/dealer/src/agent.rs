use crate::{
    choose_item, choose_steal, choose_target, seats, shell_odds, DealerAction, DealerConfig,
    DealerError, DealerMemory,
};
use roulette_core::{
    Event, EventBus, GamePhase, ItemEffect, ItemOutcome, MatchState, RngState, RunError, Side,
};
use tracing::debug;

/// Drives one seat from the public snapshot and its own private memory.
/// It never looks at the authoritative shell order.
#[derive(Debug, Clone)]
pub struct DealerAgent {
    side: Side,
    config: DealerConfig,
    memory: DealerMemory,
    rng: RngState,
    in_flight: bool,
    items_this_turn: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub actions: Vec<DealerAction>,
}

impl DealerAgent {
    pub fn new(config: DealerConfig) -> Self {
        Self::for_side(Side::Dealer, config)
    }

    pub fn for_side(side: Side, config: DealerConfig) -> Self {
        Self {
            side,
            config,
            memory: DealerMemory::new(),
            rng: RngState::from_seed(config.seed),
            in_flight: false,
            items_this_turn: 0,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn config(&self) -> &DealerConfig {
        &self.config
    }

    pub fn memory(&self) -> &DealerMemory {
        &self.memory
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Feeds a public event caused by someone else. Events produced inside
    /// `step`/`take_turn` are already observed and must not be fed back.
    pub fn observe(&mut self, event: &Event) {
        self.memory.observe(event);
    }

    pub fn wants_to_act(&self, state: &MatchState) -> bool {
        match state.phase() {
            GamePhase::Stealing => state.stealer() == Some(self.side),
            phase => phase == GamePhase::turn_of(self.side),
        }
    }

    /// Picks the next action without performing it.
    pub fn decide(&mut self, state: &MatchState) -> DealerAction {
        let snapshot = state.snapshot();
        self.memory.sync(state.batch_id(), snapshot.shells_spent);
        let (me, them) = seats(&snapshot, self.side);

        if snapshot.phase == GamePhase::Stealing {
            if let Some(index) = choose_steal(&them.items, me.hp, &self.config) {
                return DealerAction::Steal {
                    index,
                    item: them.items[index],
                };
            }
        }

        let odds = shell_odds(&snapshot, &self.memory);
        debug!(
            side = ?self.side,
            live = odds.current_live,
            unknown_live = odds.unknown_live,
            known = ?odds.known,
            "dealer odds"
        );
        if self.items_this_turn < self.config.max_items_per_turn {
            let choice = choose_item(&snapshot, self.side, &self.memory, odds, &self.config);
            if let Some(item) = choice {
                if let Some(index) = me.items.iter().position(|held| *held == item) {
                    return DealerAction::UseItem { index, item };
                }
            }
        }
        let target = choose_target(odds, self.side, &self.config, &mut self.rng);
        DealerAction::Fire { target }
    }

    /// Performs at most one action. Returns `None` once the seat has nothing
    /// left to do, which also closes the turn.
    pub fn step(
        &mut self,
        state: &mut MatchState,
        events: &mut EventBus,
    ) -> Result<Option<DealerAction>, DealerError> {
        if !self.wants_to_act(state) {
            self.end_turn();
            return Ok(None);
        }
        if state.is_processing() {
            return Err(RunError::Busy.into());
        }
        self.in_flight = true;
        let action = self.decide(state);
        let mut local = EventBus::default();
        let result = match action {
            DealerAction::UseItem { index, .. } => {
                self.items_this_turn += 1;
                state.use_item(self.side, index, &mut local).map(Some)
            }
            DealerAction::Steal { index, .. } => {
                state.steal_item(self.side, index, &mut local).map(Some)
            }
            DealerAction::Fire { target } => state.fire(self.side, target, &mut local).map(|_| None),
        };
        self.forward(local, events);
        if let Some(outcome) = result.map_err(|err| self.abort(err))? {
            self.learn(&outcome);
        }
        if !self.wants_to_act(state) {
            self.end_turn();
        }
        Ok(Some(action))
    }

    /// Plays the seat's whole turn. Refuses to start while a stepped turn is
    /// still in flight.
    pub fn take_turn(
        &mut self,
        state: &mut MatchState,
        events: &mut EventBus,
    ) -> Result<TurnReport, DealerError> {
        if self.in_flight {
            return Err(DealerError::InFlight);
        }
        let mut report = TurnReport::default();
        while let Some(action) = self.step(state, events)? {
            debug!(side = ?self.side, action = %action.short_label(), "dealer acted");
            report.actions.push(action);
        }
        Ok(report)
    }

    fn forward(&mut self, mut local: EventBus, events: &mut EventBus) {
        for event in local.drain() {
            self.memory.observe(&event);
            events.push(event);
        }
    }

    fn learn(&mut self, outcome: &ItemOutcome) {
        match outcome.effect {
            ItemEffect::Revealed { index, shell } => self.memory.record(index, shell),
            ItemEffect::Intel { index, reported } => {
                if self.rng.percent(self.config.phone_trust_percent) {
                    self.memory.record(index, reported);
                } else {
                    debug!(index, "phone intel discarded");
                }
            }
            _ => {}
        }
    }

    fn abort(&mut self, err: RunError) -> DealerError {
        self.end_turn();
        err.into()
    }

    fn end_turn(&mut self) {
        self.in_flight = false;
        self.items_this_turn = 0;
    }
}
