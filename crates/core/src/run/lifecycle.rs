use super::*;
use crate::{
    calculate_match_score, distribute, merge_items, Event, EventBus, MatchMode, MatchResult,
};
use tracing::info;

impl MatchState {
    pub fn request_start_match(
        &mut self,
        config: MatchConfig,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        self.ensure_idle()?;
        if !matches!(self.phase, GamePhase::Boot | GamePhase::GameOver) {
            return Err(self.reject(RunError::InvalidPhase(self.phase)));
        }
        self.reset_state(config);
        if self.context.is_multiplayer {
            self.outbound.push(Intent::StartMatch { config });
        }
        self.open_match(events);
        Ok(())
    }

    /// Restarts the current configuration, or drops back to the menu.
    pub fn request_reset_match(
        &mut self,
        to_menu: bool,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        self.ensure_idle()?;
        if self.context.is_multiplayer {
            self.outbound.push(Intent::ResetMatch { to_menu });
        }
        self.reset_state(self.config);
        if to_menu {
            return Ok(());
        }
        self.open_match(events);
        Ok(())
    }

    /// Installs an externally chosen chamber and shipment as the next batch.
    pub fn begin_batch_with(
        &mut self,
        chamber: Chamber,
        grant: LootGrant,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        self.ensure_idle()?;
        if matches!(
            self.phase,
            GamePhase::Boot | GamePhase::GameOver | GamePhase::Looting | GamePhase::Stealing
        ) {
            return Err(self.reject(RunError::InvalidPhase(self.phase)));
        }
        if chamber.is_exhausted() {
            return Err(self.reject(RunError::Chamber(ChamberError::Exhausted {
                requested: 1,
                remaining: 0,
            })));
        }
        self.install_batch(chamber, grant, events);
        Ok(())
    }

    /// Second half of the shipment: merges the revealed items and hands the
    /// turn to the current owner.
    pub fn commit_loot(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.ensure_idle()?;
        if self.phase != GamePhase::Looting {
            return Err(self.reject(RunError::InvalidPhase(self.phase)));
        }
        let Some(grant) = self.pending_loot.take() else {
            return Err(self.reject(RunError::InvalidPhase(self.phase)));
        };
        let max = self.rules.max_items;
        merge_items(&mut self.table.player.items, &grant.player, max, grant.reset_all);
        merge_items(&mut self.table.dealer.items, &grant.dealer, max, grant.reset_all);
        events.push(Event::ItemsCommitted);
        self.enter_turn(self.turn_owner, events);
        Ok(())
    }

    fn reset_state(&mut self, config: MatchConfig) {
        self.config = config;
        self.rng = RngState::from_seed(config.seed);
        self.context = MatchContext::new(config.mode);
        self.phase = GamePhase::Boot;
        self.turn_owner = Side::Player;
        self.stats = MatchStats::default();
        self.winner = None;
        self.aim = None;
        self.pending_loot = None;
        self.stealer = None;
        self.table = Table::new(
            Chamber::empty(),
            Combatant::new(self.rules.normal_hp),
            Combatant::new(self.rules.normal_hp),
        );
    }

    fn open_match(&mut self, events: &mut EventBus) {
        self.phase = GamePhase::Intro;
        info!(mode = ?self.config.mode, seed = self.config.seed, "match started");
        events.push(Event::MatchStarted {
            mode: self.config.mode,
        });
        self.start_stage(events);
    }

    fn stage_hp(&self) -> u32 {
        match self.config.mode {
            MatchMode::Normal => self.rules.normal_hp,
            MatchMode::Hard => self
                .rules
                .hard_mode_hp_for(self.context.hard_mode_state.round),
            MatchMode::Multiplayer(room) => self.context.room_settings.unwrap_or(room).hp,
        }
    }

    /// Full reset of HP and items. Multiplayer waits for the authority to
    /// deliver the round's chamber.
    pub(super) fn start_stage(&mut self, events: &mut EventBus) {
        let hp = self.stage_hp();
        self.table.player.reset(hp);
        self.table.dealer.reset(hp);
        self.context.round = 0;
        self.turn_owner = Side::Player;
        self.phase = GamePhase::Load;
        if self.context.is_multiplayer {
            return;
        }
        self.begin_batch(true, events);
    }

    fn begin_batch(&mut self, reset_all: bool, events: &mut EventBus) {
        let chamber = Chamber::load_batch(&self.rules, &mut self.rng);
        let per_side = self.context.room_settings.map(|room| room.items_per_shipment);
        let grant = distribute(
            &self.rules,
            self.context.round + 1,
            per_side,
            reset_all,
            &mut self.rng,
        );
        self.install_batch(chamber, grant, events);
    }

    pub(super) fn install_batch(&mut self, chamber: Chamber, grant: LootGrant, events: &mut EventBus) {
        self.phase = GamePhase::Load;
        self.context.round += 1;
        self.batch_id += 1;
        self.table.chamber = chamber;
        self.table.player.clear_transient();
        self.table.dealer.clear_transient();
        self.aim = None;
        self.stealer = None;
        events.push(Event::BatchLoaded {
            round: self.context.round,
            live: self.table.chamber.live_remaining(),
            blank: self.table.chamber.blank_remaining(),
        });
        events.push(Event::ItemsRevealed {
            player: grant.player.clone(),
            dealer: grant.dealer.clone(),
        });
        self.pending_loot = Some(grant);
        self.phase = GamePhase::Looting;
    }

    pub(super) fn enter_turn(&mut self, side: Side, events: &mut EventBus) {
        self.turn_owner = side;
        self.phase = GamePhase::turn_of(side);
        events.push(Event::TurnStarted { side });
    }

    /// The chamber ran dry with both seats alive.
    pub(super) fn end_batch(&mut self, next: Side, events: &mut EventBus) {
        if self.table.player.is_alive() {
            self.stats.rounds_survived += 1;
        }
        self.turn_owner = next;
        if self.context.is_multiplayer {
            self.phase = GamePhase::Load;
            return;
        }
        self.begin_batch(false, events);
    }

    pub(super) fn handle_elimination(&mut self, loser: Side, events: &mut EventBus) {
        events.push(Event::Eliminated { side: loser });
        let winner = loser.opponent();
        if self.context.is_multiplayer {
            // The authority announces the round result.
            self.phase = GamePhase::Resolving;
            return;
        }
        if !self.context.is_hard_mode {
            self.finish_match(winner, events);
            return;
        }
        let state = &mut self.context.hard_mode_state;
        match winner {
            Side::Player => state.player_wins += 1,
            Side::Dealer => state.dealer_wins += 1,
        }
        let (player_wins, dealer_wins) = (state.player_wins, state.dealer_wins);
        self.close_stage(winner, player_wins, dealer_wins, events);
        if self.context.wins_for(winner) >= self.rules.hard_mode_stage_wins {
            self.finish_match(winner, events);
        } else {
            self.context.hard_mode_state.round += 1;
            self.start_stage(events);
        }
    }

    pub(super) fn record_round_win(&mut self, winner: Side, events: &mut EventBus) {
        let state = &mut self.context.multi_mode_state;
        match winner {
            Side::Player => state.player_wins += 1,
            Side::Dealer => state.opponent_wins += 1,
        }
        let (player_wins, opponent_wins) = (state.player_wins, state.opponent_wins);
        self.close_stage(winner, player_wins, opponent_wins, events);
        let needed = self
            .context
            .room_settings
            .map(|room| room.wins_needed())
            .unwrap_or(1);
        if self.context.wins_for(winner) >= needed {
            self.finish_match(winner, events);
        } else {
            self.start_stage(events);
        }
    }

    fn close_stage(&mut self, winner: Side, player_wins: u32, dealer_wins: u32, events: &mut EventBus) {
        if winner == Side::Player {
            self.stats.rounds_survived += 1;
        }
        info!(?winner, player_wins, dealer_wins, "stage ended");
        events.push(Event::StageEnded {
            winner,
            player_wins,
            dealer_wins,
        });
    }

    pub(super) fn finish_match(&mut self, winner: Side, events: &mut EventBus) {
        self.phase = GamePhase::GameOver;
        self.winner = Some(winner);
        self.aim = None;
        self.stealer = None;
        self.pending_loot = None;
        self.stats.result = Some(if winner == Side::Player {
            MatchResult::Win
        } else {
            MatchResult::Loss
        });
        let score = calculate_match_score(&self.stats, self.context.is_hard_mode);
        self.stats.total_score = score;
        info!(?winner, score, "match ended");
        events.push(Event::MatchEnded { winner, score });
    }
}
