use super::*;
use crate::{conclude_shot, discharge, EventBus, RecordedDraws, RoomSettings, Shell};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// An authoritative decision delivered by the multiplayer transport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action_type", content = "payload", rename_all = "snake_case")]
pub enum InboundAction {
    RoomSettings(RoomSettings),
    RoundStarted {
        shells: Vec<Shell>,
        turn_owner: Side,
        hp: u32,
        player_items: Vec<ItemType>,
        opponent_items: Vec<ItemType>,
    },
    BatchLoaded {
        shells: Vec<Shell>,
        player_items: Vec<ItemType>,
        opponent_items: Vec<ItemType>,
    },
    ShotResolved {
        shooter: Side,
        target: Side,
        damage: u32,
        target_hp: u32,
    },
    ItemUsed {
        side: Side,
        index: usize,
        #[serde(default)]
        draws: RecordedDraws,
    },
    ItemStolen {
        side: Side,
        index: usize,
        #[serde(default)]
        draws: RecordedDraws,
    },
    RoundEnded {
        winner: Side,
    },
    MatchEnded {
        winner: Side,
    },
}

/// A local request waiting to be forwarded to the authority.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action_type", content = "payload", rename_all = "snake_case")]
pub enum Intent {
    PickupGun,
    LowerGun,
    Fire { target: Side },
    UseItem { index: usize },
    StealItem { index: usize },
    StartMatch { config: MatchConfig },
    ResetMatch { to_menu: bool },
}

impl MatchState {
    /// Replays one authoritative action. Outcomes come from the payload; the
    /// local resolvers only run so the same events reach presentation.
    pub fn apply_inbound(
        &mut self,
        action: InboundAction,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        if !self.context.is_multiplayer {
            return Err(self.reject(RunError::NotMultiplayer));
        }
        self.ensure_idle()?;
        match action {
            InboundAction::RoomSettings(room) => {
                info!(?room, "room settings received");
                self.context.room_settings = Some(room);
                Ok(())
            }
            InboundAction::RoundStarted {
                shells,
                turn_owner,
                hp,
                player_items,
                opponent_items,
            } => {
                self.ensure_in_match()?;
                self.table.player.reset(hp);
                self.table.dealer.reset(hp);
                self.context.round = 0;
                self.turn_owner = turn_owner;
                let grant = LootGrant {
                    player: player_items,
                    dealer: opponent_items,
                    reset_all: true,
                };
                self.replay_batch(shells, grant, events)
            }
            InboundAction::BatchLoaded {
                shells,
                player_items,
                opponent_items,
            } => {
                self.ensure_in_match()?;
                let grant = LootGrant {
                    player: player_items,
                    dealer: opponent_items,
                    reset_all: false,
                };
                self.replay_batch(shells, grant, events)
            }
            InboundAction::ShotResolved {
                shooter,
                target,
                damage,
                target_hp,
            } => {
                self.ensure_turn(shooter)?;
                self.aim = None;
                self.processing = true;
                let result = self.replay_shot(shooter, target, damage, target_hp, events);
                self.processing = false;
                result
            }
            InboundAction::ItemUsed {
                side,
                index,
                mut draws,
            } => {
                self.ensure_turn(side)?;
                self.ensure_item_index(side, index)?;
                self.use_item_locked(side, index, Some(&mut draws), events)
                    .map(|_| ())
            }
            InboundAction::ItemStolen {
                side,
                index,
                mut draws,
            } => {
                self.ensure_stealer(side, index)?;
                self.steal_locked(side, index, Some(&mut draws), events)
                    .map(|_| ())
            }
            InboundAction::RoundEnded { winner } => {
                self.ensure_in_match()?;
                self.record_round_win(winner, events);
                Ok(())
            }
            InboundAction::MatchEnded { winner } => {
                if self.phase == GamePhase::GameOver {
                    return Ok(());
                }
                self.finish_match(winner, events);
                Ok(())
            }
        }
    }

    fn ensure_in_match(&self) -> Result<(), RunError> {
        if matches!(self.phase, GamePhase::Boot | GamePhase::GameOver) {
            return Err(self.reject(RunError::InvalidPhase(self.phase)));
        }
        Ok(())
    }

    /// Fires locally for the shell bookkeeping, then routes the match on the
    /// authority's damage and HP rather than the local result.
    fn replay_shot(
        &mut self,
        shooter: Side,
        target: Side,
        damage: u32,
        target_hp: u32,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        self.phase = GamePhase::Resolving;
        let (shells, local_damage) = match discharge(&mut self.table, shooter) {
            Ok(fired) => fired,
            Err(err) => {
                self.phase = GamePhase::turn_of(shooter);
                return Err(self.reject(err.into()));
            }
        };
        if local_damage != damage {
            warn!(local = local_damage, remote = damage, "shot damage diverged");
        }
        let seat = self.table.seat_mut(target);
        let hp_before = seat.hp;
        let hp = target_hp.min(seat.max_hp);
        if hp != hp_before.saturating_sub(damage) {
            warn!(local = hp_before.saturating_sub(damage), remote = hp, ?target, "hp reconciled");
        }
        seat.hp = hp;
        let outcome = conclude_shot(
            &mut self.table,
            shooter,
            target,
            shells,
            damage,
            hp_before.saturating_sub(hp),
        );
        self.route_shot(outcome, events);
        Ok(())
    }

    fn replay_batch(
        &mut self,
        shells: Vec<Shell>,
        grant: LootGrant,
        events: &mut EventBus,
    ) -> Result<(), RunError> {
        let chamber = Chamber::from_shells(shells);
        if chamber.is_exhausted() {
            return Err(self.reject(RunError::Chamber(ChamberError::Exhausted {
                requested: 1,
                remaining: 0,
            })));
        }
        self.install_batch(chamber, grant, events);
        self.commit_loot(events)
    }
}
