use super::*;
use crate::{
    apply_item, resolve_shot, Event, EventBus, ItemEffect, ItemOutcome, RecordedDraws, ShotOutcome,
};
use tracing::debug;

/// Result of a local request: applied here, or queued for the remote
/// authority in multiplayer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted<T> {
    Applied(T),
    Forwarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FireRequest {
    /// The request only moved the aim; nothing was fired.
    Aimed(Side),
    Applied(ShotOutcome),
    Forwarded,
}

impl MatchState {
    pub fn request_pickup_gun(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.ensure_turn(Side::Player)?;
        if self.aim.is_some() {
            return Ok(());
        }
        self.aim = Some(Side::Dealer);
        events.push(Event::GunRaised {
            side: Side::Player,
            aim: Side::Dealer,
        });
        if self.context.is_multiplayer {
            self.outbound.push(Intent::PickupGun);
        }
        Ok(())
    }

    pub fn request_lower_gun(&mut self, events: &mut EventBus) -> Result<(), RunError> {
        self.ensure_turn(Side::Player)?;
        if self.aim.take().is_some() {
            events.push(Event::GunLowered { side: Side::Player });
        }
        Ok(())
    }

    /// Two-step fire: a request that does not match the current aim only
    /// re-aims. A matching request pulls the trigger.
    pub fn request_fire(
        &mut self,
        target: Side,
        events: &mut EventBus,
    ) -> Result<FireRequest, RunError> {
        self.ensure_turn(Side::Player)?;
        match self.aim {
            Some(aim) if aim == target => {}
            Some(_) => {
                self.aim = Some(target);
                events.push(Event::AimChanged {
                    side: Side::Player,
                    target,
                });
                return Ok(FireRequest::Aimed(target));
            }
            None => {
                self.aim = Some(target);
                events.push(Event::GunRaised {
                    side: Side::Player,
                    aim: target,
                });
                return Ok(FireRequest::Aimed(target));
            }
        }
        self.aim = None;
        if self.context.is_multiplayer {
            self.outbound.push(Intent::Fire { target });
            return Ok(FireRequest::Forwarded);
        }
        self.fire_locked(Side::Player, target, events)
            .map(FireRequest::Applied)
    }

    pub fn request_use_item(
        &mut self,
        index: usize,
        events: &mut EventBus,
    ) -> Result<Submitted<ItemOutcome>, RunError> {
        self.ensure_turn(Side::Player)?;
        if self.aim.is_some() {
            return Err(self.reject(RunError::GunRaised));
        }
        self.ensure_item_index(Side::Player, index)?;
        if self.context.is_multiplayer {
            self.outbound.push(Intent::UseItem { index });
            return Ok(Submitted::Forwarded);
        }
        self.use_item_locked(Side::Player, index, None, events)
            .map(Submitted::Applied)
    }

    pub fn request_steal_item(
        &mut self,
        index: usize,
        events: &mut EventBus,
    ) -> Result<Submitted<ItemOutcome>, RunError> {
        self.ensure_stealer(Side::Player, index)?;
        if self.context.is_multiplayer {
            self.outbound.push(Intent::StealItem { index });
            return Ok(Submitted::Forwarded);
        }
        self.steal_locked(Side::Player, index, None, events)
            .map(Submitted::Applied)
    }

    /// Fires for any seat without the aim protocol. Used by the dealer and
    /// by headless drivers; unavailable in multiplayer.
    pub fn fire(
        &mut self,
        side: Side,
        target: Side,
        events: &mut EventBus,
    ) -> Result<ShotOutcome, RunError> {
        self.ensure_local()?;
        self.ensure_turn(side)?;
        self.aim = None;
        self.fire_locked(side, target, events)
    }

    pub fn use_item(
        &mut self,
        side: Side,
        index: usize,
        events: &mut EventBus,
    ) -> Result<ItemOutcome, RunError> {
        self.ensure_local()?;
        self.ensure_turn(side)?;
        self.ensure_item_index(side, index)?;
        self.aim = None;
        self.use_item_locked(side, index, None, events)
    }

    pub fn steal_item(
        &mut self,
        side: Side,
        index: usize,
        events: &mut EventBus,
    ) -> Result<ItemOutcome, RunError> {
        self.ensure_local()?;
        self.ensure_stealer(side, index)?;
        self.steal_locked(side, index, None, events)
    }

    pub(super) fn reject(&self, err: RunError) -> RunError {
        debug!(phase = ?self.phase, turn = ?self.turn_owner, "rejected action: {err}");
        err
    }

    pub(super) fn ensure_idle(&self) -> Result<(), RunError> {
        if self.processing {
            return Err(self.reject(RunError::Busy));
        }
        Ok(())
    }

    pub(super) fn ensure_turn(&self, side: Side) -> Result<(), RunError> {
        self.ensure_idle()?;
        if self.phase.acting_side().is_none() {
            return Err(self.reject(RunError::InvalidPhase(self.phase)));
        }
        if self.turn_owner != side || self.phase != GamePhase::turn_of(side) {
            return Err(self.reject(RunError::NotYourTurn(side)));
        }
        Ok(())
    }

    pub(super) fn ensure_item_index(&self, side: Side, index: usize) -> Result<(), RunError> {
        if index >= self.table.seat(side).items.len() {
            return Err(self.reject(RunError::InvalidItemIndex(index)));
        }
        Ok(())
    }

    pub(super) fn ensure_stealer(&self, side: Side, index: usize) -> Result<(), RunError> {
        self.ensure_idle()?;
        if self.phase != GamePhase::Stealing {
            return Err(self.reject(RunError::InvalidPhase(self.phase)));
        }
        if self.stealer != Some(side) {
            return Err(self.reject(RunError::NotYourTurn(side)));
        }
        match self.table.seat(side.opponent()).items.get(index) {
            None => Err(self.reject(RunError::InvalidItemIndex(index))),
            Some(item) if !item.is_stealable() => Err(self.reject(RunError::NotStealable(*item))),
            Some(_) => Ok(()),
        }
    }

    fn ensure_local(&self) -> Result<(), RunError> {
        if self.context.is_multiplayer {
            return Err(self.reject(RunError::RemoteAuthoritative));
        }
        Ok(())
    }

    pub(super) fn fire_locked(
        &mut self,
        shooter: Side,
        target: Side,
        events: &mut EventBus,
    ) -> Result<ShotOutcome, RunError> {
        self.processing = true;
        let result = self.resolve_fire(shooter, target, events);
        self.processing = false;
        result
    }

    pub(super) fn use_item_locked(
        &mut self,
        side: Side,
        index: usize,
        draws: Option<&mut RecordedDraws>,
        events: &mut EventBus,
    ) -> Result<ItemOutcome, RunError> {
        self.processing = true;
        let item = self.table.seat_mut(side).items.remove(index);
        let outcome = self.resolve_item(side, item, Some(index), draws, events);
        self.processing = false;
        Ok(outcome)
    }

    pub(super) fn steal_locked(
        &mut self,
        side: Side,
        index: usize,
        draws: Option<&mut RecordedDraws>,
        events: &mut EventBus,
    ) -> Result<ItemOutcome, RunError> {
        self.processing = true;
        let item = self.table.seat_mut(side.opponent()).items.remove(index);
        self.stealer = None;
        events.push(Event::ItemStolen { side, item });
        let outcome = self.resolve_item(side, item, None, draws, events);
        self.processing = false;
        Ok(outcome)
    }

    fn resolve_fire(
        &mut self,
        shooter: Side,
        target: Side,
        events: &mut EventBus,
    ) -> Result<ShotOutcome, RunError> {
        self.phase = GamePhase::Resolving;
        match resolve_shot(&mut self.table, shooter, target) {
            Ok(outcome) => Ok(self.route_shot(outcome, events)),
            Err(err) => {
                self.phase = GamePhase::turn_of(shooter);
                Err(self.reject(err.into()))
            }
        }
    }

    /// Announces a resolved shot and moves the match on: elimination, or the
    /// next turn, or a reload when the chamber ran dry.
    pub(super) fn route_shot(&mut self, outcome: ShotOutcome, events: &mut EventBus) -> ShotOutcome {
        let (shooter, target) = (outcome.shooter, outcome.target);
        self.record_shot(&outcome);
        events.push(Event::ShotFired {
            shooter,
            target,
            shells: outcome.shells.clone(),
            damage: outcome.damage,
        });
        if outcome.hp_lost > 0 {
            events.push(Event::DamageDealt {
                target,
                amount: outcome.hp_lost,
                hp: outcome.target_hp,
            });
        }
        if outcome.eliminated {
            self.handle_elimination(target, events);
            return outcome;
        }
        if let Some(side) = outcome.handcuff_skipped {
            events.push(Event::HandcuffSkipped { side });
        }
        if outcome.next_turn != self.turn_owner {
            events.push(Event::TurnPassed {
                to: outcome.next_turn,
            });
        }
        if outcome.chamber_exhausted {
            self.end_batch(outcome.next_turn, events);
        } else {
            self.enter_turn(outcome.next_turn, events);
        }
        outcome
    }

    fn resolve_item(
        &mut self,
        side: Side,
        item: ItemType,
        refund_index: Option<usize>,
        draws: Option<&mut RecordedDraws>,
        events: &mut EventBus,
    ) -> ItemOutcome {
        self.phase = GamePhase::Resolving;
        let hp_before = self.table.seat(side).hp;
        let effect = match draws {
            Some(recorded) => apply_item(&mut self.table, side, item, &self.rules, recorded),
            None => apply_item(&mut self.table, side, item, &self.rules, &mut self.rng),
        };
        if let ItemEffect::Failed { refunded: true, .. } = effect {
            let items = &mut self.table.seat_mut(side).items;
            let at = refund_index.unwrap_or(items.len()).min(items.len());
            items.insert(at, item);
        } else if side == Side::Player {
            self.stats.record_item(item);
        }
        let hp_after = self.table.seat(side).hp;
        if side == Side::Player {
            self.stats.damage_taken += hp_before.saturating_sub(hp_after);
        }
        self.emit_item_events(side, item, &effect, hp_before.saturating_sub(hp_after), events);

        let eliminated = (hp_after == 0).then_some(side);
        let chamber_exhausted = self.table.chamber.is_exhausted();
        let steal = effect == ItemEffect::StealReady;
        let outcome = ItemOutcome {
            user: side,
            item,
            effect,
            chamber_exhausted,
            eliminated,
        };
        if let Some(loser) = eliminated {
            self.handle_elimination(loser, events);
        } else if steal {
            self.phase = GamePhase::Stealing;
            self.stealer = Some(side);
            events.push(Event::StealStarted { side });
        } else if chamber_exhausted {
            self.end_batch(side, events);
        } else {
            self.phase = GamePhase::turn_of(side);
        }
        outcome
    }

    fn emit_item_events(
        &self,
        side: Side,
        item: ItemType,
        effect: &ItemEffect,
        hp_lost: u32,
        events: &mut EventBus,
    ) {
        events.push(Event::ItemUsed { side, item });
        let cursor = self.table.chamber.cursor();
        match effect {
            ItemEffect::Revealed { index, shell } | ItemEffect::Intel {
                index,
                reported: shell,
            } => {
                if side == Side::Player {
                    events.push(Event::ShellRevealed {
                        viewer: side,
                        offset: index - cursor + 1,
                        shell: *shell,
                    });
                } else {
                    events.push(Event::ShellInspected { side });
                }
            }
            ItemEffect::Ejected { shell } => {
                events.push(Event::ShellEjected {
                    side,
                    shell: *shell,
                })
            }
            ItemEffect::Healed { hp } => events.push(Event::Healed { side, hp: *hp }),
            ItemEffect::Cuffed => events.push(Event::Handcuffed {
                side: side.opponent(),
            }),
            ItemEffect::SawPrimed => events.push(Event::SawPrimed { side }),
            ItemEffect::ChokePrimed => events.push(Event::ChokePrimed { side }),
            ItemEffect::Inverted { .. } => events.push(Event::ShellInverted { side, all: false }),
            ItemEffect::InvertedAll => events.push(Event::ShellInverted { side, all: true }),
            ItemEffect::Swapped { .. } => events.push(Event::ShellsSwapped { side }),
            ItemEffect::StealReady => {}
            ItemEffect::Contract { hp, granted } => {
                events.push(Event::ContractSigned {
                    side,
                    hp: *hp,
                    granted: granted.len(),
                });
                if hp_lost > 0 {
                    events.push(Event::DamageDealt {
                        target: side,
                        amount: hp_lost,
                        hp: *hp,
                    });
                }
            }
            ItemEffect::Failed { reason, refunded } => events.push(Event::ItemFailed {
                side,
                item,
                reason: *reason,
                refunded: *refunded,
            }),
        }
    }

    fn record_shot(&mut self, outcome: &ShotOutcome) {
        if outcome.target == Side::Player {
            self.stats.damage_taken += outcome.hp_lost;
        }
        if outcome.shooter != Side::Player {
            return;
        }
        self.stats.shots_fired += 1;
        if outcome.target == Side::Player {
            self.stats.self_shots += 1;
        } else if outcome.hp_lost > 0 {
            self.stats.shots_hit += 1;
            self.stats.damage_dealt += outcome.hp_lost;
        }
    }
}
