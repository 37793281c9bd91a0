use crate::{ChamberError, Shell, Side, Table};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShotOutcome {
    pub shooter: Side,
    pub target: Side,
    pub shells: Vec<Shell>,
    /// Damage the shot carried, before clamping to the target's HP.
    pub damage: u32,
    pub hp_lost: u32,
    pub target_hp: u32,
    pub eliminated: bool,
    /// Seat that acts next if the match continues.
    pub next_turn: Side,
    pub handcuff_skipped: Option<Side>,
    pub chamber_exhausted: bool,
}

/// Damage for the shells a single trigger pull consumed: one per live shell,
/// doubled by an active saw.
pub fn shot_damage(shells: &[Shell], sawed: bool) -> u32 {
    let live = shells.iter().filter(|shell| shell.is_live()).count() as u32;
    if sawed {
        live * 2
    } else {
        live
    }
}

/// Fires the shared weapon. Consumes one shell, or two under an active choke
/// when a second shell exists, then works out damage and who acts next.
pub fn resolve_shot(
    table: &mut Table,
    shooter: Side,
    target: Side,
) -> Result<ShotOutcome, ChamberError> {
    let (shells, damage) = discharge(table, shooter)?;
    let hp_lost = table.seat_mut(target).take_damage(damage);
    Ok(conclude_shot(table, shooter, target, shells, damage, hp_lost))
}

/// Pulls the trigger without touching anyone's HP: consumes the shells and
/// spends the shooter's saw and choke.
pub fn discharge(table: &mut Table, shooter: Side) -> Result<(Vec<Shell>, u32), ChamberError> {
    if table.chamber.is_exhausted() {
        return Err(ChamberError::Exhausted {
            requested: 1,
            remaining: 0,
        });
    }
    let (sawed, choked) = {
        let seat = table.seat(shooter);
        (seat.is_sawed_active, seat.is_choke_active)
    };
    let count = if choked && table.chamber.remaining() >= 2 {
        2
    } else {
        1
    };
    let shells = table.chamber.consume(count)?;
    let damage = shot_damage(&shells, sawed);
    let seat = table.seat_mut(shooter);
    seat.is_sawed_active = false;
    seat.is_choke_active = false;
    Ok((shells, damage))
}

/// Elimination and turn transfer once the target's HP is final. A pending
/// handcuff on the next seat is spent here.
pub fn conclude_shot(
    table: &mut Table,
    shooter: Side,
    target: Side,
    shells: Vec<Shell>,
    damage: u32,
    hp_lost: u32,
) -> ShotOutcome {
    let target_hp = table.seat(target).hp;
    let chamber_exhausted = table.chamber.is_exhausted();
    if target_hp == 0 {
        return ShotOutcome {
            shooter,
            target,
            shells,
            damage,
            hp_lost,
            target_hp,
            eliminated: true,
            next_turn: shooter,
            handcuff_skipped: None,
            chamber_exhausted,
        };
    }

    let mut next_turn = if target == shooter && damage == 0 {
        shooter
    } else {
        shooter.opponent()
    };
    let mut handcuff_skipped = None;
    if next_turn != shooter && table.seat(next_turn).is_handcuffed {
        table.seat_mut(next_turn).is_handcuffed = false;
        handcuff_skipped = Some(next_turn);
        next_turn = shooter;
    }

    ShotOutcome {
        shooter,
        target,
        shells,
        damage,
        hp_lost,
        target_hp,
        eliminated: false,
        next_turn,
        handcuff_skipped,
        chamber_exhausted,
    }
}
