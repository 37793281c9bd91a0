use roulette_core::{
    Event, GamePhase, GameSnapshot, ItemType, MatchMode, SeatView, Side, StatsRecord,
};

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Player => "you",
        Side::Dealer => "dealer",
    }
}

fn item_list(items: &[ItemType]) -> String {
    if items.is_empty() {
        return "-".to_string();
    }
    items
        .iter()
        .map(|item| item.id())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn phase_label(phase: GamePhase) -> &'static str {
    match phase {
        GamePhase::Boot => "menu",
        GamePhase::Intro => "intro",
        GamePhase::Load => "loading",
        GamePhase::PlayerTurn => "your turn",
        GamePhase::DealerTurn => "dealer turn",
        GamePhase::Resolving => "resolving",
        GamePhase::Looting => "looting",
        GamePhase::Stealing => "stealing",
        GamePhase::GameOver => "game over",
    }
}

pub fn format_event(event: &Event) -> String {
    match event {
        Event::MatchStarted { mode } => match mode {
            MatchMode::Normal => "match started".to_string(),
            MatchMode::Hard => "hard match started: best of three".to_string(),
            MatchMode::Multiplayer(room) => {
                format!("multiplayer match started: {} rounds", room.rounds)
            }
        },
        Event::BatchLoaded { round, live, blank } => {
            format!("batch {round} loaded: {live} live, {blank} blank")
        }
        Event::ItemsRevealed { player, dealer } => format!(
            "shipment: you [{}] dealer [{}]",
            item_list(player),
            item_list(dealer)
        ),
        Event::ItemsCommitted => "items stowed".to_string(),
        Event::TurnStarted { side } => format!("{} to act", side_name(*side)),
        Event::GunRaised { side, aim } => {
            format!("{} raised the gun at {}", side_name(*side), side_name(*aim))
        }
        Event::AimChanged { side, target } => {
            format!("{} now aims at {}", side_name(*side), side_name(*target))
        }
        Event::GunLowered { side } => format!("{} lowered the gun", side_name(*side)),
        Event::ShotFired {
            shooter,
            target,
            shells,
            damage,
        } => {
            let fired = shells
                .iter()
                .map(|shell| shell.label())
                .collect::<Vec<_>>()
                .join("+");
            format!(
                "{} shot {}: {fired}, {damage} damage",
                side_name(*shooter),
                side_name(*target)
            )
        }
        Event::DamageDealt { target, amount, hp } => {
            format!("{} took {amount}, {hp} hp left", side_name(*target))
        }
        Event::ItemUsed { side, item } => format!("{} used {}", side_name(*side), item.id()),
        Event::ItemFailed {
            side,
            item,
            reason,
            refunded,
        } => format!(
            "{} {} failed: {}{}",
            side_name(*side),
            item.id(),
            reason.message(),
            if *refunded { " (returned)" } else { "" }
        ),
        Event::ShellRevealed { offset, shell, .. } => {
            if *offset == 1 {
                format!("the current shell is {}", shell.label())
            } else {
                format!("shell {offset} from now is {}", shell.label())
            }
        }
        Event::ShellInspected { side } => format!("{} checked a shell", side_name(*side)),
        Event::ShellEjected { side, shell } => {
            format!("{} racked out a {} shell", side_name(*side), shell.label())
        }
        Event::ShellInverted { side, all } => {
            if *all {
                format!("{} inverted every shell", side_name(*side))
            } else {
                format!("{} inverted the current shell", side_name(*side))
            }
        }
        Event::ShellsSwapped { side } => format!("{} swapped two shells", side_name(*side)),
        Event::Healed { side, hp } => format!("{} healed to {hp}", side_name(*side)),
        Event::Handcuffed { side } => format!("{} is cuffed", side_name(*side)),
        Event::HandcuffSkipped { side } => {
            format!("{} lost a turn to the cuffs", side_name(*side))
        }
        Event::SawPrimed { side } => format!("{} sawed off the barrel", side_name(*side)),
        Event::ChokePrimed { side } => format!("{} fitted the choke", side_name(*side)),
        Event::ContractSigned { side, hp, granted } => format!(
            "{} signed the contract: {hp} hp, {granted} items",
            side_name(*side)
        ),
        Event::StealStarted { side } => format!("{} may steal an item", side_name(*side)),
        Event::ItemStolen { side, item } => {
            format!("{} stole {}", side_name(*side), item.id())
        }
        Event::TurnPassed { to } => format!("turn passes to {}", side_name(*to)),
        Event::Eliminated { side } => format!("{} is down", side_name(*side)),
        Event::StageEnded {
            winner,
            player_wins,
            dealer_wins,
        } => format!(
            "stage to {} ({player_wins}-{dealer_wins})",
            side_name(*winner)
        ),
        Event::MatchEnded { winner, score } => {
            format!("match over: {} won, score {score}", side_name(*winner))
        }
    }
}

fn print_seat(label: &str, seat: &SeatView) {
    let mut flags = Vec::new();
    if seat.is_handcuffed {
        flags.push("cuffed");
    }
    if seat.is_sawed_active {
        flags.push("sawed");
    }
    if seat.is_choke_active {
        flags.push("choke");
    }
    println!(
        "{label:<7} hp {}/{} {}",
        seat.hp,
        seat.max_hp,
        if flags.is_empty() {
            String::new()
        } else {
            format!("[{}]", flags.join(" "))
        }
    );
}

pub fn print_state(snapshot: &GameSnapshot) {
    println!("== State ==");
    let context = &snapshot.context;
    let mode = if context.is_hard_mode {
        format!(
            "hard stage {} ({}-{})",
            context.hard_mode_state.round,
            context.hard_mode_state.player_wins,
            context.hard_mode_state.dealer_wins
        )
    } else {
        "normal".to_string()
    };
    println!(
        "{mode} | batch {} | {}",
        context.round,
        phase_label(snapshot.phase)
    );
    println!(
        "shells {} left of {}: {} live, {} blank",
        snapshot.shells_total - snapshot.shells_spent,
        snapshot.shells_total,
        snapshot.live_remaining,
        snapshot.blank_remaining
    );
    print_seat("you", &snapshot.player);
    print_seat("dealer", &snapshot.dealer);
    if let Some(aim) = snapshot.aim {
        println!("gun raised at {}", side_name(aim));
    }
}

pub fn print_items(snapshot: &GameSnapshot) {
    println!("== Items ==");
    for (label, seat) in [("you", &snapshot.player), ("dealer", &snapshot.dealer)] {
        if seat.items.is_empty() {
            println!("{label}: -");
            continue;
        }
        let listed = seat
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| format!("{index}:{}", item.id()))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{label}: {listed}");
    }
}

pub fn print_record(record: &StatsRecord) {
    println!("== Record ==");
    println!(
        "matches {} | wins {} | losses {} | win rate {:.1}%",
        record.matches_played,
        record.wins,
        record.losses,
        record.win_rate() * 100.0
    );
    println!(
        "best {} | total {} | shots {} ({} hit) | items {}",
        record.best_score, record.total_score, record.shots_fired, record.shots_hit, record.items_used
    );
}

pub fn print_help() {
    println!("== Commands ==");
    println!("new [normal|hard] [seed]  start a new match");
    println!("state | s                 table overview");
    println!("items | i                 both inventories");
    println!("pickup | p                raise the gun (aims at the dealer)");
    println!("fire self|dealer | f      aim, then fire again to shoot");
    println!("lower | l                 put the gun down");
    println!("use <n> | u               use your item n");
    println!("steal <n>                 take dealer item n after ADRENALINE");
    println!("stats                     lifetime record");
    println!("sim <n> [hard]            play n headless matches");
    println!("help | h | ?              this list");
    println!("quit | exit               leave");
}

#[cfg(test)]
mod tests {
    use super::*;
    use roulette_core::{ItemFailure, Shell};

    #[test]
    fn shot_lists_every_shell() {
        let text = format_event(&Event::ShotFired {
            shooter: Side::Dealer,
            target: Side::Player,
            shells: vec![Shell::Live, Shell::Blank],
            damage: 1,
        });
        assert_eq!(text, "dealer shot you: live+blank, 1 damage");
    }

    #[test]
    fn refunded_failure_is_marked() {
        let text = format_event(&Event::ItemFailed {
            side: Side::Player,
            item: ItemType::Cuffs,
            reason: ItemFailure::AlreadyCuffed,
            refunded: true,
        });
        assert!(text.ends_with("(returned)"), "{text}");
    }
}
