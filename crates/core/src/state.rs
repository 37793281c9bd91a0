use crate::{Chamber, ItemType, MatchMode, RoomSettings};
use serde::{Deserialize, Serialize};

/// One seat at the table. In multiplayer the dealer seat holds the remote
/// opponent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Side {
    Player,
    Dealer,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Player, Side::Dealer];

    pub fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Dealer,
            Side::Dealer => Side::Player,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Dealer => "dealer",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GamePhase {
    Boot,
    Intro,
    Load,
    PlayerTurn,
    DealerTurn,
    Resolving,
    Looting,
    Stealing,
    GameOver,
}

impl GamePhase {
    pub fn turn_of(side: Side) -> Self {
        match side {
            Side::Player => GamePhase::PlayerTurn,
            Side::Dealer => GamePhase::DealerTurn,
        }
    }

    pub fn acting_side(self) -> Option<Side> {
        match self {
            GamePhase::PlayerTurn => Some(Side::Player),
            GamePhase::DealerTurn => Some(Side::Dealer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Combatant {
    pub hp: u32,
    pub max_hp: u32,
    pub items: Vec<ItemType>,
    pub is_handcuffed: bool,
    pub is_sawed_active: bool,
    pub is_choke_active: bool,
}

impl Combatant {
    pub fn new(hp: u32) -> Self {
        Self {
            hp,
            max_hp: hp,
            items: Vec::new(),
            is_handcuffed: false,
            is_sawed_active: false,
            is_choke_active: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn has_item(&self, item: ItemType) -> bool {
        self.items.contains(&item)
    }

    pub fn item_index(&self, item: ItemType) -> Option<usize> {
        self.items.iter().position(|held| *held == item)
    }

    pub fn has_stealable(&self) -> bool {
        self.items.iter().any(|item| item.is_stealable())
    }

    /// Removes `amount` HP, clamped at zero. Returns the HP actually lost.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    pub fn clear_transient(&mut self) {
        self.is_handcuffed = false;
        self.is_sawed_active = false;
        self.is_choke_active = false;
    }

    pub fn reset(&mut self, hp: u32) {
        *self = Self::new(hp);
    }
}

/// The chamber and both seats: everything the item and shot functions touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub chamber: Chamber,
    pub player: Combatant,
    pub dealer: Combatant,
}

impl Table {
    pub fn new(chamber: Chamber, player: Combatant, dealer: Combatant) -> Self {
        Self {
            chamber,
            player,
            dealer,
        }
    }

    pub fn seat(&self, side: Side) -> &Combatant {
        match side {
            Side::Player => &self.player,
            Side::Dealer => &self.dealer,
        }
    }

    pub fn seat_mut(&mut self, side: Side) -> &mut Combatant {
        match side {
            Side::Player => &mut self.player,
            Side::Dealer => &mut self.dealer,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HardModeState {
    pub round: u32,
    pub player_wins: u32,
    pub dealer_wins: u32,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MultiModeState {
    pub player_wins: u32,
    pub opponent_wins: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchContext {
    pub is_hard_mode: bool,
    pub is_multiplayer: bool,
    /// Batches loaded in the current stage, 1-based once a batch is live.
    pub round: u32,
    pub hard_mode_state: HardModeState,
    pub multi_mode_state: MultiModeState,
    pub room_settings: Option<RoomSettings>,
}

impl MatchContext {
    pub fn new(mode: MatchMode) -> Self {
        let (is_hard_mode, is_multiplayer, room_settings) = match mode {
            MatchMode::Normal => (false, false, None),
            MatchMode::Hard => (true, false, None),
            MatchMode::Multiplayer(room) => (false, true, Some(room)),
        };
        Self {
            is_hard_mode,
            is_multiplayer,
            round: 0,
            hard_mode_state: HardModeState {
                round: 1,
                ..HardModeState::default()
            },
            multi_mode_state: MultiModeState::default(),
            room_settings,
        }
    }

    pub fn wins_for(&self, side: Side) -> u32 {
        match (self.is_multiplayer, side) {
            (true, Side::Player) => self.multi_mode_state.player_wins,
            (true, Side::Dealer) => self.multi_mode_state.opponent_wins,
            (false, Side::Player) => self.hard_mode_state.player_wins,
            (false, Side::Dealer) => self.hard_mode_state.dealer_wins,
        }
    }
}

/// What a seat looks like from the outside: no chamber ordering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatView {
    pub hp: u32,
    pub max_hp: u32,
    pub items: Vec<ItemType>,
    pub is_handcuffed: bool,
    pub is_sawed_active: bool,
    pub is_choke_active: bool,
}

impl From<&Combatant> for SeatView {
    fn from(seat: &Combatant) -> Self {
        Self {
            hp: seat.hp,
            max_hp: seat.max_hp,
            items: seat.items.clone(),
            is_handcuffed: seat.is_handcuffed,
            is_sawed_active: seat.is_sawed_active,
            is_choke_active: seat.is_choke_active,
        }
    }
}

/// State handed to presentation at each settle point. Shell identities are
/// deliberately absent; only the public counts are included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub turn_owner: Side,
    pub shells_total: usize,
    pub shells_spent: usize,
    pub live_remaining: usize,
    pub blank_remaining: usize,
    pub player: SeatView,
    pub dealer: SeatView,
    pub context: MatchContext,
    pub aim: Option<Side>,
    pub winner: Option<Side>,
}
