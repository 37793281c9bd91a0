use crate::{
    BatchSummary, DealerAgent, DealerConfig, DealerError, SimulationReport, SimulationStatus,
    StepRecord,
};
use roulette_core::{
    EventBus, GamePhase, MatchConfig, MatchState, RngState, RulesConfig, RunError, Side,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// How the player seat is driven in a headless match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum PlayerPolicy {
    /// The dealer's own decision procedure, seated as the player.
    Mirror(DealerConfig),
    /// Always shoots the dealer.
    Aggressive,
    /// Uses a random item 40% of the time, otherwise shoots a random seat.
    Random { seed: u64 },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub seed: u64,
    pub hard_mode: bool,
    pub max_steps: u32,
    pub player: PlayerPolicy,
    pub dealer: DealerConfig,
    #[serde(default)]
    pub record_steps: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0xC0FFEE,
            hard_mode: false,
            max_steps: 2_000,
            player: PlayerPolicy::Mirror(DealerConfig::default()),
            dealer: DealerConfig::default(),
            record_steps: false,
        }
    }
}

#[derive(Debug, Clone)]
enum PlayerDriver {
    Agent(Box<DealerAgent>),
    Aggressive,
    Random(RngState),
}

#[derive(Debug)]
pub struct Simulator {
    pub state: MatchState,
    pub events: EventBus,
    dealer: DealerAgent,
    player: PlayerDriver,
    record_steps: bool,
    steps: Vec<StepRecord>,
    step_count: u32,
}

impl Simulator {
    pub fn new(rules: RulesConfig, config: &SimulationConfig) -> Result<Self, DealerError> {
        let match_config = if config.hard_mode {
            MatchConfig::hard(config.seed)
        } else {
            MatchConfig::normal(config.seed)
        };
        let mut state = MatchState::new(rules, match_config);
        let mut events = EventBus::default();
        state.request_start_match(match_config, &mut events)?;
        let dealer = DealerAgent::new(DealerConfig {
            seed: config.dealer.seed ^ config.seed,
            ..config.dealer
        });
        let player = match config.player {
            PlayerPolicy::Mirror(dealer_config) => {
                PlayerDriver::Agent(Box::new(DealerAgent::for_side(
                    Side::Player,
                    DealerConfig {
                        seed: dealer_config.seed ^ config.seed.rotate_left(17),
                        ..dealer_config
                    },
                )))
            }
            PlayerPolicy::Aggressive => PlayerDriver::Aggressive,
            PlayerPolicy::Random { seed } => PlayerDriver::Random(RngState::from_seed(seed ^ config.seed)),
        };
        let mut sim = Self {
            state,
            events: EventBus::default(),
            dealer,
            player,
            record_steps: config.record_steps,
            steps: Vec::new(),
            step_count: 0,
        };
        sim.broadcast(events, None);
        Ok(sim)
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase() == GamePhase::GameOver
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Advances by one driver action. Returns false once the match is over.
    pub fn step(&mut self) -> Result<bool, DealerError> {
        let phase_before = self.state.phase();
        let mut events = EventBus::default();
        let (actor, label) = match phase_before {
            GamePhase::GameOver => return Ok(false),
            GamePhase::Looting => {
                self.state.commit_loot(&mut events)?;
                self.broadcast(events, None);
                return Ok(true);
            }
            GamePhase::DealerTurn => {
                let report = self.dealer.take_turn(&mut self.state, &mut events)?;
                let label = report
                    .actions
                    .iter()
                    .map(|action| action.short_label())
                    .collect::<Vec<_>>()
                    .join(", ");
                (Side::Dealer, label)
            }
            GamePhase::Stealing if self.state.stealer() == Some(Side::Dealer) => {
                self.dealer.take_turn(&mut self.state, &mut events)?;
                (Side::Dealer, "steal".to_string())
            }
            GamePhase::PlayerTurn | GamePhase::Stealing => {
                (Side::Player, self.drive_player(&mut events)?)
            }
            other => return Err(RunError::InvalidPhase(other).into()),
        };
        let event_count = events.len();
        self.broadcast(events, Some(actor));
        self.step_count += 1;
        if self.record_steps {
            self.steps.push(StepRecord {
                step: self.step_count,
                actor,
                action: label,
                phase_before,
                phase_after: self.state.phase(),
                player_hp: self.state.seat(Side::Player).hp,
                dealer_hp: self.state.seat(Side::Dealer).hp,
                event_count,
            });
        }
        Ok(!self.is_finished())
    }

    pub fn run(mut self, max_steps: u32) -> Result<SimulationReport, DealerError> {
        while self.step_count < max_steps && self.step()? {}
        let status = if self.is_finished() {
            SimulationStatus::Finished
        } else {
            SimulationStatus::MaxSteps
        };
        let config = self.state.config();
        let stats = self.state.stats().clone();
        info!(
            seed = config.seed,
            ?status,
            winner = ?self.state.winner(),
            score = stats.total_score,
            "simulation finished"
        );
        Ok(SimulationReport {
            seed: config.seed,
            hard_mode: self.state.context().is_hard_mode,
            status,
            winner: self.state.winner(),
            score: stats.total_score,
            stats,
            steps: self.steps,
        })
    }

    /// Hands events to every agent that did not produce them.
    fn broadcast(&mut self, mut events: EventBus, actor: Option<Side>) {
        for event in events.drain() {
            if actor != Some(Side::Dealer) {
                self.dealer.observe(&event);
            }
            if actor != Some(Side::Player) {
                if let PlayerDriver::Agent(agent) = &mut self.player {
                    agent.observe(&event);
                }
            }
            self.events.push(event);
        }
    }

    fn drive_player(&mut self, events: &mut EventBus) -> Result<String, DealerError> {
        match &mut self.player {
            PlayerDriver::Agent(agent) => {
                let report = agent.take_turn(&mut self.state, events)?;
                Ok(report
                    .actions
                    .iter()
                    .map(|action| action.short_label())
                    .collect::<Vec<_>>()
                    .join(", "))
            }
            PlayerDriver::Aggressive => {
                if let Some(index) = first_stealable(&self.state) {
                    self.state.steal_item(Side::Player, index, events)?;
                    return Ok("steal".to_string());
                }
                self.state.fire(Side::Player, Side::Dealer, events)?;
                Ok("fire dealer".to_string())
            }
            PlayerDriver::Random(rng) => {
                if self.state.phase() == GamePhase::Stealing {
                    let index = first_stealable(&self.state).unwrap_or(0);
                    self.state.steal_item(Side::Player, index, events)?;
                    return Ok("steal".to_string());
                }
                let held = self.state.seat(Side::Player).items.len();
                if held > 0 && rng.percent(40) {
                    let index = rng.below(held as u64) as usize;
                    let outcome = self.state.use_item(Side::Player, index, events)?;
                    return Ok(format!("use {}", outcome.item.id()));
                }
                let target = if rng.coin_flip() {
                    Side::Dealer
                } else {
                    Side::Player
                };
                self.state.fire(Side::Player, target, events)?;
                Ok(format!("fire {}", target.label()))
            }
        }
    }
}

fn first_stealable(state: &MatchState) -> Option<usize> {
    if state.phase() != GamePhase::Stealing {
        return None;
    }
    state
        .seat(Side::Dealer)
        .items
        .iter()
        .position(|item| item.is_stealable())
}

/// Plays one headless match to completion or the step limit.
pub fn simulate(rules: RulesConfig, config: &SimulationConfig) -> Result<SimulationReport, DealerError> {
    Simulator::new(rules, config)?.run(config.max_steps)
}

/// Plays `count` matches on consecutive seeds starting at `config.seed`.
pub fn simulate_batch(
    rules: &RulesConfig,
    config: &SimulationConfig,
    count: u32,
) -> Result<BatchSummary, DealerError> {
    let mut summary = BatchSummary::default();
    for offset in 0..count {
        let config = SimulationConfig {
            seed: config.seed.wrapping_add(u64::from(offset)),
            ..*config
        };
        summary.record(simulate(rules.clone(), &config)?);
    }
    Ok(summary)
}
