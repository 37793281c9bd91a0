use anyhow::Context;
use roulette_core::{
    EventBus, FireRequest, GamePhase, MatchConfig, MatchState, RulesConfig, RunError, Side,
    Submitted,
};
use roulette_data::{default_stats_path, load_rules, load_stats, save_stats};
use roulette_dealer::{simulate_batch, write_json, DealerAgent, DealerConfig, SimulationConfig};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod format;

use format::{format_event, phase_label, print_help, print_items, print_record, print_state};

const DEFAULT_MATCH_SEED: u64 = 0xC0FFEE;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    seed: Option<u64>,
    hard: bool,
    sim: Option<u32>,
    json: Option<PathBuf>,
    rules_dir: PathBuf,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        seed: None,
        hard: false,
        sim: None,
        json: None,
        rules_dir: PathBuf::from("assets"),
    };
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--hard" => options.hard = true,
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    options.seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            "--sim" => {
                if let Some(value) = args.get(idx + 1) {
                    options.sim = value.parse::<u32>().ok();
                    idx += 1;
                }
            }
            "--json" => {
                if let Some(value) = args.get(idx + 1) {
                    options.json = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--rules" => {
                if let Some(value) = args.get(idx + 1) {
                    options.rules_dir = PathBuf::from(value);
                    idx += 1;
                }
            }
            _ => {}
        }
        idx += 1;
    }
    options
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    let result = match options.sim {
        Some(count) => run_sim(&options, count, options.hard),
        None => run_play(&options),
    };
    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn match_config(hard: bool, seed: u64) -> MatchConfig {
    if hard {
        MatchConfig::hard(seed)
    } else {
        MatchConfig::normal(seed)
    }
}

fn run_sim(options: &CliOptions, count: u32, hard: bool) -> anyhow::Result<()> {
    let rules = load_rules(&options.rules_dir)?;
    let config = SimulationConfig {
        seed: options.seed.unwrap_or(DEFAULT_MATCH_SEED),
        hard_mode: hard,
        ..SimulationConfig::default()
    };
    let summary = simulate_batch(&rules, &config, count).context("simulate")?;
    println!("{}", summary.to_text_report());
    if let Some(path) = &options.json {
        write_json(path, &summary).with_context(|| format!("write {}", path.display()))?;
        println!("summary written to {}", path.display());
    }
    Ok(())
}

/// One interactive match against the dealer. Events the human causes are
/// shown and fed to the dealer; the dealer's own events are only shown.
struct Session {
    state: MatchState,
    dealer: DealerAgent,
    events: EventBus,
    stats_path: Option<PathBuf>,
    recorded: bool,
}

impl Session {
    fn new(rules: RulesConfig, stats_path: Option<PathBuf>) -> Self {
        let config = MatchConfig::normal(DEFAULT_MATCH_SEED);
        Self {
            state: MatchState::new(rules, config),
            dealer: DealerAgent::new(DealerConfig::default()),
            events: EventBus::default(),
            stats_path,
            recorded: false,
        }
    }

    fn start(&mut self, config: MatchConfig) -> anyhow::Result<()> {
        self.state = MatchState::new(self.state.rules.clone(), config);
        self.dealer = DealerAgent::new(DealerConfig::with_seed(
            DealerConfig::default().seed ^ config.seed,
        ));
        self.recorded = false;
        self.state.request_start_match(config, &mut self.events)?;
        info!(seed = config.seed, "interactive match started");
        self.settle()
    }

    /// Shows the events caused by the human and lets them reach the dealer.
    fn flush_public(&mut self) {
        for event in self.events.drain() {
            println!("  {}", format_event(&event));
            self.dealer.observe(&event);
        }
    }

    /// Runs everything that does not need the human: loot commits and the
    /// dealer's turns. Stops at the human's turn or the end of the match.
    fn settle(&mut self) -> anyhow::Result<()> {
        loop {
            self.flush_public();
            match self.state.phase() {
                GamePhase::Looting => {
                    self.state.commit_loot(&mut self.events)?;
                }
                GamePhase::DealerTurn | GamePhase::Stealing
                    if self.dealer.wants_to_act(&self.state) =>
                {
                    let mut dealer_events = EventBus::default();
                    let report = self.dealer.take_turn(&mut self.state, &mut dealer_events)?;
                    debug!(actions = report.actions.len(), "dealer turn done");
                    for event in dealer_events.drain() {
                        println!("  {}", format_event(&event));
                    }
                }
                GamePhase::GameOver => {
                    self.record_finished()?;
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }
    }

    fn record_finished(&mut self) -> anyhow::Result<()> {
        if self.recorded {
            return Ok(());
        }
        self.recorded = true;
        let Some(path) = &self.stats_path else {
            return Ok(());
        };
        let mut record = load_stats(path)?;
        record.record(self.state.stats());
        save_stats(path, &record)?;
        println!("record updated: {} matches, {} wins", record.matches_played, record.wins);
        Ok(())
    }

    fn print_record(&self) -> anyhow::Result<()> {
        match &self.stats_path {
            Some(path) => print_record(&load_stats(path)?),
            None => println!("no stats file configured"),
        }
        Ok(())
    }

    fn pickup(&mut self) -> Result<(), RunError> {
        self.state.request_pickup_gun(&mut self.events)
    }

    fn lower(&mut self) -> Result<(), RunError> {
        self.state.request_lower_gun(&mut self.events)
    }

    fn fire(&mut self, target: Side) -> Result<(), RunError> {
        if let FireRequest::Aimed(side) = self.state.request_fire(target, &mut self.events)? {
            let name = if side == Side::Player { "self" } else { "dealer" };
            println!("aiming at {}; `fire {name}` again to pull the trigger", side.label());
        }
        Ok(())
    }

    fn use_item(&mut self, index: usize) -> Result<(), RunError> {
        if let Submitted::Applied(outcome) = self.state.request_use_item(index, &mut self.events)? {
            debug!(item = outcome.item.id(), effect = ?outcome.effect, "item resolved");
        }
        Ok(())
    }

    fn steal(&mut self, index: usize) -> Result<(), RunError> {
        self.state.request_steal_item(index, &mut self.events)?;
        Ok(())
    }
}

fn parse_target(arg: Option<&&str>) -> Option<Side> {
    match arg.copied() {
        Some("self" | "me" | "player") => Some(Side::Player),
        Some("dealer" | "d" | "them") => Some(Side::Dealer),
        _ => None,
    }
}

fn parse_index(arg: Option<&&str>) -> Option<usize> {
    arg.and_then(|value| value.parse::<usize>().ok())
}

fn prompt_text(state: &MatchState) -> String {
    format!("[{}] > ", phase_label(state.phase()))
}

fn run_play(options: &CliOptions) -> anyhow::Result<()> {
    let rules = load_rules(&options.rules_dir)?;
    let mut session = Session::new(rules, default_stats_path());
    print_help();
    session.start(match_config(
        options.hard,
        options.seed.unwrap_or(DEFAULT_MATCH_SEED),
    ))?;
    print_state(&session.state.snapshot());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}", prompt_text(&session.state));
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let args: Vec<&str> = parts.collect();
        let action = match cmd {
            "help" | "h" | "?" => {
                print_help();
                continue;
            }
            "quit" | "exit" => break,
            "state" | "s" => {
                print_state(&session.state.snapshot());
                continue;
            }
            "items" | "i" => {
                print_items(&session.state.snapshot());
                continue;
            }
            "stats" => {
                if let Err(err) = session.print_record() {
                    eprintln!("error: {err:#}");
                }
                continue;
            }
            "sim" => {
                let Some(count) = args.first().and_then(|value| value.parse::<u32>().ok()) else {
                    println!("usage: sim <n> [hard]");
                    continue;
                };
                let hard = args.get(1) == Some(&"hard");
                if let Err(err) = run_sim(options, count, hard) {
                    eprintln!("error: {err:#}");
                }
                continue;
            }
            "new" => {
                let hard = args.first() == Some(&"hard");
                let seed = args
                    .iter()
                    .find_map(|value| value.parse::<u64>().ok())
                    .unwrap_or_else(|| session.state.config().seed.wrapping_add(1));
                if let Err(err) = session.start(match_config(hard, seed)) {
                    eprintln!("error: {err:#}");
                }
                print_state(&session.state.snapshot());
                continue;
            }
            "pickup" | "p" => session.pickup(),
            "lower" | "l" => session.lower(),
            "fire" | "f" => match parse_target(args.first()) {
                Some(target) => session.fire(target),
                None => {
                    println!("usage: fire self|dealer");
                    continue;
                }
            },
            "use" | "u" => match parse_index(args.first()) {
                Some(index) => session.use_item(index),
                None => {
                    println!("usage: use <n>");
                    continue;
                }
            },
            "steal" => match parse_index(args.first()) {
                Some(index) => session.steal(index),
                None => {
                    println!("usage: steal <n>");
                    continue;
                }
            },
            _ => {
                println!("unknown command '{cmd}', try help");
                continue;
            }
        };
        if let Err(err) = action {
            println!("error: {err}");
            continue;
        }
        if let Err(err) = session.settle() {
            eprintln!("error: {err:#}");
        }
        if session.state.phase() == GamePhase::GameOver {
            println!("type `new` to play again");
        }
    }
    Ok(())
}
