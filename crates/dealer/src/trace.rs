use crate::DealerError;
use roulette_core::{GamePhase, MatchStats, Side};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SimulationStatus {
    Finished,
    MaxSteps,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepRecord {
    pub step: u32,
    pub actor: Side,
    pub action: String,
    pub phase_before: GamePhase,
    pub phase_after: GamePhase,
    pub player_hp: u32,
    pub dealer_hp: u32,
    pub event_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimulationReport {
    pub seed: u64,
    pub hard_mode: bool,
    pub status: SimulationStatus,
    pub winner: Option<Side>,
    pub score: i64,
    pub stats: MatchStats,
    #[serde(default)]
    pub steps: Vec<StepRecord>,
}

impl SimulationReport {
    pub fn to_text_report(&self) -> String {
        let winner = self.winner.map(Side::label).unwrap_or("none");
        let mut lines = vec![
            format!(
                "seed {} ({}) status {:?} winner {} score {}",
                self.seed,
                if self.hard_mode { "hard" } else { "normal" },
                self.status,
                winner,
                self.score
            ),
            format!(
                "shots {} hits {} self {} dealt {} taken {} rounds {} items {}",
                self.stats.shots_fired,
                self.stats.shots_hit,
                self.stats.self_shots,
                self.stats.damage_dealt,
                self.stats.damage_taken,
                self.stats.rounds_survived,
                self.stats.total_items_used()
            ),
        ];
        for step in &self.steps {
            lines.push(format!(
                "  {:>4} {:<6} {:<16} {:?} -> {:?} hp {}/{} events {}",
                step.step,
                step.actor.label(),
                step.action,
                step.phase_before,
                step.phase_after,
                step.player_hp,
                step.dealer_hp,
                step.event_count
            ));
        }
        lines.join("\n")
    }
}

/// Aggregate over many simulated matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub matches: u32,
    pub player_wins: u32,
    pub dealer_wins: u32,
    pub unfinished: u32,
    pub best_score: i64,
    pub total_score: i64,
    pub total_steps: u64,
    #[serde(default)]
    pub reports: Vec<SimulationReport>,
}

impl BatchSummary {
    pub fn record(&mut self, report: SimulationReport) {
        self.matches += 1;
        match (report.status, report.winner) {
            (SimulationStatus::Finished, Some(Side::Player)) => self.player_wins += 1,
            (SimulationStatus::Finished, Some(Side::Dealer)) => self.dealer_wins += 1,
            _ => self.unfinished += 1,
        }
        self.best_score = self.best_score.max(report.score);
        self.total_score += report.score;
        self.total_steps += report.steps.len() as u64;
        self.reports.push(report);
    }

    pub fn player_win_rate(&self) -> f64 {
        if self.matches == 0 {
            return 0.0;
        }
        f64::from(self.player_wins) / f64::from(self.matches)
    }

    pub fn mean_score(&self) -> f64 {
        if self.matches == 0 {
            return 0.0;
        }
        self.total_score as f64 / f64::from(self.matches)
    }

    pub fn to_text_report(&self) -> String {
        [
            format!("matches {}", self.matches),
            format!(
                "player wins {} ({:.1}%) dealer wins {} unfinished {}",
                self.player_wins,
                self.player_win_rate() * 100.0,
                self.dealer_wins,
                self.unfinished
            ),
            format!(
                "best score {} mean score {:.1} steps {}",
                self.best_score,
                self.mean_score(),
                self.total_steps
            ),
        ]
        .join("\n")
    }
}

pub fn write_json(path: &Path, summary: &BatchSummary) -> Result<(), DealerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(summary)?;
    fs::write(path, body)?;
    Ok(())
}
