use crate::ItemType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const WIN_BONUS: i64 = 1_000;
const PER_ROUND: i64 = 500;
const PER_DAMAGE: i64 = 150;
const PER_HIT: i64 = 100;
const PER_ITEM: i64 = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchResult {
    Win,
    Loss,
}

/// Per-match telemetry, always from the local player's seat.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchStats {
    pub shots_fired: u32,
    pub shots_hit: u32,
    pub self_shots: u32,
    pub items_used: BTreeMap<ItemType, u32>,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub rounds_survived: u32,
    pub result: Option<MatchResult>,
    #[serde(default)]
    pub total_score: i64,
}

impl MatchStats {
    pub fn total_items_used(&self) -> u32 {
        self.items_used.values().sum()
    }

    pub fn record_item(&mut self, item: ItemType) {
        *self.items_used.entry(item).or_insert(0) += 1;
    }
}

/// Zero for a loss; otherwise a win bonus plus linear credit for rounds,
/// damage, hits and items, doubled in hard mode.
pub fn calculate_match_score(stats: &MatchStats, is_hard_mode: bool) -> i64 {
    if stats.result != Some(MatchResult::Win) {
        return 0;
    }
    let base = WIN_BONUS
        + PER_ROUND * i64::from(stats.rounds_survived)
        + PER_DAMAGE * i64::from(stats.damage_dealt)
        + PER_HIT * i64::from(stats.shots_hit)
        + PER_ITEM * i64::from(stats.total_items_used());
    if is_hard_mode {
        base * 2
    } else {
        base
    }
}

/// Lifetime aggregate across finished matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsRecord {
    pub matches_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub best_score: i64,
    pub total_score: i64,
    pub shots_fired: u64,
    pub shots_hit: u64,
    pub items_used: u64,
}

impl StatsRecord {
    pub fn record(&mut self, stats: &MatchStats) {
        self.matches_played += 1;
        match stats.result {
            Some(MatchResult::Win) => self.wins += 1,
            Some(MatchResult::Loss) => self.losses += 1,
            None => {}
        }
        self.best_score = self.best_score.max(stats.total_score);
        self.total_score += stats.total_score;
        self.shots_fired += u64::from(stats.shots_fired);
        self.shots_hit += u64::from(stats.shots_hit);
        self.items_used += u64::from(stats.total_items_used());
    }

    pub fn win_rate(&self) -> f64 {
        if self.matches_played == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(self.matches_played)
    }
}
