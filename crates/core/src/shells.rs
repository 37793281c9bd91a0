use crate::{RngState, RulesConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Shell {
    Live,
    Blank,
}

impl Shell {
    pub fn is_live(self) -> bool {
        matches!(self, Shell::Live)
    }

    pub fn flipped(self) -> Self {
        match self {
            Shell::Live => Shell::Blank,
            Shell::Blank => Shell::Live,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Shell::Live => "live",
            Shell::Blank => "blank",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChamberError {
    #[error("cannot consume {requested} shells with {remaining} remaining")]
    Exhausted { requested: usize, remaining: usize },
    #[error("shell index {0} is outside the remaining range")]
    OutOfRange(usize),
}

/// Ordered shells plus a cursor. Everything at or after the cursor is still
/// in the chamber; the live/blank counts always describe exactly that range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chamber {
    shells: Vec<Shell>,
    cursor: usize,
    live_remaining: usize,
    blank_remaining: usize,
}

impl Chamber {
    pub fn from_shells(shells: Vec<Shell>) -> Self {
        let mut chamber = Self {
            shells,
            cursor: 0,
            live_remaining: 0,
            blank_remaining: 0,
        };
        chamber.recount();
        chamber
    }

    pub fn empty() -> Self {
        Self::from_shells(Vec::new())
    }

    /// Draws a fresh batch: between `min_shells` and `max_shells` shells, at
    /// least one live and never more lives than blanks, biased toward the
    /// largest allowed live count.
    pub fn load_batch(rules: &RulesConfig, rng: &mut RngState) -> Self {
        let min = rules.min_shells.max(2) as u64;
        let max = (rules.max_shells as u64).max(min);
        let total = rng.range_inclusive(min, max) as usize;
        let max_lives = (total / 2).max(1);
        let lives = if rng.percent(rules.live_bias_percent) {
            max_lives
        } else {
            rng.range_inclusive(1, max_lives as u64) as usize
        };
        let mut shells = vec![Shell::Live; lives];
        shells.extend(std::iter::repeat(Shell::Blank).take(total - lives));
        rng.shuffle(&mut shells);
        Self::from_shells(shells)
    }

    pub fn len(&self) -> usize {
        self.shells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shells.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.shells.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn live_remaining(&self) -> usize {
        self.live_remaining
    }

    pub fn blank_remaining(&self) -> usize {
        self.blank_remaining
    }

    pub fn current(&self) -> Option<Shell> {
        self.peek(self.cursor)
    }

    /// Shell at an absolute index, if that index has not been consumed.
    pub fn peek(&self, index: usize) -> Option<Shell> {
        if index < self.cursor {
            return None;
        }
        self.shells.get(index).copied()
    }

    pub fn remaining_shells(&self) -> &[Shell] {
        &self.shells[self.cursor..]
    }

    pub fn consume(&mut self, count: usize) -> Result<Vec<Shell>, ChamberError> {
        if count > self.remaining() {
            return Err(ChamberError::Exhausted {
                requested: count,
                remaining: self.remaining(),
            });
        }
        let taken = self.shells[self.cursor..self.cursor + count].to_vec();
        for shell in &taken {
            match shell {
                Shell::Live => self.live_remaining -= 1,
                Shell::Blank => self.blank_remaining -= 1,
            }
        }
        self.cursor += count;
        Ok(taken)
    }

    /// Flips the shell at `index` and returns its new identity.
    pub fn invert(&mut self, index: usize) -> Result<Shell, ChamberError> {
        if index < self.cursor || index >= self.shells.len() {
            return Err(ChamberError::OutOfRange(index));
        }
        self.shells[index] = self.shells[index].flipped();
        self.recount();
        Ok(self.shells[index])
    }

    pub fn invert_all(&mut self) {
        for shell in &mut self.shells[self.cursor..] {
            *shell = shell.flipped();
        }
        self.recount();
    }

    pub fn swap_adjacent(&mut self, index: usize) -> Result<(), ChamberError> {
        if index < self.cursor || index + 1 >= self.shells.len() {
            return Err(ChamberError::OutOfRange(index));
        }
        self.shells.swap(index, index + 1);
        Ok(())
    }

    fn recount(&mut self) {
        let live = self.shells[self.cursor..]
            .iter()
            .filter(|shell| shell.is_live())
            .count();
        self.live_remaining = live;
        self.blank_remaining = self.remaining() - live;
    }
}
