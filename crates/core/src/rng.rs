use rand::{rngs::StdRng, seq::SliceRandom, RngCore, SeedableRng};

#[derive(Debug, Clone)]
enum Source {
    Seeded(StdRng),
    Scripted { values: Vec<u64>, next: usize },
}

/// Random source for every draw the engine makes: batch sizes, shuffles,
/// item rolls and PHONE intel.
#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    source: Source,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            source: Source::Seeded(StdRng::seed_from_u64(seed)),
        }
    }

    /// Replays `values` in order, wrapping around at the end. Lets tests pin
    /// every draw exactly.
    pub fn scripted(values: Vec<u64>) -> Self {
        let values = if values.is_empty() { vec![0] } else { values };
        Self {
            seed: 0,
            source: Source::Scripted { values, next: 0 },
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        match &mut self.source {
            Source::Seeded(rng) => rng.next_u64(),
            Source::Scripted { values, next } => {
                let value = values[*next % values.len()];
                *next = (*next + 1) % values.len();
                value
            }
        }
    }

    /// Uniform draw in `[0, bound)`. Returns 0 for an empty range.
    pub fn below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.next_u64() % bound
    }

    pub fn range_inclusive(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        min + self.below(max - min + 1)
    }

    pub fn percent(&mut self, percent: u32) -> bool {
        self.below(100) < u64::from(percent)
    }

    pub fn coin_flip(&mut self) -> bool {
        self.below(2) == 0
    }

    /// Scripted sources run Fisher–Yates through `below` so every swap is
    /// pinned.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        if let Source::Seeded(rng) = &mut self.source {
            items.shuffle(rng);
            return;
        }
        for i in (1..items.len()).rev() {
            let j = self.below(i as u64 + 1) as usize;
            items.swap(i, j);
        }
    }
}
