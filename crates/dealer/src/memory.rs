use roulette_core::{Event, Shell};
use std::collections::BTreeMap;

/// What one seat believes about the chamber, keyed by absolute shell index.
/// Never authoritative: entries come from the seat's own reveals and from
/// public events, and can be wrong when a lying PHONE was trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealerMemory {
    batch_id: u64,
    cursor: usize,
    known: BTreeMap<usize, Shell>,
}

impl DealerMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aligns with the public counters: a new batch wipes everything, and
    /// entries behind the cursor are dropped.
    pub fn sync(&mut self, batch_id: u64, cursor: usize) {
        if batch_id != self.batch_id {
            self.known.clear();
            self.batch_id = batch_id;
        }
        self.cursor = cursor;
        self.prune();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn get(&self, index: usize) -> Option<Shell> {
        self.known.get(&index).copied()
    }

    pub fn current(&self) -> Option<Shell> {
        self.get(self.cursor)
    }

    pub fn record(&mut self, index: usize, shell: Shell) {
        if index >= self.cursor {
            self.known.insert(index, shell);
        }
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    pub fn known_live(&self) -> usize {
        self.known.values().filter(|shell| shell.is_live()).count()
    }

    pub fn is_known(&self, index: usize) -> bool {
        self.known.contains_key(&index)
    }

    /// Follows the mechanical effect of a public event. The seat's own
    /// private reveals are recorded separately through `record`.
    pub fn observe(&mut self, event: &Event) {
        match event {
            Event::BatchLoaded { .. } => {
                self.known.clear();
                self.cursor = 0;
            }
            Event::ShotFired { shells, .. } => self.advance(shells.len()),
            Event::ShellEjected { .. } => self.advance(1),
            Event::ShellInverted { all: false, .. } => {
                if let Some(shell) = self.known.get_mut(&self.cursor) {
                    *shell = shell.flipped();
                }
            }
            Event::ShellInverted { all: true, .. } => {
                for shell in self.known.values_mut() {
                    *shell = shell.flipped();
                }
            }
            Event::ShellsSwapped { .. } => {
                let next = self.cursor + 1;
                let first = self.known.remove(&self.cursor);
                let second = self.known.remove(&next);
                if let Some(shell) = second {
                    self.known.insert(self.cursor, shell);
                }
                if let Some(shell) = first {
                    self.known.insert(next, shell);
                }
            }
            _ => {}
        }
    }

    fn advance(&mut self, count: usize) {
        self.cursor += count;
        self.prune();
    }

    fn prune(&mut self) {
        self.known = self.known.split_off(&self.cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roulette_core::Side;
    use Shell::{Blank, Live};

    #[test]
    fn new_batch_clears_memory() {
        let mut memory = DealerMemory::new();
        memory.sync(1, 0);
        memory.record(2, Live);
        memory.sync(1, 1);
        assert_eq!(memory.get(2), Some(Live));
        memory.sync(2, 0);
        assert!(memory.is_empty());
    }

    #[test]
    fn spent_shells_are_forgotten() {
        let mut memory = DealerMemory::new();
        memory.sync(1, 0);
        memory.record(0, Blank);
        memory.record(1, Live);
        memory.observe(&Event::ShotFired {
            shooter: Side::Dealer,
            target: Side::Dealer,
            shells: vec![Blank],
            damage: 0,
        });
        assert_eq!(memory.cursor(), 1);
        assert_eq!(memory.get(0), None);
        assert_eq!(memory.current(), Some(Live));
        memory.observe(&Event::ShellEjected {
            side: Side::Player,
            shell: Live,
        });
        assert!(memory.is_empty());
    }

    #[test]
    fn public_manipulation_updates_beliefs() {
        let mut memory = DealerMemory::new();
        memory.sync(1, 0);
        memory.record(0, Blank);
        memory.record(3, Live);
        memory.observe(&Event::ShellInverted {
            side: Side::Player,
            all: false,
        });
        assert_eq!(memory.current(), Some(Live));
        memory.observe(&Event::ShellsSwapped { side: Side::Player });
        assert_eq!(memory.get(0), None);
        assert_eq!(memory.get(1), Some(Live));
        memory.observe(&Event::ShellInverted {
            side: Side::Player,
            all: true,
        });
        assert_eq!(memory.get(1), Some(Blank));
        assert_eq!(memory.get(3), Some(Blank));
    }

    #[test]
    fn records_behind_cursor_are_ignored() {
        let mut memory = DealerMemory::new();
        memory.sync(1, 3);
        memory.record(1, Live);
        assert!(memory.is_empty());
    }
}
