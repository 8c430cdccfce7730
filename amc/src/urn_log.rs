use crate::common::*;

/// A pseudo-count added to a word's topic count when a must-linked word
/// was placed under that topic
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrnEntry {
    pub word: WordId,
    pub amount: f64,
}

/// The promotions applied for each occurrence, so that removing the
/// occurrence subtracts exactly what was added.
#[derive(Debug, Clone)]
pub struct UrnLog {
    entries: Vec<Vec<Vec<UrnEntry>>>,
}

impl UrnLog {
    pub fn new(docs: &[Vec<WordId>]) -> Self {
        UrnLog {
            entries: docs.iter().map(|doc| vec![vec![]; doc.len()]).collect(),
        }
    }

    pub fn record(&mut self, d: DocId, n: usize, applied: Vec<UrnEntry>) {
        debug_assert!(self.entries[d][n].is_empty());
        self.entries[d][n] = applied;
    }

    /// Take and clear the record of `(d, n)`
    pub fn take(&mut self, d: DocId, n: usize) -> Vec<UrnEntry> {
        std::mem::take(&mut self.entries[d][n])
    }

    pub fn get(&self, d: DocId, n: usize) -> &[UrnEntry] {
        &self.entries[d][n]
    }
}
