use crate::word_pair::WordPair;

use std::collections::HashSet;
use std::fmt;

/// Two words that should not share topics
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CannotLink {
    pub pair: WordPair,
}

impl CannotLink {
    pub fn new(a: &str, b: &str) -> Self {
        CannotLink {
            pair: WordPair::new(a, b),
        }
    }
}

/// A growing set of cannot-links, kept in insertion order
#[derive(Debug, Clone, Default)]
pub struct CannotLinks {
    links: Vec<CannotLink>,
    unique: HashSet<WordPair>,
}

impl CannotLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cannot-link; returns `false` if it is already there.
    pub fn add(&mut self, link: CannotLink) -> bool {
        if !self.unique.insert(link.pair.clone()) {
            return false;
        }
        self.links.push(link);
        true
    }

    /// Add every link of `other` not yet present and return those.
    pub fn merge(&mut self, other: CannotLinks) -> Vec<CannotLink> {
        other
            .links
            .into_iter()
            .filter(|link| self.add(link.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CannotLink> {
        self.links.iter()
    }

    pub fn contains(&self, pair: &WordPair) -> bool {
        self.unique.contains(pair)
    }
}

/// One pair per line
impl fmt::Display for CannotLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for link in self.links.iter() {
            writeln!(f, "{}", link.pair)?;
        }
        Ok(())
    }
}
