use crate::word_pair::WordPair;

use std::collections::HashMap;
use std::fmt;

/// Two words that should share topics, weighted by mining support
#[derive(Debug, Clone, PartialEq)]
pub struct MustLink {
    pub pair: WordPair,
    pub weight: f64,
}

/// Deduplicated must-links in insertion order
#[derive(Debug, Clone, Default)]
pub struct MustLinks {
    links: Vec<MustLink>,
    by_pair: HashMap<WordPair, usize>,
}

impl MustLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a must-link; returns `false` if the pair is already there.
    pub fn add(&mut self, link: MustLink) -> bool {
        if self.by_pair.contains_key(&link.pair) {
            return false;
        }
        self.by_pair.insert(link.pair.clone(), self.links.len());
        self.links.push(link);
        true
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MustLink> {
        self.links.iter()
    }

    pub fn contains(&self, pair: &WordPair) -> bool {
        self.by_pair.contains_key(pair)
    }
}

/// One pair per line
impl fmt::Display for MustLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for link in self.links.iter() {
            writeln!(f, "{}", link.pair)?;
        }
        Ok(())
    }
}
