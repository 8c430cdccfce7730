use std::fmt;

/// Two distinct words in lexical order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordPair {
    first: Box<str>,
    second: Box<str>,
}

impl WordPair {
    /// Canonicalize `(a, b)` into lexical order
    pub fn new(a: &str, b: &str) -> Self {
        debug_assert!(a != b, "a word pair needs two distinct words: {}", a);
        if a <= b {
            WordPair {
                first: a.into(),
                second: b.into(),
            }
        } else {
            WordPair {
                first: b.into(),
                second: a.into(),
            }
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn contains(&self, word: &str) -> bool {
        self.first.as_ref() == word || self.second.as_ref() == word
    }

    pub fn shares_word(&self, other: &WordPair) -> bool {
        self.contains(&other.first) || self.contains(&other.second)
    }
}

impl fmt::Display for WordPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.second)
    }
}
