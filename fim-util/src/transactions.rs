//! Transactions for itemset mining.
//!
//! A transaction is the set of words ranked under one topic. Words are
//! mapped to dense item ids in the order they are first seen, and the
//! number of transactions containing each item is kept as its support.

use std::collections::HashMap;

/// Dense item identifier
pub type Item = usize;

/// A list of transactions over a shared item dictionary.
#[derive(Debug, Clone, Default)]
pub struct Transactions {
    /// Each transaction as a list of distinct items
    pub transactions: Vec<Vec<Item>>,
    /// Number of transactions containing each item
    pub item_count: Vec<usize>,
    item_to_word: Vec<Box<str>>,
    word_to_item: HashMap<Box<str>, Item>,
}

impl Transactions {
    /// Create an empty list of transactions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build transactions from word lists, one transaction per list.
    ///
    /// ```
    /// use fim_util::Transactions;
    ///
    /// let tx = Transactions::from_word_lists([vec!["a", "b"], vec!["b", "c", "b"]]);
    /// assert_eq!(tx.len(), 2);
    /// assert_eq!(tx.support(tx.item("b").unwrap()), 2);
    /// ```
    pub fn from_word_lists<I, L, S>(lists: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ret = Self::new();
        for words in lists {
            ret.add_transaction(words);
        }
        ret
    }

    /// Add one transaction. Repeated words count once.
    pub fn add_transaction<L, S>(&mut self, words: L)
    where
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut items: Vec<Item> = words
            .into_iter()
            .map(|w| self.get_or_insert(w.as_ref()))
            .collect();
        items.sort_unstable();
        items.dedup();

        for &item in items.iter() {
            self.item_count[item] += 1;
        }
        self.transactions.push(items);
    }

    fn get_or_insert(&mut self, word: &str) -> Item {
        if let Some(&item) = self.word_to_item.get(word) {
            return item;
        }
        let item = self.item_to_word.len();
        let word: Box<str> = word.into();
        self.item_to_word.push(word.clone());
        self.word_to_item.insert(word, item);
        self.item_count.push(0);
        item
    }

    /// Number of transactions
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// `true` if there is no transaction
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Number of distinct items
    pub fn num_items(&self) -> usize {
        self.item_to_word.len()
    }

    /// Number of transactions containing `item`
    pub fn support(&self, item: Item) -> usize {
        self.item_count[item]
    }

    /// The word behind an item
    pub fn word(&self, item: Item) -> &str {
        &self.item_to_word[item]
    }

    /// The item of a word, if the word was seen
    pub fn item(&self, word: &str) -> Option<Item> {
        self.word_to_item.get(word).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_in_first_seen_order() {
        let tx = Transactions::from_word_lists([vec!["x", "y"], vec!["z", "x"]]);
        assert_eq!(tx.num_items(), 3);
        assert_eq!(tx.item("x"), Some(0));
        assert_eq!(tx.item("y"), Some(1));
        assert_eq!(tx.item("z"), Some(2));
        assert_eq!(tx.word(2), "z");
        assert_eq!(tx.item("w"), None);
    }

    #[test]
    fn test_duplicates_count_once() {
        let tx = Transactions::from_word_lists([vec!["x", "x", "y"], vec!["x"]]);
        assert_eq!(tx.support(0), 2);
        assert_eq!(tx.support(1), 1);
        assert_eq!(tx.transactions[0], vec![0, 1]);
    }
}
