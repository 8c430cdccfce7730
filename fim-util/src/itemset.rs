//! Itemsets kept in the miner's canonical item order.

use crate::transactions::Item;
use std::cmp::Ordering;

/// An ordered list of distinct items and its measured support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSet {
    /// Items in canonical order
    pub items: Vec<Item>,
    /// Number of transactions containing every item
    pub support: usize,
}

impl ItemSet {
    /// Create an itemset whose support is not measured yet.
    pub fn new(items: Vec<Item>) -> Self {
        ItemSet { items, support: 0 }
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` if the itemset holds no item
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at position `i`
    #[inline]
    pub fn get(&self, i: usize) -> Item {
        self.items[i]
    }

    /// `true` if both itemsets have the same length and agree on every item
    /// except the last one.
    pub fn shares_prefix_except_last(&self, other: &ItemSet) -> bool {
        let n = self.len();
        n > 0 && n == other.len() && self.items[..n - 1] == other.items[..n - 1]
    }

    /// Compare `self` with the item at `skip` removed against `other`,
    /// lexicographically under the item order `cmp`.
    ///
    /// ```
    /// use fim_util::ItemSet;
    ///
    /// let abc = ItemSet::new(vec![1, 2, 3]);
    /// let ac = ItemSet::new(vec![1, 3]);
    /// let cmp = |a: &usize, b: &usize| a.cmp(b);
    /// assert_eq!(abc.compare_excluding_index(&ac, 1, cmp), std::cmp::Ordering::Equal);
    /// assert_eq!(abc.compare_excluding_index(&ac, 0, cmp), std::cmp::Ordering::Greater);
    /// ```
    pub fn compare_excluding_index<F>(&self, other: &ItemSet, skip: usize, cmp: F) -> Ordering
    where
        F: Fn(&Item, &Item) -> Ordering,
    {
        let mut kept = self
            .items
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != skip)
            .map(|(_, x)| x);

        for y in other.items.iter() {
            match kept.next() {
                Some(x) => match cmp(x, y) {
                    Ordering::Equal => continue,
                    ord => return ord,
                },
                None => return Ordering::Less,
            }
        }

        if kept.next().is_some() {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_prefix_except_last() {
        let a = ItemSet::new(vec![4, 2, 7]);
        let b = ItemSet::new(vec![4, 2, 9]);
        let c = ItemSet::new(vec![4, 3, 7]);
        assert!(a.shares_prefix_except_last(&b));
        assert!(!a.shares_prefix_except_last(&c));
        assert!(!a.shares_prefix_except_last(&ItemSet::new(vec![4, 2])));
    }

    #[test]
    fn test_compare_excluding_index_uses_given_order() {
        // reversed order: larger ids come first
        let rev = |a: &usize, b: &usize| b.cmp(a);
        let x = ItemSet::new(vec![9, 5, 1]);
        assert_eq!(
            x.compare_excluding_index(&ItemSet::new(vec![9, 1]), 1, rev),
            Ordering::Equal
        );
        assert_eq!(
            x.compare_excluding_index(&ItemSet::new(vec![9, 3]), 1, rev),
            Ordering::Greater
        );
        assert_eq!(
            x.compare_excluding_index(&ItemSet::new(vec![5, 1, 0]), 0, rev),
            Ordering::Less
        );
    }
}
