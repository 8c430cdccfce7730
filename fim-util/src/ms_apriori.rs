//! Apriori with multiple minimum supports.
//!
//! Items are ranked by their minimum item support (MIS), ties broken by
//! item id. Every itemset, candidate list and transaction is kept in that
//! canonical order so that support counting can be done with a single
//! merge-style scan.

use crate::itemset::ItemSet;
use crate::transactions::{Item, Transactions};
use log::debug;
use std::cmp::Ordering;

/// MS-Apriori miner over a borrowed list of transactions.
pub struct MsApriori<'a> {
    transactions: &'a Transactions,
    support_difference_constraint: f64,
    mis: Vec<usize>,
}

impl<'a> MsApriori<'a> {
    /// Set up the miner and compute every item's MIS.
    ///
    /// * `transactions` - transactions to mine
    /// * `uniform_minimum_support` - floor of every item's MIS
    /// * `mis_percentage` - MIS as a fraction of the item's own support
    /// * `support_difference_constraint` - maximum support gap (as a fraction
    ///   of the number of transactions) between items or itemsets that may
    ///   be combined
    pub fn new(
        transactions: &'a Transactions,
        uniform_minimum_support: usize,
        mis_percentage: f64,
        support_difference_constraint: f64,
    ) -> Self {
        let mis = transactions
            .item_count
            .iter()
            .map(|&support| {
                let adaptive = (support as f64 * mis_percentage).ceil() as usize;
                uniform_minimum_support.max(adaptive)
            })
            .collect();

        MsApriori {
            transactions,
            support_difference_constraint,
            mis,
        }
    }

    /// Minimum item support of `item`
    #[inline]
    pub fn mis(&self, item: Item) -> usize {
        self.mis[item]
    }

    /// Canonical item order: MIS ascending, then item id ascending.
    #[inline]
    pub fn compare_items(&self, a: &Item, b: &Item) -> Ordering {
        self.mis[*a].cmp(&self.mis[*b]).then(a.cmp(b))
    }

    fn compare_itemsets(&self, a: &ItemSet, b: &ItemSet) -> Ordering {
        for (x, y) in a.items.iter().zip(b.items.iter()) {
            match self.compare_items(x, y) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        a.len().cmp(&b.len())
    }

    /// All items sorted in canonical order
    pub fn canonical_items(&self) -> Vec<Item> {
        let mut items: Vec<Item> = (0..self.transactions.num_items()).collect();
        items.sort_by(|a, b| self.compare_items(a, b));
        items
    }

    /// Frequent single items (F1), in canonical order.
    ///
    /// The first item that meets its own MIS sets the floor for every
    /// later item, which only has to reach that floor.
    pub fn frequent_items(&self) -> Vec<Item> {
        let mut frequent1 = vec![];
        let mut floor: Option<usize> = None;

        for item in self.canonical_items() {
            let support = self.transactions.support(item);
            match floor {
                None => {
                    if support >= self.mis[item] {
                        frequent1.push(item);
                        floor = Some(self.mis[item]);
                    }
                }
                Some(min_mis) => {
                    if support >= min_mis {
                        frequent1.push(item);
                    }
                }
            }
        }
        frequent1
    }

    /// Mine frequent itemsets up to size `k`.
    ///
    /// Returns the frequent itemsets of the largest size reached: size `k`
    /// if every level produced something, otherwise empty. With `k < 2`
    /// the frequent single items are returned.
    pub fn run_to_size_k(&self, k: usize) -> Vec<ItemSet> {
        let frequent1 = self.frequent_items();
        debug!(
            "MS-Apriori: {} items, {} frequent, {} transactions",
            self.transactions.num_items(),
            frequent1.len(),
            self.transactions.len()
        );

        if frequent1.is_empty() {
            return vec![];
        }

        if k < 2 {
            return frequent1
                .into_iter()
                .map(|item| ItemSet {
                    items: vec![item],
                    support: self.transactions.support(item),
                })
                .collect();
        }

        let sorted_transactions: Vec<Vec<Item>> = self
            .transactions
            .transactions
            .iter()
            .map(|tx| {
                let mut tx = tx.clone();
                tx.sort_by(|a, b| self.compare_items(a, b));
                tx
            })
            .collect();

        let mut frequents: Vec<ItemSet> = vec![];
        for size in 2..=k {
            let candidates = if size == 2 {
                self.candidates_of_size_2(&frequent1)
            } else {
                self.candidates_of_size_k(&frequents)
            };
            frequents = self.prune_by_support(candidates, &sorted_transactions);
            debug!("MS-Apriori: {} frequent itemsets of size {}", frequents.len(), size);
            if frequents.is_empty() {
                break;
            }
        }
        frequents
    }

    fn support_gap_ok(&self, support_a: usize, support_b: usize) -> bool {
        let n = self.transactions.len().max(1) as f64;
        support_a.abs_diff(support_b) as f64 / n <= self.support_difference_constraint
    }

    /// Size-2 candidates from F1. No subset check is needed here.
    fn candidates_of_size_2(&self, frequent1: &[Item]) -> Vec<ItemSet> {
        let mut candidates = vec![];
        for (i, &item1) in frequent1.iter().enumerate() {
            let support1 = self.transactions.support(item1);
            for &item2 in frequent1[(i + 1)..].iter() {
                let support2 = self.transactions.support(item2);
                // MIS[item1] <= MIS[item2] by the canonical order
                if support2 >= self.mis[item1] && self.support_gap_ok(support1, support2) {
                    candidates.push(ItemSet::new(vec![item1, item2]));
                }
            }
        }
        candidates
    }

    /// Size-k candidates by joining (k-1)-itemsets that share a prefix.
    fn candidates_of_size_k(&self, frequents: &[ItemSet]) -> Vec<ItemSet> {
        let mut sorted = frequents.to_vec();
        sorted.sort_by(|a, b| self.compare_itemsets(a, b));

        let mut candidates = vec![];
        for (i, fk_i) in sorted.iter().enumerate() {
            for fk_j in sorted[(i + 1)..].iter() {
                if !fk_i.shares_prefix_except_last(fk_j) {
                    continue;
                }
                if !self.support_gap_ok(fk_i.support, fk_j.support) {
                    continue;
                }
                let candidate = self.merge_prefix_itemsets(fk_i, fk_j);
                if self.all_subsets_frequent(&candidate, &sorted) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }

    /// Join two itemsets that differ only in their last item.
    ///
    /// The two trailing items are placed by ascending MIS. On an MIS tie
    /// the trailing item of `fk_j` always goes first.
    fn merge_prefix_itemsets(&self, fk_i: &ItemSet, fk_j: &ItemSet) -> ItemSet {
        let len = fk_i.len();
        let last_i = fk_i.get(len - 1);
        let last_j = fk_j.get(len - 1);

        let mut items = Vec::with_capacity(len + 1);
        items.extend_from_slice(&fk_i.items[..(len - 1)]);

        if self.mis[last_i] < self.mis[last_j] {
            items.push(last_i);
            items.push(last_j);
        } else {
            items.push(last_j);
            items.push(last_i);
        }
        ItemSet::new(items)
    }

    /// Every (k-1)-subset of `candidate` must be in the sorted `frequents`.
    ///
    /// The subset without position 1 is only required when the first two
    /// items share the same MIS: with the lowest-MIS item first, that
    /// subset may legitimately be missing.
    fn all_subsets_frequent(&self, candidate: &ItemSet, frequents: &[ItemSet]) -> bool {
        let same_leading_mis =
            candidate.len() > 1 && self.mis[candidate.get(0)] == self.mis[candidate.get(1)];

        (0..candidate.len())
            .filter(|&remove| remove != 1 || same_leading_mis)
            .all(|remove| {
                frequents
                    .binary_search_by(|fs| {
                        candidate
                            .compare_excluding_index(fs, remove, |a, b| self.compare_items(a, b))
                            .reverse()
                    })
                    .is_ok()
            })
    }

    /// Measure every candidate's support; keep those reaching the MIS of
    /// their first item.
    fn prune_by_support(
        &self,
        candidates: Vec<ItemSet>,
        sorted_transactions: &[Vec<Item>],
    ) -> Vec<ItemSet> {
        candidates
            .into_iter()
            .filter_map(|mut candidate| {
                candidate.support = sorted_transactions
                    .iter()
                    .filter(|tx| self.transaction_contains(tx, &candidate.items))
                    .count();
                if candidate.support >= self.mis[candidate.get(0)] {
                    Some(candidate)
                } else {
                    None
                }
            })
            .collect()
    }

    /// O(n) containment test; both sides are in canonical order.
    fn transaction_contains(&self, transaction: &[Item], items: &[Item]) -> bool {
        let mut i = 0;
        let mut j = 0;
        while i < transaction.len() && j < items.len() {
            let item_i = transaction[i];
            let item_j = items[j];
            if item_i == item_j {
                i += 1;
                j += 1;
            } else if self.mis[item_i] <= self.mis[item_j] {
                i += 1;
            } else {
                return false;
            }
        }
        j == items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A in 10, B in 4, C in 20 of 20 transactions
    fn abc_transactions() -> Transactions {
        let mut tx = Transactions::new();
        for i in 0..20 {
            let mut words = vec!["C"];
            if i < 10 {
                words.push("A");
            }
            if i < 4 {
                words.push("B");
            }
            tx.add_transaction(words);
        }
        tx
    }

    #[test]
    fn test_mis_and_canonical_order() {
        let tx = abc_transactions();
        let miner = MsApriori::new(&tx, 4, 0.5, 1.0);

        let a = tx.item("A").unwrap();
        let b = tx.item("B").unwrap();
        let c = tx.item("C").unwrap();

        assert_eq!(miner.mis(a), 5);
        assert_eq!(miner.mis(b), 4);
        assert_eq!(miner.mis(c), 10);

        assert_eq!(miner.canonical_items(), vec![b, a, c]);
        assert_eq!(miner.frequent_items(), vec![b, a, c]);
    }

    #[test]
    fn test_mis_monotone_in_support() {
        let mut tx = Transactions::new();
        for i in 0..30 {
            let words: Vec<String> = (0..=(i % 10)).map(|w| format!("w{}", w)).collect();
            tx.add_transaction(words);
        }
        let miner = MsApriori::new(&tx, 2, 0.35, 1.0);
        for a in 0..tx.num_items() {
            for b in 0..tx.num_items() {
                if tx.support(a) <= tx.support(b) {
                    assert!(miner.mis(a) <= miner.mis(b));
                }
            }
        }
    }

    #[test]
    fn test_floor_from_first_item_meeting_its_mis() {
        // X: 3 of 10 (MIS 4, not met), Y: 9 of 10 (MIS 5), Z: 4 of 10 (MIS 4)
        let mut tx = Transactions::new();
        for i in 0..10 {
            let mut words = vec![];
            if i < 3 {
                words.push("X");
            }
            if i < 9 {
                words.push("Y");
            }
            if i >= 6 {
                words.push("Z");
            }
            tx.add_transaction(words);
        }
        let miner = MsApriori::new(&tx, 4, 0.5, 1.0);
        let x = tx.item("X").unwrap();
        let y = tx.item("Y").unwrap();
        let z = tx.item("Z").unwrap();

        assert_eq!(miner.canonical_items(), vec![x, z, y]);
        // Z meets MIS 4 and sets the floor; X came earlier and failed
        assert_eq!(miner.frequent_items(), vec![z, y]);
    }

    #[test]
    fn test_empty_frequent_items() {
        let tx = Transactions::from_word_lists([vec!["a"], vec!["b"]]);
        let miner = MsApriori::new(&tx, 5, 0.5, 1.0);
        assert!(miner.frequent_items().is_empty());
        assert!(miner.run_to_size_k(2).is_empty());
    }

    #[test]
    fn test_size2_candidates_respect_mis_of_first() {
        let tx = abc_transactions();
        let miner = MsApriori::new(&tx, 4, 0.5, 1.0);
        let f1 = miner.frequent_items();
        let candidates = miner.candidates_of_size_2(&f1);
        assert!(!candidates.is_empty());
        for cand in candidates.iter() {
            let (first, second) = (cand.get(0), cand.get(1));
            assert!(tx.support(second) >= miner.mis(first));
            assert_eq!(miner.compare_items(&first, &second), Ordering::Less);
        }
    }

    #[test]
    fn test_support_difference_constraint() {
        let tx = abc_transactions();
        let a = tx.item("A").unwrap();
        let b = tx.item("B").unwrap();
        let c = tx.item("C").unwrap();

        // |4 - 20| / 20 = 0.8, |10 - 20| / 20 = 0.5, |4 - 10| / 20 = 0.3
        let miner = MsApriori::new(&tx, 4, 0.5, 0.5);
        let pairs: Vec<Vec<Item>> = miner
            .candidates_of_size_2(&miner.frequent_items())
            .into_iter()
            .map(|x| x.items)
            .collect();
        assert_eq!(pairs, vec![vec![b, a], vec![a, c]]);
    }

    #[test]
    fn test_run_to_size_2_measures_support() {
        let tx = abc_transactions();
        let miner = MsApriori::new(&tx, 4, 0.5, 1.0);
        let frequents = miner.run_to_size_k(2);
        let a = tx.item("A").unwrap();
        let b = tx.item("B").unwrap();
        let c = tx.item("C").unwrap();

        let found: Vec<(Vec<Item>, usize)> = frequents
            .into_iter()
            .map(|x| (x.items, x.support))
            .collect();
        // {B,A}: 4 >= MIS(B)=4, {B,C}: 4 >= 4, {A,C}: 10 >= MIS(A)=5
        assert_eq!(
            found,
            vec![(vec![b, a], 4), (vec![b, c], 4), (vec![a, c], 10)]
        );
    }

    #[test]
    fn test_subset_pruning_rejects_missing_subset() {
        let tx = Transactions::from_word_lists([
            vec!["a", "b", "c", "d"],
            vec!["a", "b", "c", "d"],
        ]);
        let miner = MsApriori::new(&tx, 1, 0.0, 1.0);
        // all MIS equal to 1, so canonical order is the item id order
        let abc = ItemSet::new(vec![0, 1, 2]);
        let full = vec![
            ItemSet::new(vec![0, 1]),
            ItemSet::new(vec![0, 2]),
            ItemSet::new(vec![1, 2]),
        ];
        assert!(miner.all_subsets_frequent(&abc, &full));

        // {b,c} missing; MIS(a) == MIS(b) so position 1 is checked too
        let without_bc = vec![ItemSet::new(vec![0, 1]), ItemSet::new(vec![0, 2])];
        assert!(!miner.all_subsets_frequent(&abc, &without_bc));

        // {a,c} missing: removing position 1 is checked and fails
        let without_ac = vec![ItemSet::new(vec![0, 1]), ItemSet::new(vec![1, 2])];
        assert!(!miner.all_subsets_frequent(&abc, &without_ac));
    }

    #[test]
    fn test_subset_pruning_skips_position_one_on_distinct_mis() {
        // b appears in every transaction, so MIS(b) > MIS(a)
        let mut tx = Transactions::new();
        for i in 0..10 {
            let mut words = vec!["b", "c"];
            if i < 2 {
                words.push("a");
            }
            tx.add_transaction(words);
        }
        let miner = MsApriori::new(&tx, 1, 0.5, 1.0);
        let a = tx.item("a").unwrap();
        let b = tx.item("b").unwrap();
        let c = tx.item("c").unwrap();
        assert!(miner.mis(a) < miner.mis(b));

        let cand = ItemSet::new(vec![a, b, c]);
        // {a,c} (position 1 removed) is not required here
        let mut frequents = vec![ItemSet::new(vec![a, b]), ItemSet::new(vec![b, c])];
        frequents.sort_by(|x, y| miner.compare_itemsets(x, y));
        assert!(miner.all_subsets_frequent(&cand, &frequents));

        let mut missing_bc = vec![ItemSet::new(vec![a, b]), ItemSet::new(vec![a, c])];
        missing_bc.sort_by(|x, y| miner.compare_itemsets(x, y));
        assert!(!miner.all_subsets_frequent(&cand, &missing_bc));
    }

    #[test]
    fn test_merge_orders_trailing_items_by_mis() {
        let mut tx = Transactions::new();
        for i in 0..10 {
            let mut words = vec!["p", "q"];
            if i < 4 {
                words.push("r");
            }
            tx.add_transaction(words);
        }
        let miner = MsApriori::new(&tx, 1, 0.5, 1.0);
        let p = tx.item("p").unwrap();
        let q = tx.item("q").unwrap();
        let r = tx.item("r").unwrap();

        // MIS(r) = 2 < MIS(q) = 5
        let merged = miner.merge_prefix_itemsets(
            &ItemSet::new(vec![p, q]),
            &ItemSet::new(vec![p, r]),
        );
        assert_eq!(merged.items, vec![p, r, q]);

        // MIS tie: the second itemset's trailing item goes first
        let merged = miner.merge_prefix_itemsets(
            &ItemSet::new(vec![r, p]),
            &ItemSet::new(vec![r, q]),
        );
        assert_eq!(merged.items, vec![r, q, p]);
    }

    #[test]
    fn test_run_to_size_3() {
        // x: support 2 (MIS 1), y: 4 (MIS 2), z: 6 (MIS 3)
        let tx = Transactions::from_word_lists([
            vec!["x", "y", "z"],
            vec!["x", "y", "z"],
            vec!["y", "z"],
            vec!["y", "z"],
            vec!["z"],
            vec!["z"],
        ]);
        let miner = MsApriori::new(&tx, 1, 0.5, 1.0);
        let frequents = miner.run_to_size_k(3);
        assert_eq!(frequents.len(), 1);
        assert_eq!(frequents[0].items, vec![0, 1, 2]);
        assert_eq!(frequents[0].support, 2);
    }

    #[test]
    fn test_run_to_size_1_returns_singletons() {
        let tx = abc_transactions();
        let miner = MsApriori::new(&tx, 4, 0.5, 1.0);
        let singles = miner.run_to_size_k(1);
        assert_eq!(singles.len(), 3);
        assert!(singles.iter().all(|x| x.len() == 1));
        assert_eq!(singles[0].support, 4);
    }
}
