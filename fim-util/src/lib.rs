//! Frequent itemset mining with multiple minimum supports (MS-Apriori).
//!
//! Instead of one global support threshold, every item carries its own
//! minimum item support (MIS) derived from how often the item occurs.
//! Rare items therefore get a lower bar than frequent ones, which is
//! what we want when mining word pairs from ranked topic word lists.
//!
//! # References
//!
//! Liu, Hsu & Ma (1999). "Mining association rules with multiple minimum
//! supports." KDD 1999.

#![deny(missing_docs)]

/// Transactions and the word <-> item mapping
pub mod transactions;

/// Canonically ordered itemsets
pub mod itemset;

/// The MS-Apriori miner
pub mod ms_apriori;

pub use itemset::ItemSet;
pub use ms_apriori::MsApriori;
pub use transactions::{Item, Transactions};
