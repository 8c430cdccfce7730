//! Mining must-links and cannot-links from prior topics.

use crate::cannot_links::{CannotLink, CannotLinks};
use crate::common::*;
use crate::corpus::Vocabulary;
use crate::must_links::{MustLink, MustLinks};
use crate::params::ModelParams;
use crate::topics::PriorTopics;
use crate::word_pair::WordPair;

use fim_util::{MsApriori, Transactions};

const MUST_LINK_ITEMSET_SIZE: usize = 2;

///
/// Frequent word pairs across the prior topics' top words, kept when both
/// words are in `vocab`. The weight of a must-link is its support.
///
/// * `prior` - prior topics, one transaction each
/// * `vocab` - vocabulary of the target corpus
/// * `params` - MS-Apriori settings
///
pub fn extract_must_links(
    prior: &PriorTopics,
    vocab: &Vocabulary,
    params: &ModelParams,
) -> MustLinks {
    let transactions = Transactions::from_word_lists(prior.iter().map(|t| t.words()));

    let miner = MsApriori::new(
        &transactions,
        params.uniform_minimum_support,
        params.mis_percentage,
        params.support_difference_constraint,
    );

    let mut must_links = MustLinks::new();
    for itemset in miner.run_to_size_k(MUST_LINK_ITEMSET_SIZE) {
        assert_eq!(itemset.len(), MUST_LINK_ITEMSET_SIZE);
        let w1 = transactions.word(itemset.get(0));
        let w2 = transactions.word(itemset.get(1));
        if vocab.contains(w1) && vocab.contains(w2) {
            must_links.add(MustLink {
                pair: WordPair::new(w1, w2),
                weight: itemset.support as f64,
            });
        }
    }

    debug!(
        "{} must-links from {} prior topics",
        must_links.len(),
        prior.len()
    );
    must_links
}

/// Per-domain evidence for a cannot-link
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CannotLinkCounts {
    /// domains with a topic holding both words
    pub co_domain: usize,
    /// domains where the words only appear in different topics
    pub diff_domain: usize,
}

impl CannotLinkCounts {
    /// `diff / (diff + co)`, or `None` without any evidence
    pub fn ratio(&self) -> Option<f64> {
        let total = self.diff_domain + self.co_domain;
        if total == 0 {
            None
        } else {
            Some(self.diff_domain as f64 / total as f64)
        }
    }

    pub fn is_cannot_link(&self, ratio_threshold: f64, count_threshold: usize) -> bool {
        match self.ratio() {
            Some(ratio) => ratio >= ratio_threshold && self.diff_domain >= count_threshold,
            None => false,
        }
    }
}

/// Count domains where `w1` and `w2` share a topic versus domains where
/// they both appear, but never in the same topic.
pub fn count_cannot_link_support(w1: &str, w2: &str, prior: &PriorTopics) -> CannotLinkCounts {
    let mut counts = CannotLinkCounts::default();

    for domain_topics in prior.domain_groups() {
        let mut together = false;
        let mut seen1 = false;
        let mut seen2 = false;
        for topic in domain_topics {
            let has1 = topic.contains_word(w1);
            let has2 = topic.contains_word(w2);
            together |= has1 && has2;
            seen1 |= has1 && !has2;
            seen2 |= has2 && !has1;
        }
        if together {
            counts.co_domain += 1;
        } else if seen1 && seen2 {
            counts.diff_domain += 1;
        }
    }
    counts
}

///
/// Cannot-links among the current top words of each topic
///
/// * `top_words` - top word ids of each topic, highest probability first
/// * `vocab` - vocabulary of the word ids
/// * `prior` - prior topics providing the evidence
/// * `ratio_threshold` - minimum `diff / (diff + co)`
/// * `count_threshold` - minimum number of `diff` domains
///
pub fn extract_cannot_links(
    top_words: &[Vec<WordId>],
    vocab: &Vocabulary,
    prior: &PriorTopics,
    ratio_threshold: f64,
    count_threshold: usize,
) -> CannotLinks {
    let mut cannot_links = CannotLinks::new();

    for words in top_words {
        for (i, &w1) in words.iter().enumerate() {
            for &w2 in words[..i].iter() {
                if w1 == w2 {
                    continue;
                }
                let (s1, s2) = (vocab.word(w1), vocab.word(w2));
                if count_cannot_link_support(s1, s2, prior)
                    .is_cannot_link(ratio_threshold, count_threshold)
                {
                    cannot_links.add(CannotLink::new(s1, s2));
                }
            }
        }
    }
    cannot_links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::Topic;

    fn topic(domain: &str, words: &[&str]) -> Topic {
        Topic {
            domain: domain.into(),
            top_words: words.iter().map(|w| ((*w).into(), 0.1)).collect(),
        }
    }

    /// `n_diff` domains split "price" and "screen", then `n_co` domains
    /// put them in one topic
    fn split_prior(n_diff: usize, n_co: usize) -> anyhow::Result<PriorTopics> {
        let mut prior = PriorTopics::new();
        for d in 0..n_diff {
            let domain = format!("diff{}", d);
            prior.add_domain(vec![
                topic(&domain, &["price", "cost"]),
                topic(&domain, &["screen", "display"]),
            ])?;
        }
        for d in 0..n_co {
            let domain = format!("co{}", d);
            prior.add_domain(vec![topic(&domain, &["price", "screen"])])?;
        }
        Ok(prior)
    }

    #[test]
    fn test_cannot_link_thresholds() -> anyhow::Result<()> {
        let prior = split_prior(8, 2)?;
        let counts = count_cannot_link_support("price", "screen", &prior);
        assert_eq!(
            counts,
            CannotLinkCounts {
                co_domain: 2,
                diff_domain: 8
            }
        );
        approx::assert_abs_diff_eq!(counts.ratio().unwrap(), 0.8);
        assert!(counts.is_cannot_link(0.8, 8));
        assert!(!counts.is_cannot_link(0.8, 9));
        Ok(())
    }

    #[test]
    fn test_no_evidence_is_not_cannot_link() {
        let counts = CannotLinkCounts::default();
        assert_eq!(counts.ratio(), None);
        assert!(!counts.is_cannot_link(0.0, 0));
    }

    #[test]
    fn test_one_sided_domain_is_not_evidence() -> anyhow::Result<()> {
        let mut prior = PriorTopics::new();
        prior.add_domain(vec![topic("a", &["price", "cost"])])?;
        let counts = count_cannot_link_support("price", "screen", &prior);
        assert_eq!(counts, CannotLinkCounts::default());
        Ok(())
    }

    #[test]
    fn test_extract_cannot_links_from_top_words() -> anyhow::Result<()> {
        let prior = split_prior(3, 0)?;
        let vocab = Vocabulary::from_words(["price", "screen", "cost"])?;
        let top_words = vec![vec![0, 1, 2]];

        let links = extract_cannot_links(&top_words, &vocab, &prior, 0.8, 3);
        assert_eq!(links.len(), 2);
        assert!(links.contains(&WordPair::new("price", "screen")));
        assert!(links.contains(&WordPair::new("screen", "cost")));
        assert!(!links.contains(&WordPair::new("price", "cost")));
        Ok(())
    }

    #[test]
    fn test_must_links_only_within_vocabulary() -> anyhow::Result<()> {
        let mut prior = PriorTopics::new();
        for d in 0..5 {
            let domain = format!("d{}", d);
            prior.add_domain(vec![topic(&domain, &["battery", "life", "charger"])])?;
        }
        let vocab = Vocabulary::from_words(["battery", "life", "screen"])?;

        let params = ModelParams {
            uniform_minimum_support: 2,
            mis_percentage: 0.5,
            support_difference_constraint: 1.0,
            ..ModelParams::default()
        };
        let must_links = extract_must_links(&prior, &vocab, &params);

        assert_eq!(must_links.len(), 1);
        let link = must_links.iter().next().unwrap();
        assert_eq!(link.pair, WordPair::new("battery", "life"));
        approx::assert_abs_diff_eq!(link.weight, 5.0);
        for link in must_links.iter() {
            assert!(vocab.contains(link.pair.first()));
            assert!(vocab.contains(link.pair.second()));
        }
        Ok(())
    }
}
