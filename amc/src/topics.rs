//! Prior topics: ranked top words of finished models, tagged by domain.

use crate::common::*;
use crate::corpus::Vocabulary;

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Ranked top words of one topic
#[derive(Debug, Clone)]
pub struct Topic {
    pub domain: Box<str>,
    /// (word, probability), highest probability first
    pub top_words: Vec<(Box<str>, f64)>,
}

impl Topic {
    pub fn contains_word(&self, word: &str) -> bool {
        self.top_words.iter().any(|(w, _)| w.as_ref() == word)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.top_words.iter().map(|(w, _)| w.as_ref())
    }

    /// One line: the top words separated by spaces
    pub fn to_line(&self) -> Box<str> {
        self.words().collect::<Vec<_>>().join(" ").into_boxed_str()
    }
}

/// Topics from several domains. Topics of one domain are always
/// contiguous.
#[derive(Debug, Clone, Default)]
pub struct PriorTopics {
    topics: Vec<Topic>,
}

impl PriorTopics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every topic of one domain.
    ///
    /// Fails if the topics come from more than one domain or the domain
    /// was added before.
    pub fn add_domain(&mut self, topics: Vec<Topic>) -> anyhow::Result<()> {
        let Some(domain) = topics.first().map(|t| t.domain.clone()) else {
            return Ok(());
        };

        if topics.iter().any(|t| t.domain != domain) {
            return Err(anyhow::anyhow!("mixed domains in topics of {}", domain));
        }
        if self.topics.iter().any(|t| t.domain == domain) {
            return Err(anyhow::anyhow!("domain {} already in prior topics", domain));
        }

        self.topics.extend(topics);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Topic> {
        self.topics.iter()
    }

    /// Topics grouped by domain
    pub fn domain_groups(&self) -> impl Iterator<Item = &[Topic]> {
        self.topics.chunk_by(|a, b| a.domain == b.domain)
    }

    pub fn num_domains(&self) -> usize {
        self.domain_groups().count()
    }
}

/// A word ranked by its probability in a min-heap
struct RankedWord {
    prob: f64,
    word: WordId,
}

impl PartialEq for RankedWord {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedWord {}

impl PartialOrd for RankedWord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedWord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.prob
            .total_cmp(&other.prob)
            .then_with(|| other.word.cmp(&self.word))
    }
}

///
/// Top `n` words of a probability vector, highest first.
///
/// Keeps a fixed-capacity min-heap: the first `n` words fill it, and a
/// later word replaces the current minimum only with a strictly higher
/// probability.
///
/// * `probs` - probability of each word id
/// * `n` - number of words to keep
///
pub fn top_words_by_probability<I>(probs: I, n: usize) -> Vec<(WordId, f64)>
where
    I: IntoIterator<Item = f64>,
{
    if n == 0 {
        return vec![];
    }

    let mut heap: BinaryHeap<Reverse<RankedWord>> = BinaryHeap::with_capacity(n + 1);

    for (word, prob) in probs.into_iter().enumerate() {
        if heap.len() < n {
            heap.push(Reverse(RankedWord { prob, word }));
        } else if let Some(Reverse(min)) = heap.peek() {
            if prob > min.prob {
                heap.pop();
                heap.push(Reverse(RankedWord { prob, word }));
            }
        }
    }

    // ascending by Reverse == descending by probability
    heap.into_sorted_vec()
        .into_iter()
        .map(|Reverse(x)| (x.word, x.prob))
        .collect()
}

/// Top words of every row of a topic x word distribution as prior topics
///
/// * `domain` - domain tag of the new topics
/// * `topic_word` - T x V probabilities
/// * `vocab` - vocabulary of the columns
/// * `n` - number of top words per topic
pub fn topics_from_distribution(
    domain: &str,
    topic_word: &Mat,
    vocab: &Vocabulary,
    n: usize,
) -> Vec<Topic> {
    topic_word
        .row_iter()
        .map(|row| Topic {
            domain: domain.into(),
            top_words: top_words_by_probability(row.iter().copied(), n)
                .into_iter()
                .map(|(w, p)| (vocab.word(w).into(), p))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(domain: &str, words: &[&str]) -> Topic {
        Topic {
            domain: domain.into(),
            top_words: words.iter().map(|w| ((*w).into(), 0.1)).collect(),
        }
    }

    #[test]
    fn test_top_words_descending() {
        let probs = vec![0.1, 0.4, 0.05, 0.3, 0.15];
        let top = top_words_by_probability(probs, 3);
        let words: Vec<WordId> = top.iter().map(|x| x.0).collect();
        assert_eq!(words, vec![1, 3, 4]);
        approx::assert_abs_diff_eq!(top[0].1, 0.4);
    }

    #[test]
    fn test_top_words_ties_keep_first_seen() {
        let probs = vec![0.2, 0.2, 0.2, 0.2];
        let top = top_words_by_probability(probs, 2);
        let mut words: Vec<WordId> = top.iter().map(|x| x.0).collect();
        words.sort_unstable();
        assert_eq!(words, vec![0, 1]);
    }

    #[test]
    fn test_top_words_short_row() {
        assert_eq!(top_words_by_probability(vec![0.5, 0.5], 5).len(), 2);
        assert!(top_words_by_probability(vec![0.5, 0.5], 0).is_empty());
    }

    #[test]
    fn test_domain_groups_contiguous() -> anyhow::Result<()> {
        let mut prior = PriorTopics::new();
        prior.add_domain(vec![topic("a", &["x"]), topic("a", &["y"])])?;
        prior.add_domain(vec![topic("b", &["x", "z"])])?;

        let sizes: Vec<usize> = prior.domain_groups().map(|g| g.len()).collect();
        assert_eq!(sizes, vec![2, 1]);
        assert_eq!(prior.num_domains(), 2);

        assert!(prior.add_domain(vec![topic("a", &["w"])]).is_err());
        assert!(prior
            .add_domain(vec![topic("c", &["w"]), topic("d", &["w"])])
            .is_err());
        Ok(())
    }

    #[test]
    fn test_topics_from_distribution() -> anyhow::Result<()> {
        let vocab = Vocabulary::from_words(["screen", "battery", "price"])?;
        let phi = Mat::from_row_slice(2, 3, &[0.7, 0.2, 0.1, 0.1, 0.3, 0.6]);
        let topics = topics_from_distribution("phone", &phi, &vocab, 2);
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].to_line().as_ref(), "screen battery");
        assert_eq!(topics[1].to_line().as_ref(), "price battery");
        assert!(topics[1].contains_word("battery"));
        assert!(!topics[1].contains_word("screen"));
        Ok(())
    }
}
