use crate::topics::PriorTopics;
use crate::word_pair::WordPair;

use sorted_iter::assume::AssumeSortedByItemExt;
use sorted_iter::SortedIterator;
use std::collections::HashMap;

/// For every pair of top words, the prior topics where both words rank
#[derive(Debug, Default)]
pub struct TopicOverlapIndex {
    pair_topics: HashMap<WordPair, Vec<usize>>,
}

impl TopicOverlapIndex {
    pub fn new(prior: &PriorTopics) -> Self {
        let mut pair_topics: HashMap<WordPair, Vec<usize>> = HashMap::new();

        for (t, topic) in prior.iter().enumerate() {
            let words: Vec<&str> = topic.words().collect();
            for (i, &w1) in words.iter().enumerate() {
                for &w2 in words[..i].iter() {
                    if w1 == w2 {
                        continue;
                    }
                    let topics = pair_topics.entry(WordPair::new(w1, w2)).or_default();
                    // topics are visited in order
                    if topics.last() != Some(&t) {
                        topics.push(t);
                    }
                }
            }
        }

        TopicOverlapIndex { pair_topics }
    }

    /// Number of prior topics shared by the two pairs
    pub fn overlap_count(&self, a: &WordPair, b: &WordPair) -> usize {
        match (self.pair_topics.get(a), self.pair_topics.get(b)) {
            (Some(ta), Some(tb)) => ta
                .iter()
                .copied()
                .assume_sorted_by_item()
                .intersection(tb.iter().copied().assume_sorted_by_item())
                .count(),
            _ => 0,
        }
    }
}
