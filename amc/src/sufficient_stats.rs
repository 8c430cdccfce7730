//! Sufficient statistics of the collapsed topic model sampler.
//!
//! Counts are `f64` since must-link promotions add fractional
//! pseudo-counts to the topic-word table.

use crate::common::*;

#[derive(Debug, Clone, PartialEq)]
pub struct SufficientStats {
    pub n_docs: usize,
    pub n_topics: usize,
    pub n_words: usize,
    pub alpha: f64,
    pub beta: f64,
    /// D×T, flattened row-major: `doc_topic[d * n_topics + t]`
    pub doc_topic: Vec<f64>,
    /// occurrences per document
    pub doc_total: Vec<f64>,
    /// T×V, flattened row-major: `topic_word[t * n_words + w]`
    pub topic_word: Vec<f64>,
    /// sum of each row of `topic_word`
    pub topic_total: Vec<f64>,
}

impl SufficientStats {
    pub fn new(n_docs: usize, n_topics: usize, n_words: usize, alpha: f64, beta: f64) -> Self {
        SufficientStats {
            n_docs,
            n_topics,
            n_words,
            alpha,
            beta,
            doc_topic: vec![0.0; n_docs * n_topics],
            doc_total: vec![0.0; n_docs],
            topic_word: vec![0.0; n_topics * n_words],
            topic_total: vec![0.0; n_topics],
        }
    }

    #[inline]
    pub fn add_doc(&mut self, d: DocId, t: TopicId, amount: f64) {
        self.doc_topic[d * self.n_topics + t] += amount;
        self.doc_total[d] += amount;
    }

    #[inline]
    pub fn add_word(&mut self, t: TopicId, w: WordId, amount: f64) {
        self.topic_word[t * self.n_words + w] += amount;
        self.topic_total[t] += amount;
    }

    /// `(n_tw + β) / (n_t + Vβ)`
    #[inline]
    pub fn word_prob(&self, t: TopicId, w: WordId) -> f64 {
        (self.topic_word[t * self.n_words + w] + self.beta)
            / (self.topic_total[t] + self.n_words as f64 * self.beta)
    }

    /// `(n_dt + α) / (n_d + Tα)`
    #[inline]
    pub fn doc_prob(&self, d: DocId, t: TopicId) -> f64 {
        (self.doc_topic[d * self.n_topics + t] + self.alpha)
            / (self.doc_total[d] + self.n_topics as f64 * self.alpha)
    }

    /// Unnormalized probability of word `w` in document `d` under topic `t`
    #[inline]
    pub fn base_weight(&self, d: DocId, t: TopicId, w: WordId) -> f64 {
        self.doc_prob(d, t) * self.word_prob(t, w)
    }

    /// φ (T×V) from the current counts
    pub fn topic_word_point_estimate(&self) -> Mat {
        Mat::from_fn(self.n_topics, self.n_words, |t, w| self.word_prob(t, w))
    }

    /// θ (D×T) from the current counts
    pub fn doc_topic_point_estimate(&self) -> Mat {
        Mat::from_fn(self.n_docs, self.n_topics, |d, t| self.doc_prob(d, t))
    }

    /// Largest absolute difference between the count tables
    pub fn max_abs_diff(&self, other: &SufficientStats) -> f64 {
        let tables = [
            (&self.doc_topic, &other.doc_topic),
            (&self.doc_total, &other.doc_total),
            (&self.topic_word, &other.topic_word),
            (&self.topic_total, &other.topic_total),
        ];
        tables
            .iter()
            .flat_map(|(a, b)| a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()))
            .fold(0.0, f64::max)
    }
}
