//! Must-link graph with generalized Pólya urn (GPU) weights.
//!
//! Nodes are must-links. Two must-links are connected when they share a
//! word and co-occur in enough prior topics; every node is connected to
//! itself. A node's `lambda` is the pseudo-count promoted to the other
//! word when one of its words is drawn.

use crate::common::*;
use crate::corpus::Corpus;
use crate::must_links::MustLinks;
use crate::topic_overlap::TopicOverlapIndex;
use crate::topics::PriorTopics;
use crate::word_pair::WordPair;

///
/// GPU promotion weight from document co-occurrence:
///
/// ```text
/// PMI    = ln( P(w1, w2) / (P(w1) P(w2)) ),  P(.) = (df(.) + 1) / D
/// lambda = max(0, scale * PMI)
/// ```
///
/// * `co_doc_freq` - documents containing both words
/// * `doc_freq1` - documents containing the first word
/// * `doc_freq2` - documents containing the second word
/// * `n_docs` - number of documents
/// * `scale` - PMI to lambda scale
///
pub fn gpu_lambda(
    co_doc_freq: usize,
    doc_freq1: usize,
    doc_freq2: usize,
    n_docs: usize,
    scale: f64,
) -> f64 {
    let n = n_docs as f64;
    let pxy = (co_doc_freq + 1) as f64 / n;
    let px = (doc_freq1 + 1) as f64 / n;
    let py = (doc_freq2 + 1) as f64 / n;
    let lambda = scale * (pxy / (px * py)).ln();
    if lambda > 0.0 {
        lambda
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct MustLinkNode {
    pub pair: WordPair,
    /// word ids of `pair.first()` and `pair.second()`
    pub words: (WordId, WordId),
    /// mining support
    pub weight: f64,
    pub lambda: f64,
}

impl MustLinkNode {
    pub fn contains(&self, w: WordId) -> bool {
        self.words.0 == w || self.words.1 == w
    }

    /// The other word of a node containing `w`
    pub fn other(&self, w: WordId) -> WordId {
        debug_assert!(self.contains(w));
        if self.words.0 == w {
            self.words.1
        } else {
            self.words.0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MustLinkGraph {
    nodes: Vec<MustLinkNode>,
    neighbours: Vec<Vec<usize>>,
    by_word: Vec<Vec<usize>>,
}

impl MustLinkGraph {
    /// A graph without must-links over `n_words` words
    pub fn empty(n_words: usize) -> Self {
        MustLinkGraph {
            nodes: vec![],
            neighbours: vec![],
            by_word: vec![vec![]; n_words],
        }
    }

    ///
    /// Build the graph. O(M^2) over the must-links.
    ///
    /// * `must_links` - must-links over words of `corpus`
    /// * `corpus` - document frequencies for the GPU weights
    /// * `prior` - prior topics the must-links were mined from
    /// * `cut_ratio` - minimum `overlap / max(weight_i, weight_j)` for an edge
    /// * `pmi_scale` - PMI to lambda scale
    ///
    pub fn build(
        must_links: &MustLinks,
        corpus: &Corpus,
        prior: &PriorTopics,
        cut_ratio: f64,
        pmi_scale: f64,
    ) -> anyhow::Result<Self> {
        let n_words = corpus.num_words();
        let n_docs = corpus.num_docs();
        let mut ret = Self::empty(n_words);

        for link in must_links.iter() {
            let word_id = |w: &str| {
                corpus.vocab.id(w).ok_or(anyhow::anyhow!(
                    "must-link word {} not in the vocabulary of {}",
                    w,
                    corpus.domain
                ))
            };
            let w1 = word_id(link.pair.first())?;
            let w2 = word_id(link.pair.second())?;

            let lambda = if w1 == w2 {
                0.0
            } else {
                gpu_lambda(
                    corpus.co_document_frequency(w1, w2),
                    corpus.document_frequency(w1),
                    corpus.document_frequency(w2),
                    n_docs,
                    pmi_scale,
                )
            };

            let idx = ret.nodes.len();
            ret.by_word[w1].push(idx);
            if w2 != w1 {
                ret.by_word[w2].push(idx);
            }
            ret.nodes.push(MustLinkNode {
                pair: link.pair.clone(),
                words: (w1, w2),
                weight: link.weight,
                lambda,
            });
        }

        let overlap = TopicOverlapIndex::new(prior);
        let m = ret.nodes.len();
        ret.neighbours = vec![vec![]; m];

        let mut n_edges = 0;
        for i in 0..m {
            ret.neighbours[i].push(i);
            for j in (i + 1)..m {
                let (ni, nj) = (&ret.nodes[i], &ret.nodes[j]);
                if !ni.pair.shares_word(&nj.pair) {
                    continue;
                }
                let count = overlap.overlap_count(&ni.pair, &nj.pair);
                let ratio = count as f64 / ni.weight.max(nj.weight);
                if ratio > cut_ratio {
                    ret.neighbours[i].push(j);
                    ret.neighbours[j].push(i);
                    n_edges += 1;
                }
            }
        }

        debug!(
            "{}: must-link graph with {} nodes and {} edges",
            corpus.domain, m, n_edges
        );
        Ok(ret)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, i: usize) -> &MustLinkNode {
        &self.nodes[i]
    }

    /// Neighbours of node `i`, itself included
    pub fn neighbours(&self, i: usize) -> &[usize] {
        &self.neighbours[i]
    }

    /// Nodes containing word `w`
    pub fn links_with_word(&self, w: WordId) -> &[usize] {
        &self.by_word[w]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::must_links::MustLink;
    use crate::topics::Topic;

    #[test]
    fn test_gpu_lambda_non_negative() {
        // always together: positive PMI
        let lambda = gpu_lambda(5, 5, 5, 20, 0.5);
        approx::assert_abs_diff_eq!(lambda, 0.5 * (6.0_f64 * 20.0 / 36.0).ln(), epsilon = 1e-12);
        assert!(lambda > 0.0);

        // never together: negative PMI
        assert_eq!(gpu_lambda(0, 10, 10, 20, 0.5), 0.0);

        for co in 0..=10 {
            assert!(gpu_lambda(co, 10, 15, 30, 2.0) >= 0.0);
        }
    }

    fn topic(domain: &str, words: &[&str]) -> Topic {
        Topic {
            domain: domain.into(),
            top_words: words.iter().map(|w| ((*w).into(), 0.1)).collect(),
        }
    }

    #[test]
    fn test_graph_edges_and_self_loops() -> anyhow::Result<()> {
        let corpus = Corpus::from_tokens(
            "phone",
            &[
                vec!["battery", "life", "charge"],
                vec!["battery", "life"],
                vec!["screen", "size"],
                vec!["battery", "charge"],
            ],
        )?;

        let mut prior = PriorTopics::new();
        prior.add_domain(vec![
            topic("a", &["battery", "life", "charge"]),
            topic("a", &["screen", "size"]),
        ])?;
        prior.add_domain(vec![topic("b", &["battery", "life"])])?;

        let mut must_links = MustLinks::new();
        for (a, b, w) in [
            ("battery", "life", 2.0),
            ("battery", "charge", 1.0),
            ("screen", "size", 1.0),
        ] {
            must_links.add(MustLink {
                pair: WordPair::new(a, b),
                weight: w,
            });
        }

        // overlap(battery-life, battery-charge) = 1, 1 / max(2, 1) = 0.5
        let graph = MustLinkGraph::build(&must_links, &corpus, &prior, 0.17, 0.5)?;
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.neighbours(0), &[0, 1]);
        assert_eq!(graph.neighbours(1), &[0, 1]);
        assert_eq!(graph.neighbours(2), &[2]);

        let strict = MustLinkGraph::build(&must_links, &corpus, &prior, 0.5, 0.5)?;
        assert_eq!(strict.neighbours(0), &[0]);

        let battery = corpus.vocab.id("battery").unwrap();
        assert_eq!(graph.links_with_word(battery), &[0, 1]);
        assert!(graph.node(0).lambda >= 0.0);
        Ok(())
    }
}
