//! Knowledge-augmented collapsed Gibbs sampler (AMC).
//!
//! The plain sampler draws each occurrence's topic from
//!
//! ```text
//! P(t) ∝ (n_dt + α) / (n_d + Tα) · (n_tw + β) / (n_t + Vβ)
//! ```
//!
//! Must-links bias the topic-word counts through a generalized Pólya urn:
//! placing word `w` under topic `t` also adds `lambda` pseudo-counts of
//! the words must-linked with `w`. Cannot-links push apart: after a word
//! lands in a topic, one occurrence of each cannot-linked word in that
//! topic is moved to a topic that suits it better.
//!
//! With knowledge switched off this is the plain LDA sampler, which also
//! provides the prior topics and the initial state for AMC.
//!
//! # References
//!
//! Chen & Liu (2014). "Mining topics in documents: standing on the
//! shoulders of big data." KDD 2014.

use crate::cannot_links::CannotLinks;
use crate::common::*;
use crate::corpus::Corpus;
use crate::knowledge_extraction::{extract_cannot_links, extract_must_links};
use crate::must_link_graph::MustLinkGraph;
use crate::must_links::MustLinks;
use crate::occurrences::OccurrenceIndex;
use crate::params::ModelParams;
use crate::sampling::draw_index;
use crate::sufficient_stats::SufficientStats;
use crate::topics::{top_words_by_probability, topics_from_distribution, PriorTopics, Topic};
use crate::urn_log::{UrnEntry, UrnLog};

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Running sums of θ and φ over posterior samples
struct PosteriorSum {
    doc_topic: Mat,
    topic_word: Mat,
    n_stats: usize,
}

/// Result of a finished chain
#[derive(Debug, Clone)]
pub struct FittedModel {
    pub params: ModelParams,
    /// final topic of every occurrence
    pub z: Vec<Vec<TopicId>>,
    /// φ, T×V
    pub topic_word: Mat,
    /// θ, D×T
    pub doc_topic: Mat,
    pub must_links: MustLinks,
    pub cannot_links: CannotLinks,
}

impl FittedModel {
    /// Top `n` words of each topic as prior topics of `corpus.domain`
    pub fn top_words(&self, corpus: &Corpus, n: usize) -> Vec<Topic> {
        topics_from_distribution(&corpus.domain, &self.topic_word, &corpus.vocab, n)
    }
}

pub struct TopicModel<'a> {
    corpus: &'a Corpus,
    params: ModelParams,
    prior: Option<&'a PriorTopics>,
    rng: SmallRng,

    z: Vec<Vec<TopicId>>,
    stats: SufficientStats,
    occurrences: OccurrenceIndex,
    urn_log: UrnLog,

    must_links: MustLinks,
    graph: MustLinkGraph,
    cannot_links: CannotLinks,
    /// cannot-linked words of each word id
    cannot_partners: Vec<Vec<WordId>>,

    posterior: PosteriorSum,
    /// scratch space for per-topic weights
    weights: Vec<f64>,
}

impl<'a> TopicModel<'a> {
    ///
    /// Plain LDA: no knowledge, random initial topics.
    ///
    /// * `corpus` - documents to model
    /// * `params` - sampler settings; `domain`, D and V are taken from
    ///   `corpus`
    ///
    pub fn lda(corpus: &'a Corpus, params: &ModelParams) -> anyhow::Result<Self> {
        let mut params = params.for_corpus("LDA", corpus);
        params.use_must_links = false;
        params.use_cannot_links = false;
        params.validate()?;

        let graph = MustLinkGraph::empty(corpus.num_words());
        let mut ret = Self::allocate(corpus, params, None, MustLinks::new(), graph);
        ret.initialize_randomly();
        Ok(ret)
    }

    ///
    /// AMC: mine must-links from `prior`, build the must-link graph and
    /// start the chain from `init_z` (usually the LDA assignments on the
    /// same corpus) or from random topics.
    ///
    /// * `corpus` - documents to model
    /// * `params` - sampler and knowledge settings
    /// * `prior` - topics of other domains
    /// * `init_z` - initial topic of every occurrence
    ///
    pub fn amc(
        corpus: &'a Corpus,
        params: &ModelParams,
        prior: &'a PriorTopics,
        init_z: Option<&[Vec<TopicId>]>,
    ) -> anyhow::Result<Self> {
        let params = params.for_corpus("AMC", corpus);
        let must_links = if params.use_must_links {
            extract_must_links(prior, &corpus.vocab, &params)
        } else {
            MustLinks::new()
        };
        Self::with_must_links(corpus, &params, prior, must_links, init_z)
    }

    /// AMC with given must-links
    pub fn with_must_links(
        corpus: &'a Corpus,
        params: &ModelParams,
        prior: &'a PriorTopics,
        must_links: MustLinks,
        init_z: Option<&[Vec<TopicId>]>,
    ) -> anyhow::Result<Self> {
        let params = params.for_corpus(&params.model_name, corpus);
        params.validate()?;

        if must_links.is_empty() && params.use_must_links {
            warn!("{}: no must-link was found", corpus.domain);
        }

        let graph = MustLinkGraph::build(
            &must_links,
            corpus,
            prior,
            params.must_link_graph_cut_ratio,
            params.pmi_to_lambda_scale,
        )?;

        info!(
            "{}: {} must-links over {} prior topics from {} domains",
            corpus.domain,
            must_links.len(),
            prior.len(),
            prior.num_domains()
        );

        let mut ret = Self::allocate(corpus, params, Some(prior), must_links, graph);
        match init_z {
            Some(z) => ret.initialize_from(z)?,
            None => ret.initialize_randomly(),
        }
        Ok(ret)
    }

    fn allocate(
        corpus: &'a Corpus,
        params: ModelParams,
        prior: Option<&'a PriorTopics>,
        must_links: MustLinks,
        graph: MustLinkGraph,
    ) -> Self {
        let (nd, nt, nw) = (corpus.num_docs(), params.n_topics, corpus.num_words());
        TopicModel {
            corpus,
            rng: SmallRng::seed_from_u64(params.random_seed),
            prior,
            z: corpus.docs.iter().map(|doc| vec![0; doc.len()]).collect(),
            stats: SufficientStats::new(nd, nt, nw, params.alpha, params.beta),
            occurrences: OccurrenceIndex::new(&corpus.docs, nt, nw),
            urn_log: UrnLog::new(&corpus.docs),
            must_links,
            graph,
            cannot_links: CannotLinks::new(),
            cannot_partners: vec![vec![]; nw],
            posterior: PosteriorSum {
                doc_topic: Mat::zeros(nd, nt),
                topic_word: Mat::zeros(nt, nw),
                n_stats: 0,
            },
            weights: vec![0.0; nt],
            params,
        }
    }

    fn initialize_randomly(&mut self) {
        let nt = self.params.n_topics;
        for d in 0..self.corpus.num_docs() {
            for n in 0..self.corpus.docs[d].len() {
                let t = self.rng.random_range(0..nt);
                self.z[d][n] = t;
                self.increment(d, n, t);
            }
        }
    }

    fn initialize_from(&mut self, init_z: &[Vec<TopicId>]) -> anyhow::Result<()> {
        let docs = &self.corpus.docs;
        if init_z.len() != docs.len()
            || init_z.iter().zip(docs).any(|(z, doc)| z.len() != doc.len())
        {
            return Err(anyhow::anyhow!(
                "{}: initial topic assignments do not match the documents",
                self.corpus.domain
            ));
        }
        if let Some(&t) = init_z.iter().flatten().find(|&&t| t >= self.params.n_topics) {
            return Err(anyhow::anyhow!(
                "{}: initial topic {} out of range 0..{}",
                self.corpus.domain,
                t,
                self.params.n_topics
            ));
        }

        for (d, zd) in init_z.iter().enumerate() {
            for (n, &t) in zd.iter().enumerate() {
                self.z[d][n] = t;
                self.increment(d, n, t);
            }
        }
        Ok(())
    }

    /// Place the occurrence `(d, n)` under topic `t`
    fn increment(&mut self, d: DocId, n: usize, t: TopicId) {
        let w = self.corpus.docs[d][n];
        self.stats.add_doc(d, t, 1.0);

        let candidates = self.graph.links_with_word(w);
        if !candidates.is_empty() {
            let link_weights: Vec<f64> = candidates
                .iter()
                .map(|&i| {
                    let (w1, w2) = self.graph.node(i).words;
                    self.stats.word_prob(t, w1) * self.stats.word_prob(t, w2)
                })
                .collect();
            let sampled = candidates[draw_index(&link_weights, &mut self.rng)];

            let mut applied = vec![];
            for &j in self.graph.neighbours(sampled) {
                let node = self.graph.node(j);
                if node.contains(w) {
                    let other = node.other(w);
                    self.stats.add_word(t, other, node.lambda);
                    applied.push(UrnEntry {
                        word: other,
                        amount: node.lambda,
                    });
                }
            }
            self.urn_log.record(d, n, applied);
        }

        self.stats.add_word(t, w, 1.0);
        self.occurrences.insert(w, d, n, t);
    }

    /// Remove the occurrence `(d, n)` from topic `t`, subtracting the
    /// promotions its placement applied as logged. Counts are `f64`, so the
    /// restored values match the ones before the placement up to rounding
    /// (`x + lambda - lambda` need not equal `x` in the last bits).
    fn decrement(&mut self, d: DocId, n: usize, t: TopicId) {
        let w = self.corpus.docs[d][n];
        self.stats.add_doc(d, t, -1.0);

        for entry in self.urn_log.take(d, n) {
            self.stats.add_word(t, entry.word, -entry.amount);
        }

        self.stats.add_word(t, w, -1.0);
        self.occurrences.remove(w, d, n, t);
    }

    ///
    /// Resample the topic of occurrence `(d, n)`.
    ///
    /// * `transfer` - move cannot-linked words out of the new topic
    /// * `allowed` - if given, only these topics can be drawn
    ///
    pub fn sample_topic_assignment(
        &mut self,
        d: DocId,
        n: usize,
        transfer: bool,
        allowed: Option<&[TopicId]>,
    ) {
        let old_t = self.z[d][n];
        let w = self.corpus.docs[d][n];
        self.decrement(d, n, old_t);

        for t in 0..self.params.n_topics {
            self.weights[t] = match allowed {
                Some(topics) if !topics.contains(&t) => 0.0,
                _ => self.stats.base_weight(d, t, w),
            };
        }
        let new_t = draw_index(&self.weights, &mut self.rng);

        self.z[d][n] = new_t;
        self.increment(d, n, new_t);

        if transfer && !self.cannot_links.is_empty() {
            self.transfer_cannot_linked(w, new_t);
        }
    }

    /// Move one occurrence of each word cannot-linked with `w` out of
    /// `topic`, into a topic where that word is more probable
    fn transfer_cannot_linked(&mut self, w: WordId, topic: TopicId) {
        if self.cannot_partners[w].is_empty() {
            return;
        }
        let partners = self.cannot_partners[w].clone();

        for w2 in partners {
            let group = self.occurrences.group(topic, w2);
            if group.is_empty() {
                continue;
            }
            let occ_weights: Vec<f64> = group
                .iter()
                .map(|&(d2, n2)| self.stats.base_weight(d2, self.z[d2][n2], w2))
                .collect();
            let (d2, n2) = group[draw_index(&occ_weights, &mut self.rng)];
            assert_eq!(
                self.z[d2][n2], topic,
                "cannot-linked occurrence ({}, {}) is not under topic {}",
                d2, n2, topic
            );

            let higher = self.topics_with_higher_word_prob(topic, w2);
            if !higher.is_empty() {
                self.sample_topic_assignment(d2, n2, false, Some(&higher));
                assert_ne!(
                    self.z[d2][n2], topic,
                    "transferred occurrence ({}, {}) stayed in topic {}",
                    d2, n2, topic
                );
            }
        }
    }

    /// Topics where `w` is strictly more probable than under `topic`
    fn topics_with_higher_word_prob(&self, topic: TopicId, w: WordId) -> Vec<TopicId> {
        let current = self.stats.word_prob(topic, w);
        (0..self.params.n_topics)
            .filter(|&t| t != topic && self.stats.word_prob(t, w) > current)
            .collect()
    }

    /// One pass over every occurrence
    pub fn sweep(&mut self, transfer: bool) {
        for d in 0..self.corpus.num_docs() {
            for n in 0..self.corpus.docs[d].len() {
                self.sample_topic_assignment(d, n, transfer, None);
            }
        }
    }

    /// Add cannot-links; returns how many were new
    pub fn add_cannot_links(&mut self, links: CannotLinks) -> usize {
        let added = self.cannot_links.merge(links);
        for link in added.iter() {
            let vocab = &self.corpus.vocab;
            match (vocab.id(link.pair.first()), vocab.id(link.pair.second())) {
                (Some(w1), Some(w2)) => {
                    self.cannot_partners[w1].push(w2);
                    self.cannot_partners[w2].push(w1);
                }
                _ => warn!("cannot-link {} outside the vocabulary", link.pair),
            }
        }
        added.len()
    }

    /// Re-mine cannot-links among the current top words of each topic
    fn mine_cannot_links(&mut self) {
        let Some(prior) = self.prior else {
            return;
        };

        let phi = self.stats.topic_word_point_estimate();
        let top_words: Vec<Vec<WordId>> = phi
            .row_iter()
            .map(|row| {
                let n_top = self.params.n_top_words_for_knowledge;
                top_words_by_probability(row.iter().copied(), n_top)
                    .into_iter()
                    .map(|(w, _)| w)
                    .collect()
            })
            .collect();

        let mined = extract_cannot_links(
            &top_words,
            &self.corpus.vocab,
            prior,
            self.params.cannot_link_support_ratio,
            self.params.cannot_link_support_threshold,
        );
        let n_mined = mined.len();
        let n_new = self.add_cannot_links(mined);
        info!(
            "{}: {} cannot-links mined, {} new, {} in total",
            self.corpus.domain,
            n_mined,
            n_new,
            self.cannot_links.len()
        );
    }

    fn accumulate_posterior(&mut self) {
        self.posterior.doc_topic += self.stats.doc_topic_point_estimate();
        self.posterior.topic_word += self.stats.topic_word_point_estimate();
        self.posterior.n_stats += 1;
    }

    /// Averaged posterior samples, or the current state without any
    fn posterior_estimates(&self) -> (Mat, Mat) {
        let n = self.posterior.n_stats;
        if n > 0 {
            (
                &self.posterior.topic_word / n as f64,
                &self.posterior.doc_topic / n as f64,
            )
        } else {
            (
                self.stats.topic_word_point_estimate(),
                self.stats.doc_topic_point_estimate(),
            )
        }
    }

    fn new_progress_bar(&self, n_sweeps: usize) -> ProgressBar {
        if !log::log_enabled!(log::Level::Info) {
            return ProgressBar::hidden();
        }
        let template = format!(
            "{} {} {{bar:40}} {{pos}}/{{len}} sweeps ({{eta}})",
            self.params.model_name, self.corpus.domain
        );
        let pb = ProgressBar::new(n_sweeps as u64);
        match ProgressStyle::with_template(&template) {
            Ok(style) => pb.with_style(style.progress_chars("##-")),
            Err(_) => pb,
        }
    }

    /// Sweep `i` of the chain: resample every occurrence, then re-mine
    /// cannot-links and take a posterior sample when due
    fn step(&mut self, i: usize) {
        let burnin = self.params.n_burnin;
        self.sweep(i >= burnin);

        let mine = self.params.use_cannot_links && self.prior.is_some();
        if mine && i > 0 && i % self.params.cannot_link_mining_interval == 0 && i >= burnin {
            self.mine_cannot_links();
        }

        if let Some(lag) = self.params.lag() {
            if i >= burnin && i % lag == 0 {
                self.accumulate_posterior();
            }
        }
    }

    /// Run the chain and compute the posterior distributions
    pub fn run(mut self) -> FittedModel {
        let n_sweeps = self.params.total_sweeps();

        info!(
            "{} {}: D={} V={} T={}, {} sweeps",
            self.params.model_name,
            self.corpus.domain,
            self.corpus.num_docs(),
            self.corpus.num_words(),
            self.params.n_topics,
            n_sweeps
        );

        let pb = self.new_progress_bar(n_sweeps);
        for i in 0..n_sweeps {
            self.step(i);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let (topic_word, doc_topic) = self.posterior_estimates();
        FittedModel {
            params: self.params,
            z: self.z,
            topic_word,
            doc_topic,
            must_links: self.must_links,
            cannot_links: self.cannot_links,
        }
    }
}
