//! Model parameters and their `key=value` file format.
//!
//! Every field is listed once in a static name -> (setter, getter) table,
//! which is what the parameter file reader and writer walk through.

use crate::common::*;
use crate::common_io::{read_lines, write_lines};
use crate::corpus::Corpus;

pub const DEFAULT_RANDOM_SEED: u64 = 837191;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    pub model_name: Box<str>,
    pub domain: Box<str>,

    /// number of documents
    pub n_docs: usize,
    /// vocabulary size
    pub n_words: usize,
    pub n_topics: usize,

    pub n_burnin: usize,
    pub n_iterations: usize,
    /// sweeps between posterior samples; `<= 0` keeps only the final state
    pub sample_lag: i64,

    pub alpha: f64,
    pub beta: f64,
    pub random_seed: u64,

    /// top words per topic written out
    pub twords: usize,

    /// top words per prior topic used to mine knowledge
    pub n_top_words_for_knowledge: usize,

    pub uniform_minimum_support: usize,
    pub mis_percentage: f64,
    pub support_difference_constraint: f64,

    pub use_must_links: bool,
    pub must_link_graph_cut_ratio: f64,
    pub pmi_to_lambda_scale: f64,

    pub use_cannot_links: bool,
    pub cannot_link_learning_iterations: usize,
    pub cannot_link_mining_interval: usize,
    pub cannot_link_support_ratio: f64,
    pub cannot_link_support_threshold: usize,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            model_name: "AMC".into(),
            domain: "".into(),
            n_docs: 0,
            n_words: 0,
            n_topics: 15,
            n_burnin: 200,
            n_iterations: 2000,
            sample_lag: 20,
            alpha: 1.0,
            beta: 0.1,
            random_seed: DEFAULT_RANDOM_SEED,
            twords: 20,
            n_top_words_for_knowledge: 15,
            uniform_minimum_support: 4,
            mis_percentage: 0.35,
            support_difference_constraint: 0.08,
            use_must_links: true,
            must_link_graph_cut_ratio: 0.17,
            pmi_to_lambda_scale: 0.5,
            use_cannot_links: true,
            cannot_link_learning_iterations: 3,
            cannot_link_mining_interval: 2000,
            cannot_link_support_ratio: 0.8,
            cannot_link_support_threshold: 10,
        }
    }
}

trait ParamValue: Sized {
    fn parse_param(s: &str) -> anyhow::Result<Self>;
}

macro_rules! parse_with_from_str {
    ($($t:ty),*) => {
        $(impl ParamValue for $t {
            fn parse_param(s: &str) -> anyhow::Result<Self> {
                s.trim()
                    .parse::<$t>()
                    .map_err(|e| anyhow::anyhow!("`{}`: {}", s, e))
            }
        })*
    };
}

parse_with_from_str!(usize, i64, u64, f64, bool);

impl ParamValue for Box<str> {
    fn parse_param(s: &str) -> anyhow::Result<Self> {
        Ok(s.trim().into())
    }
}

struct ParamField {
    name: &'static str,
    set: fn(&mut ModelParams, &str) -> anyhow::Result<()>,
    get: fn(&ModelParams) -> String,
}

macro_rules! param_fields {
    ($($field:ident),* $(,)?) => {
        const PARAM_FIELDS: &[ParamField] = &[
            $(ParamField {
                name: stringify!($field),
                set: |p: &mut ModelParams, v: &str| -> anyhow::Result<()> {
                    p.$field = ParamValue::parse_param(v)?;
                    Ok(())
                },
                get: |p: &ModelParams| -> String { p.$field.to_string() },
            },)*
        ];
    };
}

param_fields!(
    model_name,
    domain,
    n_docs,
    n_words,
    n_topics,
    n_burnin,
    n_iterations,
    sample_lag,
    alpha,
    beta,
    random_seed,
    twords,
    n_top_words_for_knowledge,
    uniform_minimum_support,
    mis_percentage,
    support_difference_constraint,
    use_must_links,
    must_link_graph_cut_ratio,
    pmi_to_lambda_scale,
    use_cannot_links,
    cannot_link_learning_iterations,
    cannot_link_mining_interval,
    cannot_link_support_ratio,
    cannot_link_support_threshold,
);

impl ModelParams {
    /// Copy of these parameters for a model on `corpus`
    pub fn for_corpus(&self, model_name: &str, corpus: &Corpus) -> Self {
        ModelParams {
            model_name: model_name.into(),
            domain: corpus.domain.clone(),
            n_docs: corpus.num_docs(),
            n_words: corpus.num_words(),
            ..self.clone()
        }
    }

    /// Set one field by its name
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let field = PARAM_FIELDS
            .iter()
            .find(|f| f.name == key)
            .ok_or(anyhow::anyhow!("unknown parameter: {}", key))?;
        (field.set)(self, value).map_err(|e| anyhow::anyhow!("parameter {}: {}", key, e))
    }

    /// Read one field by its name
    pub fn get(&self, key: &str) -> Option<String> {
        PARAM_FIELDS
            .iter()
            .find(|f| f.name == key)
            .map(|f| (f.get)(self))
    }

    /// `key=value` lines for every field
    pub fn to_lines(&self) -> Vec<Box<str>> {
        PARAM_FIELDS
            .iter()
            .map(|f| format!("{}={}", f.name, (f.get)(self)).into_boxed_str())
            .collect()
    }

    /// Update from `key=value` lines over the current values. Blank lines
    /// and `#` comments are skipped; unknown keys are ignored with a warning.
    pub fn update_from_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> anyhow::Result<()> {
        for (i, line) in lines.iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or(anyhow::anyhow!("line {}: expected key=value, found `{}`", i + 1, line))?;
            let key = key.trim();

            if PARAM_FIELDS.iter().any(|f| f.name == key) {
                self.set(key, value)?;
            } else {
                warn!("ignoring unknown parameter `{}` (line {})", key, i + 1);
            }
        }
        Ok(())
    }

    /// Read a parameter file on top of the defaults
    pub fn from_file(param_file: &str) -> anyhow::Result<Self> {
        let mut ret = ModelParams::default();
        let lines = read_lines(param_file)?;
        ret.update_from_lines(&lines)
            .map_err(|e| anyhow::anyhow!("{}: {}", param_file, e))?;
        Ok(ret)
    }

    pub fn to_file(&self, param_file: &str) -> anyhow::Result<()> {
        write_lines(&self.to_lines(), param_file)
    }

    /// Check the values that would break sampling
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.n_topics == 0 {
            anyhow::bail!("need at least one topic");
        }
        let positive = |x: f64| x.is_finite() && x > 0.0;
        if !positive(self.alpha) || !positive(self.beta) {
            anyhow::bail!("alpha and beta must be positive: {} {}", self.alpha, self.beta);
        }
        if self.n_iterations == 0 {
            anyhow::bail!("need at least one iteration");
        }
        if self.cannot_link_mining_interval == 0 {
            anyhow::bail!("cannot-link mining interval must be positive");
        }
        if !(0.0..=1.0).contains(&self.mis_percentage) {
            anyhow::bail!("MIS percentage out of [0, 1]: {}", self.mis_percentage);
        }
        if self.support_difference_constraint < 0.0 || self.pmi_to_lambda_scale < 0.0 {
            anyhow::bail!("support difference and PMI scale must not be negative");
        }
        Ok(())
    }

    /// Sample lag if posterior averaging is on
    pub fn lag(&self) -> Option<usize> {
        if self.sample_lag > 0 {
            Some(self.sample_lag as usize)
        } else {
            None
        }
    }

    /// Number of sweeps the sampler runs in total
    pub fn total_sweeps(&self) -> usize {
        if self.use_cannot_links {
            self.n_iterations * (1 + self.cannot_link_learning_iterations)
        } else {
            self.n_iterations
        }
    }
}
