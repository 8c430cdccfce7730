use crate::common::*;
use crate::common_io::{mkdir, write_lines, write_matrix_tsv};
use crate::corpus::{load_domain_corpora, Corpus};
use crate::gibbs::{FittedModel, TopicModel};
use crate::params::ModelParams;
use crate::topics::PriorTopics;

use clap::Args;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

/// Sample lag of both models on small corpora (no posterior averaging)
pub const SMALL_CORPUS_SAMPLE_LAG: i64 = -1;

/// Sample lag of the baseline on large corpora
pub const LARGE_CORPUS_SAMPLE_LAG: i64 = 20;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(
        long,
        short = 's',
        required = true,
        help = "Directory of small per-domain corpora",
        long_help = "Directory with one subdirectory per domain:\n\
		     {dir}/{domain}/{domain}.docs and {dir}/{domain}/{domain}.vocab\n\
		     AMC is fitted on each of these corpora."
    )]
    small_dir: Box<str>,

    #[arg(
        long,
        short = 'l',
        required = true,
        help = "Directory of large per-domain corpora",
        long_help = "Directory with the same layout as the small corpora.\n\
		     Baseline topics on these corpora become the knowledge\n\
		     for the other domains."
    )]
    large_dir: Box<str>,

    #[arg(
        long,
        short,
        required = true,
        help = "Output directory",
        long_help = "Output directory. Each model writes into\n\
		     {out}/{model}/{domain}/:\n\
		     - {domain}.twdist: topic x word distribution\n\
		     - {domain}.dtdist: document x topic distribution\n\
		     - {domain}.twords: top words of each topic\n\
		     - {domain}.param: parameters of the model\n\
		     - {domain}.knowl_mustlinks, {domain}.knowl_cannotlinks"
    )]
    out: Box<str>,

    #[arg(
        long,
        short,
        help = "Parameter file",
        long_help = "Parameter file of `key=value` lines.\n\
		     Missing keys keep their default values."
    )]
    param_file: Option<Box<str>>,

    #[arg(long, short = 't', help = "Number of topics (overrides the parameter file)")]
    n_topics: Option<usize>,

    #[arg(long, help = "Number of sampling iterations (overrides the parameter file)")]
    n_iterations: Option<usize>,

    #[arg(long, default_value = "docs", help = "Extension of document files")]
    docs_ext: Box<str>,

    #[arg(long, default_value = "vocab", help = "Extension of vocabulary files")]
    vocab_ext: Box<str>,

    #[arg(
        long,
        default_value_t = num_cpus::get(),
        help = "Maximum number of threads",
        long_help = "Maximum number of threads; domains are fitted in parallel."
    )]
    max_threads: usize,

    #[arg(long, short, help = "Verbose logging with progress bars")]
    verbose: bool,
}

#[derive(Args, Debug)]
pub struct LdaArgs {
    #[arg(required = true, help = "Document file (one document of word ids per line)")]
    docs_file: Box<str>,

    #[arg(required = true, help = "Vocabulary file (`id:word` per line)")]
    vocab_file: Box<str>,

    #[arg(long, short, required = true, help = "Domain name")]
    domain: Box<str>,

    #[arg(
        long,
        short,
        required = true,
        help = "Output directory",
        long_help = "Output directory; results go to {out}/LDA/{domain}/"
    )]
    out: Box<str>,

    #[arg(long, short, help = "Parameter file of `key=value` lines")]
    param_file: Option<Box<str>>,

    #[arg(long, short = 't', help = "Number of topics (overrides the parameter file)")]
    n_topics: Option<usize>,

    #[arg(long, help = "Number of sampling iterations (overrides the parameter file)")]
    n_iterations: Option<usize>,

    #[arg(long, short, help = "Verbose logging with progress bars")]
    verbose: bool,
}

fn load_params(
    param_file: Option<&str>,
    n_topics: Option<usize>,
    n_iterations: Option<usize>,
) -> anyhow::Result<ModelParams> {
    let mut params = match param_file {
        Some(file) => ModelParams::from_file(file)?,
        None => ModelParams::default(),
    };
    if let Some(t) = n_topics {
        params.n_topics = t;
    }
    if let Some(n) = n_iterations {
        params.n_iterations = n;
    }
    params.validate()?;
    Ok(params)
}

/// `amc run`
pub fn run_amc(args: &RunArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let params = load_params(args.param_file.as_deref(), args.n_topics, args.n_iterations)?;

    let small = load_domain_corpora(&args.small_dir, &args.docs_ext, &args.vocab_ext)?;
    let large = load_domain_corpora(&args.large_dir, &args.docs_ext, &args.vocab_ext)?;

    let pool = ThreadPoolBuilder::new()
        .num_threads(num_cpus::get().min(args.max_threads.max(1)))
        .build()?;
    info!("will use {} threads", pool.current_num_threads());

    pool.install(|| run_pipeline(&small, &large, &params, &args.out))
}

/// `amc lda`
pub fn run_lda(args: &LdaArgs) -> anyhow::Result<()> {
    if args.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let params = load_params(args.param_file.as_deref(), args.n_topics, args.n_iterations)?;
    let corpus = Corpus::from_files(&args.domain, &args.docs_file, &args.vocab_file)?;

    let model = TopicModel::lda(&corpus, &params)?.run();
    write_model_outputs(&args.out, "LDA", &corpus, &model)?;
    info!("Done");
    Ok(())
}

///
/// The full pipeline:
/// (1) baseline on each small corpus,
/// (2) baseline on each large corpus,
/// (3) AMC on each small corpus with the other domains' large-corpus
///     topics as knowledge, warm-started from (1).
///
/// Domains run in parallel on the current rayon pool.
///
pub fn run_pipeline(
    small: &[Corpus],
    large: &[Corpus],
    params: &ModelParams,
    out_dir: &str,
) -> anyhow::Result<()> {
    info!("baseline on {} small corpora", small.len());
    let small_params = ModelParams {
        sample_lag: SMALL_CORPUS_SAMPLE_LAG,
        ..params.clone()
    };
    let small_lda = fit_lda_corpora(small, &small_params)?;
    for (corpus, model) in small.iter().zip(small_lda.iter()) {
        write_model_outputs(out_dir, "LDA", corpus, model)?;
    }

    info!("baseline on {} large corpora", large.len());
    let large_params = ModelParams {
        sample_lag: LARGE_CORPUS_SAMPLE_LAG,
        ..params.clone()
    };
    let large_lda = fit_lda_corpora(large, &large_params)?;
    for (corpus, model) in large.iter().zip(large_lda.iter()) {
        write_model_outputs(out_dir, "LDA_large", corpus, model)?;
    }

    let n_top = params.n_top_words_for_knowledge;
    let large_topics: Vec<(&str, Vec<_>)> = large
        .iter()
        .zip(large_lda.iter())
        .map(|(c, m)| (&*c.domain, m.top_words(c, n_top)))
        .collect();

    info!("AMC on {} small corpora", small.len());
    let amc_models = small
        .par_iter()
        .zip(small_lda.par_iter())
        .enumerate()
        .map(|(i, (corpus, lda))| -> anyhow::Result<FittedModel> {
            let mut prior = PriorTopics::new();
            for (domain, topics) in large_topics.iter() {
                if *domain != &*corpus.domain {
                    prior.add_domain(topics.clone())?;
                }
            }
            if prior.is_empty() {
                warn!("{}: no prior topics from other domains", corpus.domain);
            }
            let params = ModelParams {
                random_seed: params.random_seed.wrapping_add(i as u64),
                sample_lag: SMALL_CORPUS_SAMPLE_LAG,
                ..params.clone()
            };
            Ok(TopicModel::amc(corpus, &params, &prior, Some(lda.z.as_slice()))?.run())
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    for (corpus, model) in small.iter().zip(amc_models.iter()) {
        write_model_outputs(out_dir, "AMC", corpus, model)?;
    }

    info!("Done");
    Ok(())
}

/// Baseline on every corpus in parallel; the seed of the `i`-th corpus is
/// `random_seed + i`
pub fn fit_lda_corpora(
    corpora: &[Corpus],
    params: &ModelParams,
) -> anyhow::Result<Vec<FittedModel>> {
    corpora
        .par_iter()
        .enumerate()
        .map(|(i, corpus)| -> anyhow::Result<FittedModel> {
            let params = ModelParams {
                random_seed: params.random_seed.wrapping_add(i as u64),
                ..params.clone()
            };
            Ok(TopicModel::lda(corpus, &params)?.run())
        })
        .collect()
}

/// Write a fitted model into `{out_dir}/{model_dir}/{domain}/`
pub fn write_model_outputs(
    out_dir: &str,
    model_dir: &str,
    corpus: &Corpus,
    model: &FittedModel,
) -> anyhow::Result<()> {
    let domain = &corpus.domain;
    let dir = format!("{}/{}/{}", out_dir, model_dir, domain);
    mkdir(&dir)?;
    let header = format!("{}/{}", dir, domain);

    write_matrix_tsv(&model.topic_word, &format!("{}.twdist", header))?;
    write_matrix_tsv(&model.doc_topic, &format!("{}.dtdist", header))?;

    let twords: Vec<Box<str>> = model
        .top_words(corpus, model.params.twords)
        .iter()
        .map(|t| t.to_line())
        .collect();
    write_lines(&twords, &format!("{}.twords", header))?;

    model.params.to_file(&format!("{}.param", header))?;

    if !model.must_links.is_empty() {
        let lines: Vec<_> = model.must_links.iter().map(|l| &l.pair).collect();
        write_lines(&lines, &format!("{}.knowl_mustlinks", header))?;
    }
    if !model.cannot_links.is_empty() {
        let lines: Vec<_> = model.cannot_links.iter().map(|l| &l.pair).collect();
        write_lines(&lines, &format!("{}.knowl_cannotlinks", header))?;
    }

    info!("{}: wrote {} outputs to {}", model_dir, domain, dir);
    Ok(())
}
