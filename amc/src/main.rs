use amc::run_amc::*;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "AMC",
    long_about = "Topic modelling with automatically mined knowledge\n\
		  Must-links and cannot-links between words are mined from the topics\n\
		  of other domains and fed back into a collapsed Gibbs sampler.\n\
		  Corpora are laid out as {dir}/{domain}/{domain}.docs and .vocab"
)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Run the full AMC pipeline over a directory of domains",
        long_about = "Fit topic models on every domain in the three stages: \n\
		      (1) LDA on the small and the large corpus of each domain\n\
		      (2) Mine must-links from the other domains' large-corpus topics\n\
		      (3) AMC on each small corpus, warm-started from (1),\n\
		      mining cannot-links during sampling.\n"
    )]
    Run(RunArgs),

    #[command(
        about = "Fit plain LDA on one corpus",
        long_about = "Fit a plain LDA model by collapsed Gibbs sampling\n\
		      without any prior knowledge.\n"
    )]
    Lda(LdaArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.commands {
        Commands::Run(args) => {
            run_amc(args)?;
        }
        Commands::Lda(args) => {
            run_lda(args)?;
        }
    }
    Ok(())
}
