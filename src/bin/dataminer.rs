use clap::{Args, Parser, Subcommand};
use dataminer::network::{self, EdgeWeightTable, MentionGraphBuilder};
use dataminer::record::Format;
use dataminer::terms::{Category, TermAggregator};
use dataminer::timeline::TimelineAggregator;
use dataminer::{cli, config::Config, corpus::Corpus};
use std::path::PathBuf;

type Void = Result<(), Box<dyn std::error::Error>>;

fn main() -> Void {
    let opts: Opts = Opts::parse();
    let _ = cli::init_logging(opts.verbose);
    let config = cli::load_config(opts.config.as_deref(), opts.output)?;

    match opts.command {
        SubCommand::Terms { corpus } => {
            let corpus = corpus.open()?;
            TermAggregator::new(&corpus, &config).aggregate_corpus()?;
        }
        SubCommand::TopTweets {
            corpus,
            top_k,
            categories,
            include_authors,
        } => {
            let corpus = corpus.open()?;
            let matched = TermAggregator::new(&corpus, &config).top_matching_records(
                top_k,
                &categories,
                include_authors,
            )?;
            println!("{}", matched.path.display());
        }
        SubCommand::Network { corpus } => {
            let corpus = corpus.open()?;
            let builder = MentionGraphBuilder::new(&corpus, &config);
            let edges = builder.build_edge_list()?;
            builder.ranked_in_degree(&edges)?;
            print_statistics(&builder, &edges)?;
        }
        SubCommand::NetworkStats => {
            let edges = EdgeWeightTable::load(network::edge_list_path(&config.output.dir))?;
            let statistics = edges.statistics()?;

            for (name, value) in statistics.rows() {
                println!("{},{}", name, value);
            }
        }
        SubCommand::Timeline { corpus } => {
            let corpus = corpus.open()?;
            let aggregator = TimelineAggregator::new(&corpus, &config);
            let timeline = aggregator.build_timeline()?;
            aggregator.densify_and_write(&timeline)?;
        }
        SubCommand::All { corpus, top_k } => {
            let corpus = corpus.open()?;
            run_all(&corpus, &config, top_k)?;
        }
    }

    Ok(())
}

fn run_all(corpus: &Corpus, config: &Config, top_k: usize) -> Void {
    let terms = TermAggregator::new(corpus, config);
    terms.aggregate_corpus()?;
    terms.top_matching_records(top_k, &[Category::Terms, Category::Hashtags], false)?;
    terms.top_matching_records(top_k, &[Category::Mentions], true)?;

    let builder = MentionGraphBuilder::new(corpus, config);
    let edges = builder.build_edge_list()?;
    if edges.is_empty() {
        log::warn!("No mentions found, skipping network statistics");
    } else {
        builder.ranked_in_degree(&edges)?;
        print_statistics(&builder, &edges)?;
    }

    let aggregator = TimelineAggregator::new(corpus, config);
    let timeline = aggregator.build_timeline()?;
    aggregator.densify_and_write(&timeline)?;

    Ok(())
}

fn print_statistics(builder: &MentionGraphBuilder, edges: &EdgeWeightTable) -> Void {
    for (name, value) in builder.graph_statistics(edges)?.rows() {
        println!("{},{}", name, value);
    }

    Ok(())
}

#[derive(Parser)]
#[clap(name = "dataminer", version, author)]
struct Opts {
    /// Level of verbosity
    #[clap(short, long, parse(from_occurrences))]
    verbose: i32,
    /// TOML file describing the corpus schema and normalizer
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Directory in which output directories are created
    #[clap(short, long)]
    output: Option<PathBuf>,
    #[clap(subcommand)]
    command: SubCommand,
}

#[derive(Args)]
struct CorpusArgs {
    /// Directory of record files
    dir: PathBuf,
    /// Corpus format (reduced or full); inferred from the directory name by default
    #[clap(short, long)]
    format: Option<Format>,
}

impl CorpusArgs {
    fn open(&self) -> dataminer::Result<Corpus> {
        cli::open_corpus(&self.dir, self.format)
    }
}

#[derive(Subcommand)]
enum SubCommand {
    /// Rank terms, hashtags, mentions and URLs
    Terms {
        #[clap(flatten)]
        corpus: CorpusArgs,
    },
    /// Collect records containing the top ranked keys
    TopTweets {
        #[clap(flatten)]
        corpus: CorpusArgs,
        #[clap(short = 'k', long, default_value = "20")]
        top_k: usize,
        /// Ranked lists to merge (terms, hashtags, mentions, urls)
        #[clap(long = "category", default_value = "terms")]
        categories: Vec<Category>,
        /// Also match records written by a top ranked user
        #[clap(long)]
        include_authors: bool,
    },
    /// Build the mention graph and its statistics
    Network {
        #[clap(flatten)]
        corpus: CorpusArgs,
    },
    /// Compute statistics from a previously written edge list
    NetworkStats,
    /// Count records per day
    Timeline {
        #[clap(flatten)]
        corpus: CorpusArgs,
    },
    /// Run every stage in order
    All {
        #[clap(flatten)]
        corpus: CorpusArgs,
        #[clap(short = 'k', long, default_value = "20")]
        top_k: usize,
    },
}
