mod acquire;
mod discover;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use compscout_discovery::{DiscoveryRequest, SearchDepth, SourceCategory, DEFAULT_PER_TYPE};

#[derive(Debug, Parser)]
#[command(name = "compscout")]
#[command(about = "Competitor discovery and content acquisition")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find competitors for a topic and score their data sources
    Discover {
        topic: String,

        /// Number of competitors to keep
        #[arg(long, default_value_t = 5)]
        competitors: usize,

        /// quick, standard, or deep
        #[arg(long, default_value_t = SearchDepth::Standard)]
        depth: SearchDepth,

        /// Restrict data-source categories (comma separated); all when omitted
        #[arg(long = "type", value_delimiter = ',')]
        types: Vec<SourceCategory>,

        /// Results requested per data-source query (default 5)
        #[arg(long)]
        per_type: Option<usize>,

        /// Where to write the JSON report; defaults to the storage directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Fetch the best sources of each competitor after discovery
        #[arg(long)]
        acquire: bool,
    },
    /// Search data sources for a single competitor and print them as JSON
    Sources {
        competitor: String,

        #[arg(long = "type", value_delimiter = ',')]
        types: Vec<SourceCategory>,

        #[arg(long)]
        per_type: Option<usize>,
    },
    /// Fetch and save one URL
    Crawl {
        url: String,

        #[arg(long)]
        competitor: String,

        #[arg(long, default_value = "")]
        source_type: String,
    },
    /// Fetch every job listed in a YAML file
    Batch {
        /// YAML list of `{url, competitor, source_type}`
        jobs: PathBuf,

        /// Requested concurrency (clamped to 1..=3); defaults to config
        #[arg(long, allow_negative_numbers = true)]
        concurrency: Option<i64>,
    },
}

/// Applies the `discover` flags to a request; an absent `--per-type` keeps
/// the request default.
fn discovery_request(
    topic: String,
    competitors: usize,
    depth: SearchDepth,
    types: Vec<SourceCategory>,
    per_type: Option<usize>,
) -> DiscoveryRequest {
    let mut request = DiscoveryRequest::new(topic);
    request.competitor_count = competitors;
    request.depth = depth;
    request.source_types = types;
    if let Some(per_type) = per_type {
        request.per_type = per_type;
    }
    request
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = compscout_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Discover {
            topic,
            competitors,
            depth,
            types,
            per_type,
            output,
            acquire,
        } => {
            let request = discovery_request(topic, competitors, depth, types, per_type);
            discover::run_discover(&config, &request, output, acquire).await?;
        }
        Commands::Sources {
            competitor,
            types,
            per_type,
        } => {
            let per_type = per_type.unwrap_or(DEFAULT_PER_TYPE);
            discover::run_sources(&config, &competitor, &types, per_type).await?;
        }
        Commands::Crawl {
            url,
            competitor,
            source_type,
        } => {
            let job = compscout_crawler::AcquisitionJob {
                url,
                competitor,
                source_type,
            };
            acquire::run_crawl(&config, &job).await?;
        }
        Commands::Batch { jobs, concurrency } => {
            let requested = concurrency.unwrap_or(config.batch_concurrency);
            acquire::run_batch_file(&config, &jobs, requested).await?;
        }
    }

    Ok(())
}
