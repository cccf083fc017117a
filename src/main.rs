use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use modaics::prelude::*;
use modaics::{CandidateFilter, Provenance};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Garment photo analysis, pricing and semantic discovery
#[derive(Parser, Debug)]
#[command(name = "modaics")]
#[command(about = "Garment intelligence pipeline", long_about = None)]
struct Args {
    /// JSON configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level or filter directive; overrides RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full analysis of one garment photo
    Analyze {
        image: PathBuf,
        #[arg(long)]
        brand: Option<String>,
        /// Original retail price, used as the pricing base
        #[arg(long)]
        original_price: Option<Decimal>,
        /// JSON file with provenance details
        #[arg(long)]
        provenance: Option<PathBuf>,
    },

    /// Classify several photos of one garment and vote on its category
    Batch {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// Rank listings against a free-text query
    Discover {
        /// JSON array of garment records
        listings: PathBuf,
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long = "style-tag")]
        style_tags: Vec<String>,
        #[command(flatten)]
        filter: CandidateFilterArgs,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Listings similar to one of them
    Similar {
        /// JSON array of garment records
        listings: PathBuf,
        /// Id of the source listing
        #[arg(long)]
        source: String,
        /// Keep listings by the same owner
        #[arg(long)]
        include_own: bool,
        #[command(flatten)]
        page: PageArgs,
    },

    /// Price a garment from its attributes
    Price {
        #[arg(long)]
        category: String,
        #[arg(long)]
        condition: String,
        #[arg(long)]
        brand: Option<String>,
        #[arg(long)]
        original_price: Option<Decimal>,
        #[arg(long)]
        provenance: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct CandidateFilterArgs {
    /// Case-insensitive category substring
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    size: Option<String>,
    #[arg(long)]
    condition: Option<String>,
}

impl From<CandidateFilterArgs> for CandidateFilter {
    fn from(args: CandidateFilterArgs) -> Self {
        CandidateFilter {
            category: args.category,
            size: args.size,
            condition: args.condition,
        }
    }
}

#[derive(clap::Args, Debug)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: usize,
    /// Defaults to the configured page size
    #[arg(long)]
    page_size: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = match args.log_level.as_deref() {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => Config::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    info!("Starting modaics v{}", env!("CARGO_PKG_VERSION"));

    let provider = Arc::new(EmbeddingProvider::new(
        Arc::new(HashingLoader {
            dimension: config.provider.dimension,
        }),
        config.provider.clone(),
    ));

    match args.command {
        Command::Analyze {
            image,
            brand,
            original_price,
            provenance,
        } => {
            let analyzer = GarmentAnalyzer::new(provider, config.colors.clone(), config.analysis.clone());
            let hints = AnalysisHints {
                brand,
                provenance: provenance.as_deref().map(read_provenance).transpose()?,
                original_price,
            };
            let bytes = read_file(&image)?;
            print_json(&analyzer.analyze_bytes(&bytes, &hints).await?)
        }

        Command::Batch { images } => {
            let analyzer = GarmentAnalyzer::new(provider, config.colors.clone(), config.analysis.clone());
            if images.len() > analyzer.config().max_batch_images {
                bail!(
                    "at most {} images are allowed per analysis",
                    analyzer.config().max_batch_images
                );
            }
            let uploads = images.iter().map(|p| read_file(p)).collect::<anyhow::Result<Vec<_>>>()?;
            print_json(&analyzer.analyze_batch(&uploads).await?)
        }

        Command::Discover {
            listings,
            query,
            style_tags,
            filter,
            page,
        } => {
            let ranker = DiscoveryRanker::new(provider, config.discovery.clone());
            let garments = read_listings(&listings)?;
            let query = DiscoveryQuery {
                text: query,
                style_tags,
                filter: filter.into(),
            };
            let page = page.resolve(&ranker);
            print_json(&ranker.discover(&query, &garments, page).await?)
        }

        Command::Similar {
            listings,
            source,
            include_own,
            page,
        } => {
            let ranker = DiscoveryRanker::new(provider, config.discovery.clone());
            let garments = read_listings(&listings)?;
            let source = garments
                .iter()
                .find(|g| g.id.to_string() == source)
                .with_context(|| format!("no listing with id {}", source))?;
            let page = page.resolve(&ranker);
            print_json(&ranker.similar(source, &garments, !include_own, page)?)
        }

        Command::Price {
            category,
            condition,
            brand,
            original_price,
            provenance,
        } => {
            let provenance = provenance.as_deref().map(read_provenance).transpose()?;
            let request = PriceRequest {
                category: &category,
                condition: &condition,
                brand: brand.as_deref(),
                provenance: provenance.as_ref(),
                original_price,
            };
            print_json(&PricingEngine::default().estimate(&request))
        }
    }
}

impl PageArgs {
    fn resolve(&self, ranker: &DiscoveryRanker) -> PageRequest {
        PageRequest::new(
            self.page,
            self.page_size.unwrap_or(ranker.config().default_page_size),
        )
    }
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn read_listings(path: &Path) -> anyhow::Result<Vec<Garment>> {
    let raw = read_file(path)?;
    let records: Vec<serde_json::Value> =
        serde_json::from_slice(&raw).with_context(|| format!("{} is not a JSON array", path.display()))?;
    let garments = records
        .into_iter()
        .map(Garment::from_json)
        .collect::<modaics::Result<Vec<_>>>()?;
    info!("Loaded {} listings from {}", garments.len(), path.display());
    Ok(garments)
}

fn read_provenance(path: &Path) -> anyhow::Result<Provenance> {
    let raw = read_file(path)?;
    serde_json::from_slice(&raw).with_context(|| format!("{} is not a provenance record", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
