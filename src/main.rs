use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use reelx_core::facets::available_genres;
use reelx_core::rank::rank;
use reelx_core::{year_bounds, FilterSpec, NormalizedRecord, SortBy, Vector};
use reelx_schema::{templates, AdapterConfig, DatasetRegistry};
use reelx_similarity::{ExplainResponse, PlaygroundSelection};
use serde::Serialize;
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Normalize, rank and compare embedding search results
#[derive(Parser, Debug)]
#[command(name = "reelx")]
#[command(about = "Normalize, rank and compare embedding search results", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Additional dataset configuration file (one object or an array)
    #[arg(long, global = true)]
    config: Vec<PathBuf>,

    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter and sort a batch of raw search results
    Rank {
        #[command(flatten)]
        input: InputArgs,

        /// Filter settings as JSON
        #[arg(long)]
        filters: Option<PathBuf>,

        /// Sort key, overrides the one in the filter file
        #[arg(long)]
        sort: Option<SortBy>,
    },

    /// Pairwise cosine similarity of the first results
    Matrix {
        #[command(flatten)]
        input: InputArgs,
    },

    /// List the registered datasets
    Datasets,

    /// Explain how each result relates to a query
    Explain {
        #[command(flatten)]
        input: InputArgs,

        /// Query text
        #[arg(long)]
        query: String,

        /// Query embedding as comma-separated numbers
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        embedding: Vec<f32>,
    },
}

#[derive(ClapArgs, Debug)]
struct InputArgs {
    /// JSON array of raw records, `-` for stdin
    #[arg(default_value = "-")]
    input: PathBuf,

    /// Dataset type used to normalize the input
    #[arg(short, long, default_value = templates::MOVIES)]
    dataset: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RankOutput {
    total: usize,
    active_filters: usize,
    available_genres: Vec<String>,
    results: Vec<NormalizedRecord>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the JSON result
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let registry = build_registry(&args.config)?;

    let output = match args.command {
        Command::Datasets => serde_json::to_value(registry.available_datasets())?,
        Command::Rank { input, filters, sort } => {
            let records = load_records(&registry, &input)?;
            let mut spec = match filters {
                Some(path) => read_filters(&path)?,
                None => FilterSpec::default(),
            };
            if let Some(sort) = sort {
                spec.sort_by = sort;
            }
            debug!(sort = %spec.sort_by, conditions = spec.conditions().len(), "Ranking results");

            let results = rank(&records, &spec);
            info!("Kept {} of {} results", results.len(), records.len());
            serde_json::to_value(RankOutput {
                total: records.len(),
                active_filters: spec.active_filter_count(year_bounds(&records)),
                available_genres: available_genres(&records),
                results,
            })?
        }
        Command::Matrix { input } => {
            let records = load_records(&registry, &input)?;
            let selection = PlaygroundSelection::from_records(&records);
            let ids: Vec<&str> = selection.selected().iter().map(|r| r.id.as_str()).collect();
            let Some(matrix) = selection.matrix() else {
                anyhow::bail!("at least two valid records are needed for a matrix");
            };
            let most_similar = matrix
                .most_similar_pair()
                .map(|(i, j, score)| json!({ "a": ids[i], "b": ids[j], "score": score }));
            json!({
                "ids": ids,
                "matrix": matrix,
                "mostSimilar": most_similar,
            })
        }
        Command::Explain { input, query, embedding } => {
            let records = load_records(&registry, &input)?;
            let query_embedding = (!embedding.is_empty()).then(|| Vector::new(embedding));
            serde_json::to_value(ExplainResponse::new(&query, query_embedding.as_ref(), &records))?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn build_registry(configs: &[PathBuf]) -> anyhow::Result<DatasetRegistry> {
    let registry = DatasetRegistry::new();
    registry.register(templates::climate());
    registry.register(templates::social());

    for path in configs {
        let loaded = AdapterConfig::load_file(path)
            .with_context(|| format!("failed to load dataset config {}", path.display()))?;
        for config in loaded {
            info!("Registered dataset '{}' from {}", config.dataset_type, path.display());
            registry.register(config);
        }
    }
    Ok(registry)
}

fn load_records(registry: &DatasetRegistry, input: &InputArgs) -> anyhow::Result<Vec<NormalizedRecord>> {
    registry.set_active(&input.dataset)?;

    let content = if input.input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&input.input)
            .with_context(|| format!("failed to read {}", input.input.display()))?
    };
    let raw: Vec<Value> = serde_json::from_str(&content).context("input must be a JSON array of records")?;

    Ok(registry.transform(&raw)?)
}

fn read_filters(path: &Path) -> anyhow::Result<FilterSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read filters {}", path.display()))?;
    Ok(serde_json::from_str(&content)?)
}
