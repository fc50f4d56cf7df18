//! tag-affinity — score tag co-occurrence and extract technology clusters.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tag_affinity::{SortColumn, SortDirection, TagOrder};
use tag_affinity_cli::audit::RunRecord;
use tag_affinity_cli::cli::args::ConfigArgs;
use tag_affinity_cli::cli::{cluster_cmd, run_cmd, score_cmd, top_cmd};
use tracing::info;

#[derive(Parser)]
#[command(name = "tag-affinity")]
#[command(version, about = "Tag co-occurrence scoring and technology cluster discovery", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON to stdout
    #[arg(long, global = true)]
    json: bool,

    /// Suppress human-readable output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show debug logs and full clusters
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Worker threads for aggregation and scoring (default: all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Append a JSONL record of this run to the given file
    #[arg(long, global = true)]
    audit_log: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: pairs, scores, graph, clusters
    Run {
        /// Posts file (JSON Lines with `id` and `tags`)
        posts: PathBuf,

        /// Output directory for pairs.jsonl and clusters.json
        #[arg(short, long, default_value = "./tag-affinity-out")]
        out: PathBuf,

        /// Tag counts file (`{"tag": count}`); built from the posts if omitted
        #[arg(long)]
        tag_counts: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Aggregate and score tag pairs only
    Score {
        /// Posts file (JSON Lines with `id` and `tags`)
        posts: PathBuf,

        /// Output file for the scored-pair table
        #[arg(short, long, default_value = "./pairs.jsonl")]
        out: PathBuf,

        /// Tag counts file (`{"tag": count}`); built from the posts if omitted
        #[arg(long)]
        tag_counts: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Build the graph and clusters from a scored-pair table
    Cluster {
        /// Scored-pair table written by `score` or `run`
        pairs: PathBuf,

        /// Output file for the cluster report
        #[arg(short, long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the scored-pair table sorted by a column
    Top {
        /// Scored-pair table written by `score` or `run`
        pairs: PathBuf,

        /// Column: tag1, tag2, co_occurrence, tag1_count, tag2_count, similarity
        #[arg(short, long, default_value = "similarity")]
        sort: String,

        /// Sort ascending instead of descending
        #[arg(long)]
        ascending: bool,

        /// Maximum rows to print
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Total order over tags used for tie-breaks
        #[arg(long, default_value = "lexicographic")]
        tag_order: String,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Run { .. } => "run",
            Commands::Score { .. } => "score",
            Commands::Cluster { .. } => "cluster",
            Commands::Top { .. } => "top",
        }
    }
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet || cli.json {
        "warn"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(format!("tag_affinity={level}").parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Export presentation flags for the output helpers.
fn export_flags(cli: &Cli) {
    if cli.json {
        std::env::set_var("TAG_AFFINITY_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("TAG_AFFINITY_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("TAG_AFFINITY_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("TAG_AFFINITY_NO_COLOR", "1");
    }
}

fn dispatch(command: Commands) -> Result<serde_json::Value> {
    match command {
        Commands::Run {
            posts,
            out,
            tag_counts,
            config,
        } => {
            let config = config.resolve()?;
            let parameters = serde_json::to_value(&config)?;
            run_cmd::run(&posts, &out, tag_counts.as_deref(), config)?;
            Ok(parameters)
        }
        Commands::Score {
            posts,
            out,
            tag_counts,
            config,
        } => {
            let config = config.resolve()?;
            let parameters = serde_json::to_value(&config)?;
            score_cmd::run(&posts, &out, tag_counts.as_deref(), config)?;
            Ok(parameters)
        }
        Commands::Cluster { pairs, out, config } => {
            let config = config.resolve()?;
            let parameters = serde_json::to_value(&config)?;
            cluster_cmd::run(&pairs, out.as_deref(), config)?;
            Ok(parameters)
        }
        Commands::Top {
            pairs,
            sort,
            ascending,
            limit,
            tag_order,
        } => {
            let column: SortColumn = sort.parse().map_err(anyhow::Error::msg)?;
            let order: TagOrder = tag_order.parse().map_err(anyhow::Error::msg)?;
            let direction = if ascending {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            };
            top_cmd::run(&pairs, column, direction, limit, order)?;
            Ok(serde_json::json!({
                "sort": sort,
                "ascending": ascending,
                "limit": limit,
                "tag_order": order,
            }))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    export_flags(&cli);
    init_tracing(&cli)?;

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure worker threads")?;
    }

    info!("tag-affinity v{}", env!("CARGO_PKG_VERSION"));

    let command_name = cli.command.name();
    let audit_log = cli.audit_log.clone();
    let started_at = Utc::now();
    let start = Instant::now();
    let result = dispatch(cli.command);

    // The command's own outcome wins over an audit write failure
    if let Some(path) = audit_log {
        RunRecord::finished(command_name, started_at, start.elapsed(), &result)
            .append_or_warn(&path);
    }

    result.map(|_| ())
}
