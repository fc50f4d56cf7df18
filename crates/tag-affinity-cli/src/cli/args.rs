//! Pipeline configuration flags shared by the subcommands.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::path::PathBuf;
use tag_affinity::{AggregationStrategy, PipelineConfig, TagOrder};

/// Flags that override values from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON file with pipeline configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum co-occurrence count for a pair to enter the graph
    #[arg(long, allow_negative_numbers = true)]
    pub min_cooccurrence: Option<i64>,

    /// Degree centrality a tag must exceed to be a core tag
    #[arg(long)]
    pub centrality_threshold: Option<f64>,

    /// Peripheral tags kept per cluster
    #[arg(short = 'k', long)]
    pub cluster_size: Option<usize>,

    /// Total order over tags: lexicographic or length_then_lexicographic
    #[arg(long)]
    pub tag_order: Option<String>,

    /// Skip pair generation for posts with more distinct tags than this
    #[arg(long)]
    pub max_tags_per_post: Option<usize>,

    /// Aggregation strategy: fold_reduce or concurrent
    #[arg(long)]
    pub strategy: Option<String>,

    /// Key partitions used while scoring
    #[arg(long)]
    pub partitions: Option<usize>,
}

impl ConfigArgs {
    /// Load `--config` (or defaults) and apply the individual flag overrides.
    ///
    /// Values are not validated here; `Pipeline::new` does that.
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)
                .with_context(|| format!("failed to load config: {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(tau) = self.min_cooccurrence {
            config.min_cooccurrence = Some(tau);
        }
        if let Some(threshold) = self.centrality_threshold {
            config.centrality_threshold = threshold;
        }
        if let Some(k) = self.cluster_size {
            config.cluster_size = k;
        }
        if let Some(order) = &self.tag_order {
            config.tag_order = order.parse::<TagOrder>().map_err(|e| anyhow!(e))?;
        }
        if let Some(cap) = self.max_tags_per_post {
            config.max_tags_per_post = Some(cap);
        }
        if let Some(strategy) = &self.strategy {
            config.strategy = strategy
                .parse::<AggregationStrategy>()
                .map_err(|e| anyhow!(e))?;
        }
        if let Some(partitions) = self.partitions {
            config.partitions = partitions;
        }
        Ok(config)
    }
}
