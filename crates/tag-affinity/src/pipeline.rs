//! Batch pipeline driver: catalog → pairs → scores → graph → clusters.
//!
//! Every stage is a pure function of its inputs and the configuration, so a
//! downstream stage can be re-run with new parameters without re-scanning posts.

use crate::config::PipelineConfig;
use crate::corpus::{Aggregation, AggregationStats, PairAggregator, TagCatalog};
use crate::error::Result;
use crate::graph::cluster::{ClusterExtractor, ClusterReport};
use crate::graph::AssociationGraph;
use crate::scoring::{AssociationScorer, ScoredPairTable};
use crate::types::Post;
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Non-fatal outcomes worth surfacing to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// The corpus produced no tag pairs at all.
    NoPairs,
    /// Pairs exist but none meet the co-occurrence threshold.
    NoRetainedPairs { min_cooccurrence: u64 },
    /// The graph has no node above the centrality threshold.
    NoCoreTags { centrality_threshold: f64 },
    /// Posts skipped for exceeding the per-post tag cap.
    OversizedPostsSkipped { count: u64, cap: usize },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::NoPairs => write!(f, "corpus yields no tag pairs"),
            PipelineWarning::NoRetainedPairs { min_cooccurrence } => write!(
                f,
                "no pairs reach the minimum co-occurrence of {min_cooccurrence}"
            ),
            PipelineWarning::NoCoreTags {
                centrality_threshold,
            } => write!(
                f,
                "no tag exceeds the centrality threshold of {centrality_threshold}"
            ),
            PipelineWarning::OversizedPostsSkipped { count, cap } => {
                write!(f, "{count} post(s) with more than {cap} tags were skipped")
            }
        }
    }
}

/// Graph and clusters derived from one scored-pair table.
#[derive(Debug, Clone)]
pub struct ClusterStage {
    pub graph: AssociationGraph,
    pub report: ClusterReport,
    pub warnings: Vec<PipelineWarning>,
}

/// Every artifact of a full run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub catalog: TagCatalog,
    pub stats: AggregationStats,
    pub table: ScoredPairTable,
    pub graph: AssociationGraph,
    pub report: ClusterReport,
    pub warnings: Vec<PipelineWarning>,
}

/// A validated pipeline configuration and the stages it drives.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    extractor: ClusterExtractor,
}

impl Pipeline {
    /// Validate `config`. No work happens before validation succeeds.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let extractor = ClusterExtractor::new(config.centrality_threshold, config.cluster_size)?;
        Ok(Self { config, extractor })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Full run with the catalog built from the same posts.
    pub fn run(&self, posts: &[Post]) -> Result<PipelineOutput> {
        let catalog = TagCatalog::from_posts(posts);
        self.run_with_catalog(posts, catalog)
    }

    /// Full run against an independently supplied catalog.
    pub fn run_with_catalog(&self, posts: &[Post], catalog: TagCatalog) -> Result<PipelineOutput> {
        info!(
            posts = posts.len(),
            tags = catalog.len(),
            order = %self.config.tag_order,
            "starting pipeline run"
        );

        let aggregator = self.aggregator();
        let aggregation = aggregator.aggregate(posts);
        let mut warnings = Vec::new();
        if aggregation.stats.posts_oversized > 0 {
            warnings.push(PipelineWarning::OversizedPostsSkipped {
                count: aggregation.stats.posts_oversized,
                cap: self.config.max_tags_per_post.unwrap_or_default(),
            });
        }

        let table = self.score(&aggregation, &catalog)?;
        let stage = self.cluster(&table);
        warnings.extend(stage.warnings);

        Ok(PipelineOutput {
            catalog,
            stats: aggregation.stats,
            table,
            graph: stage.graph,
            report: stage.report,
            warnings,
        })
    }

    pub fn aggregator(&self) -> PairAggregator {
        PairAggregator::new(self.config.tag_order)
            .with_max_tags_per_post(self.config.max_tags_per_post)
            .with_strategy(self.config.strategy)
            .with_partitions(self.config.partitions)
    }

    /// Score the key shards of an aggregation produced by [`Pipeline::aggregator`].
    pub fn score(&self, aggregation: &Aggregation, catalog: &TagCatalog) -> Result<ScoredPairTable> {
        AssociationScorer::new(catalog, self.config.tag_order).score_partitions(aggregation.shards())
    }

    /// Build the graph and extract clusters from an existing scored table.
    pub fn cluster(&self, table: &ScoredPairTable) -> ClusterStage {
        let min_cooccurrence = self.config.min_cooccurrence_threshold();
        let mut warnings = Vec::new();

        let graph = AssociationGraph::build(table, min_cooccurrence);
        if table.is_empty() {
            warnings.push(PipelineWarning::NoPairs);
        } else if graph.edge_count() == 0 {
            warnings.push(PipelineWarning::NoRetainedPairs {
                min_cooccurrence: min_cooccurrence.unwrap_or(0),
            });
        }

        let report = self.extractor.extract(&graph);
        if report.is_empty() {
            warnings.push(PipelineWarning::NoCoreTags {
                centrality_threshold: self.config.centrality_threshold,
            });
        }

        for warning in &warnings {
            warn!("{warning}");
        }

        ClusterStage {
            graph,
            report,
            warnings,
        }
    }
}
