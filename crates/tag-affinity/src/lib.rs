//! Tag affinity: pairwise tag associations and technology clusters from a post corpus.
//!
//! The batch pipeline runs in four stages:
//! - pair aggregation: canonical unordered tag pairs counted once per post
//! - scoring: Jaccard similarity of each pair against per-tag counts
//! - graph: undirected weighted graph, optionally thresholded by co-occurrence
//! - clustering: degree-centrality core tags and their top-K neighbors

pub mod config;
pub mod corpus;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod types;

pub use config::{AggregationStrategy, PipelineConfig};
pub use corpus::{Aggregation, AggregationStats, PairAggregator, PairCounts, TagCatalog};
pub use error::{AffinityError, Result};
pub use graph::cluster::{degree_centrality, Cluster, ClusterExtractor, ClusterReport, CoreTag, Peripheral};
pub use graph::AssociationGraph;
pub use pipeline::{ClusterStage, Pipeline, PipelineOutput, PipelineWarning};
pub use scoring::{jaccard, AssociationScorer, ScoredPair, ScoredPairTable, SortColumn, SortDirection};
pub use types::{Post, Tag, TagOrder, TagPair};
