//! Core tag detection and core/peripheral cluster extraction.

use crate::config::{validate_centrality_threshold, validate_cluster_size};
use crate::error::Result;
use crate::graph::AssociationGraph;
use crate::types::Tag;
use serde::Serialize;
use tracing::{debug, info};

/// A hub tag whose degree centrality exceeds the core threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreTag {
    pub tag: Tag,
    pub centrality: f64,
    pub degree: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peripheral {
    pub tag: Tag,
    pub similarity: f64,
}

/// A core tag and its most similar neighbors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub core: Tag,
    pub peripherals: Vec<Peripheral>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterReport {
    pub centrality_threshold: f64,
    pub cluster_size: usize,
    pub cores: Vec<CoreTag>,
    pub clusters: Vec<Cluster>,
}

impl ClusterReport {
    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    pub fn cluster(&self, core: &str) -> Option<&Cluster> {
        self.clusters.iter().find(|c| &*c.core == core)
    }
}

/// Degree centrality of every node, in node order.
///
/// `degree / (n - 1)`; every node scores 0 in a graph with fewer than two nodes.
pub fn degree_centrality(graph: &AssociationGraph) -> Vec<(Tag, f64)> {
    let n = graph.node_count();
    (0..n as u32)
        .map(|i| {
            let centrality = if n < 2 {
                0.0
            } else {
                graph.degree_of(i) as f64 / (n - 1) as f64
            };
            (graph.tag(i).clone(), centrality)
        })
        .collect()
}

/// Selects core tags by degree centrality and extracts their top-K neighbors.
#[derive(Debug, Clone, Copy)]
pub struct ClusterExtractor {
    centrality_threshold: f64,
    cluster_size: usize,
}

impl ClusterExtractor {
    pub fn new(centrality_threshold: f64, cluster_size: usize) -> Result<Self> {
        validate_centrality_threshold(centrality_threshold)?;
        validate_cluster_size(cluster_size)?;
        Ok(Self {
            centrality_threshold,
            cluster_size,
        })
    }

    /// Nodes with centrality strictly above the threshold, by centrality
    /// descending, then canonical tag order.
    pub fn core_tags(&self, graph: &AssociationGraph) -> Vec<CoreTag> {
        let mut cores: Vec<CoreTag> = degree_centrality(graph)
            .into_iter()
            .enumerate()
            .filter(|(_, (_, centrality))| *centrality > self.centrality_threshold)
            .map(|(i, (tag, centrality))| CoreTag {
                tag,
                centrality,
                degree: graph.degree_of(i as u32),
            })
            .collect();

        // Stable sort keeps canonical node order among equal centralities.
        cores.sort_by(|a, b| b.centrality.total_cmp(&a.centrality));
        cores
    }

    pub fn extract(&self, graph: &AssociationGraph) -> ClusterReport {
        let cores = self.core_tags(graph);

        let clusters: Vec<Cluster> = cores
            .iter()
            .map(|core| {
                let peripherals: Vec<Peripheral> = graph
                    .neighbors(&core.tag)
                    .into_iter()
                    .flatten()
                    .take(self.cluster_size)
                    .map(|(tag, similarity)| Peripheral {
                        tag: tag.clone(),
                        similarity,
                    })
                    .collect();
                debug!(core = %core.tag, peripherals = peripherals.len(), "extracted cluster");
                Cluster {
                    core: core.tag.clone(),
                    peripherals,
                }
            })
            .collect();

        info!(
            nodes = graph.node_count(),
            cores = cores.len(),
            threshold = self.centrality_threshold,
            "extracted clusters"
        );

        ClusterReport {
            centrality_threshold: self.centrality_threshold,
            cluster_size: self.cluster_size,
            cores,
            clusters,
        }
    }
}
