//! The association graph: an undirected weighted graph over tags.
//!
//! Stored as a flat edge arena with derived indices (tag → node, node →
//! sorted neighbor list) rather than as linked node objects.

pub mod cluster;

use crate::scoring::ScoredPairTable;
use crate::types::{Tag, TagOrder};
use fnv::FnvHashMap;
use serde::Serialize;
use tracing::info;

/// One undirected edge. `source < target` as node indices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub source: u32,
    pub target: u32,
    pub co_occurrence_count: u64,
    pub weight: f64,
}

#[derive(Debug, Clone)]
pub struct AssociationGraph {
    order: TagOrder,
    min_cooccurrence: Option<u64>,
    /// Node tags in canonical order; a node's index is its position here.
    nodes: Vec<Tag>,
    index: FnvHashMap<Tag, u32>,
    edges: Vec<Edge>,
    /// Per node: `(neighbor, weight)` by weight descending, then neighbor order.
    adjacency: Vec<Vec<(u32, f64)>>,
}

impl AssociationGraph {
    /// Build the graph from scored pairs with `co_occurrence_count >= min_cooccurrence`.
    pub fn build(table: &ScoredPairTable, min_cooccurrence: Option<u64>) -> Self {
        let order = table.order();
        let threshold = min_cooccurrence.unwrap_or(0);
        let retained: Vec<_> = table
            .iter()
            .filter(|row| row.co_occurrence_count >= threshold)
            .collect();

        let mut nodes: Vec<Tag> = retained
            .iter()
            .flat_map(|row| [row.tag1.clone(), row.tag2.clone()])
            .collect();
        nodes.sort_by(|a, b| order.compare(a, b));
        nodes.dedup();

        let index: FnvHashMap<Tag, u32> = nodes
            .iter()
            .enumerate()
            .map(|(i, tag)| (tag.clone(), i as u32))
            .collect();

        let mut adjacency: Vec<Vec<(u32, f64)>> = vec![Vec::new(); nodes.len()];
        let mut edges = Vec::with_capacity(retained.len());
        for row in retained {
            let a = index[&row.tag1];
            let b = index[&row.tag2];
            adjacency[a as usize].push((b, row.similarity));
            adjacency[b as usize].push((a, row.similarity));
            edges.push(Edge {
                source: a.min(b),
                target: a.max(b),
                co_occurrence_count: row.co_occurrence_count,
                weight: row.similarity,
            });
        }

        // Node indices follow canonical tag order, so index order is the tie-break.
        for neighbors in &mut adjacency {
            neighbors.sort_by(|x, y| y.1.total_cmp(&x.1).then_with(|| x.0.cmp(&y.0)));
        }

        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            min_cooccurrence = threshold,
            "built association graph"
        );

        Self {
            order,
            min_cooccurrence,
            nodes,
            index,
            edges,
            adjacency,
        }
    }

    pub fn order(&self) -> TagOrder {
        self.order
    }

    pub fn min_cooccurrence(&self) -> Option<u64> {
        self.min_cooccurrence
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Tag] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains_key(tag)
    }

    pub fn node_index(&self, tag: &str) -> Option<u32> {
        self.index.get(tag).copied()
    }

    pub fn tag(&self, node: u32) -> &Tag {
        &self.nodes[node as usize]
    }

    pub fn degree(&self, tag: &str) -> Option<usize> {
        self.node_index(tag).map(|i| self.degree_of(i))
    }

    pub fn degree_of(&self, node: u32) -> usize {
        self.adjacency[node as usize].len()
    }

    /// Neighbors of `tag` by weight descending, then canonical tag order.
    pub fn neighbors(&self, tag: &str) -> Option<impl Iterator<Item = (&Tag, f64)> + '_> {
        self.node_index(tag).map(|i| self.neighbors_of(i))
    }

    pub fn neighbors_of(&self, node: u32) -> impl Iterator<Item = (&Tag, f64)> + '_ {
        self.adjacency[node as usize]
            .iter()
            .map(move |&(n, w)| (&self.nodes[n as usize], w))
    }

    /// Weight of the edge between `a` and `b`, if present.
    pub fn weight(&self, a: &str, b: &str) -> Option<f64> {
        let a = self.node_index(a)?;
        let b = self.node_index(b)?;
        self.adjacency[a as usize]
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, w)| w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoredPair;

    fn pair(tag1: &str, tag2: &str, co: u64, similarity: f64) -> ScoredPair {
        ScoredPair {
            tag1: Tag::from(tag1),
            tag2: Tag::from(tag2),
            co_occurrence_count: co,
            tag1_count: 1000,
            tag2_count: 1000,
            similarity,
        }
    }

    fn table() -> ScoredPairTable {
        // Hand-picked weights, not derived from the counts
        ScoredPairTable::from_canonical_rows(
            TagOrder::Lexicographic,
            vec![
                pair("c++", "qt", 600, 0.4),
                pair("qpainter", "qt", 50, 0.9),
                pair("java", "qt", 700, 0.1),
                pair("c++", "java", 900, 0.4),
            ],
        )
    }

    #[test]
    fn test_build_unfiltered() {
        let graph = AssociationGraph::build(&table(), None);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.degree("qt"), Some(3));
        assert_eq!(graph.degree("qpainter"), Some(1));
        assert_eq!(graph.weight("qt", "c++"), Some(0.4));
        assert_eq!(graph.weight("c++", "qt"), Some(0.4));
        assert_eq!(graph.weight("qpainter", "java"), None);
    }

    #[test]
    fn test_build_with_threshold() {
        let graph = AssociationGraph::build(&table(), Some(500));
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.node_count(), 3);
        assert!(!graph.contains("qpainter"));
        assert_eq!(graph.min_cooccurrence(), Some(500));
    }

    #[test]
    fn test_neighbors_sorted_with_tie_break() {
        let graph = AssociationGraph::build(&table(), None);
        let neighbors: Vec<(String, f64)> = graph
            .neighbors("qt")
            .unwrap()
            .map(|(t, w)| (t.to_string(), w))
            .collect();
        assert_eq!(
            neighbors,
            vec![
                ("qpainter".to_string(), 0.9),
                ("c++".to_string(), 0.4),
                ("java".to_string(), 0.1),
            ]
        );

        // c++ has two neighbors at 0.4; java sorts before qt
        let neighbors: Vec<String> = graph
            .neighbors("c++")
            .unwrap()
            .map(|(t, _)| t.to_string())
            .collect();
        assert_eq!(neighbors, vec!["java", "qt"]);
    }

    #[test]
    fn test_threshold_above_all_counts_gives_empty_graph() {
        let graph = AssociationGraph::build(&table(), Some(10_000));
        assert!(graph.is_empty());
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.neighbors("qt").is_none());
    }
}
