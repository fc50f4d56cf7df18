//! Association scoring: Jaccard similarity per pair and the scored-pair table.

pub mod jaccard;
pub mod table;

pub use jaccard::{jaccard, AssociationScorer};
pub use table::{ScoredPair, ScoredPairTable, SortColumn, SortDirection};
