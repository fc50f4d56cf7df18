//! Corpus-level statistics: per-tag occurrence counts and pair co-occurrence counts.

pub mod catalog;
pub mod pairs;

pub use catalog::TagCatalog;
pub use pairs::{Aggregation, AggregationStats, PairAggregator, PairCounts};
