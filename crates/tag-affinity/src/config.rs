//! Pipeline configuration: thresholds, cluster size, tag order, and
//! aggregation strategy.

use crate::error::{AffinityError, Result};
use crate::types::TagOrder;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Default degree-centrality threshold for core tags.
pub const DEFAULT_CENTRALITY_THRESHOLD: f64 = 0.1;

/// Default number of peripheral tags per cluster.
pub const DEFAULT_CLUSTER_SIZE: usize = 30;

/// Minimum co-occurrence used for the high-confidence view of the reference corpus.
pub const REFERENCE_MIN_COOCCURRENCE: i64 = 500;

/// How per-post pair counts are combined across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStrategy {
    /// Per-worker partial maps merged pairwise (map-reduce).
    #[default]
    FoldReduce,
    /// One sharded concurrent map with per-key increments.
    Concurrent,
}

impl FromStr for AggregationStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fold_reduce" | "fold" => Ok(AggregationStrategy::FoldReduce),
            "concurrent" => Ok(AggregationStrategy::Concurrent),
            other => Err(format!("unknown aggregation strategy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum co-occurrence count for a pair to enter the graph. `None` keeps every pair.
    pub min_cooccurrence: Option<i64>,
    /// Core tags have degree centrality strictly above this value. Must lie in `[0, 1)`.
    pub centrality_threshold: f64,
    /// Maximum peripherals per cluster (K).
    pub cluster_size: usize,
    pub tag_order: TagOrder,
    /// Posts with more distinct tags than this are skipped by pair generation.
    pub max_tags_per_post: Option<usize>,
    pub strategy: AggregationStrategy,
    /// Number of key partitions the scorer works through.
    pub partitions: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_cooccurrence: None,
            centrality_threshold: DEFAULT_CENTRALITY_THRESHOLD,
            cluster_size: DEFAULT_CLUSTER_SIZE,
            tag_order: TagOrder::default(),
            max_tags_per_post: None,
            strategy: AggregationStrategy::default(),
            partitions: 1,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&data)?;
        Ok(config)
    }

    /// Reject parameters outside their valid domain.
    pub fn validate(&self) -> Result<()> {
        if let Some(tau) = self.min_cooccurrence {
            if tau < 0 {
                return Err(AffinityError::Configuration(format!(
                    "min_cooccurrence must be non-negative, got {tau}"
                )));
            }
        }
        validate_centrality_threshold(self.centrality_threshold)?;
        validate_cluster_size(self.cluster_size)?;
        if let Some(cap) = self.max_tags_per_post {
            if cap < 2 {
                return Err(AffinityError::Configuration(format!(
                    "max_tags_per_post must be at least 2, got {cap}"
                )));
            }
        }
        if self.partitions == 0 {
            return Err(AffinityError::Configuration(
                "partitions must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The co-occurrence threshold as an unsigned count. Call after `validate`.
    pub fn min_cooccurrence_threshold(&self) -> Option<u64> {
        self.min_cooccurrence.map(|tau| tau.max(0) as u64)
    }
}

pub(crate) fn validate_centrality_threshold(threshold: f64) -> Result<()> {
    if !(0.0..1.0).contains(&threshold) {
        return Err(AffinityError::Configuration(format!(
            "centrality_threshold must be in [0, 1), got {threshold}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_cluster_size(cluster_size: usize) -> Result<()> {
    if cluster_size == 0 {
        return Err(AffinityError::Configuration(
            "cluster_size must be positive".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cluster_size, 30);
        assert_eq!(config.centrality_threshold, 0.1);
        assert_eq!(config.min_cooccurrence_threshold(), None);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let config = PipelineConfig {
            min_cooccurrence: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AffinityError::Configuration(_))
        ));
    }

    #[test]
    fn test_centrality_threshold_domain() {
        for bad in [-0.01, 1.0, 1.5, f64::NAN] {
            let config = PipelineConfig {
                centrality_threshold: bad,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{bad} should be rejected");
        }
        let config = PipelineConfig {
            centrality_threshold: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_cluster_size_rejected() {
        let config = PipelineConfig {
            cluster_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tag_cap_below_two_rejected() {
        for cap in [0, 1] {
            let config = PipelineConfig {
                max_tags_per_post: Some(cap),
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(AffinityError::Configuration(_))
            ));
        }
        let config = PipelineConfig {
            max_tags_per_post: Some(2),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_partitions_rejected() {
        let config = PipelineConfig {
            partitions: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(AffinityError::Configuration(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"min_cooccurrence": 500, "tag_order": "length_then_lexicographic"}"#)
                .unwrap();
        assert_eq!(config.min_cooccurrence_threshold(), Some(500));
        assert_eq!(config.tag_order, TagOrder::LengthThenLexicographic);
        assert_eq!(config.cluster_size, DEFAULT_CLUSTER_SIZE);
        assert_eq!(config.strategy, AggregationStrategy::FoldReduce);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "concurrent".parse::<AggregationStrategy>(),
            Ok(AggregationStrategy::Concurrent)
        );
        assert_eq!(
            "fold-reduce".parse::<AggregationStrategy>(),
            Ok(AggregationStrategy::FoldReduce)
        );
    }
}
