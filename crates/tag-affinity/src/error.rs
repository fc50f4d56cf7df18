//! Error types for the tag affinity pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AffinityError {
    #[error("tag '{tag}' in pair ({tag1}, {tag2}) is missing from the tag catalog")]
    MissingTagCount {
        tag: String,
        tag1: String,
        tag2: String,
    },

    #[error("non-positive union size {union} for pair ({tag1}, {tag2})")]
    NonPositiveUnion {
        tag1: String,
        tag2: String,
        union: i128,
    },

    #[error(
        "co-occurrence count {co_occurrence} for pair ({tag1}, {tag2}) exceeds tag counts ({tag1_count}, {tag2_count})"
    )]
    InconsistentCounts {
        tag1: String,
        tag2: String,
        co_occurrence: u64,
        tag1_count: u64,
        tag2_count: u64,
    },

    #[error("invalid scored pair ({tag1}, {tag2}): {reason}")]
    InvalidPair {
        tag1: String,
        tag2: String,
        reason: String,
    },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AffinityError {
    /// True for errors caused by inconsistent input data rather than by
    /// configuration or I/O.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            AffinityError::MissingTagCount { .. }
                | AffinityError::NonPositiveUnion { .. }
                | AffinityError::InconsistentCounts { .. }
                | AffinityError::InvalidPair { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AffinityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tag_message_names_pair() {
        let err = AffinityError::MissingTagCount {
            tag: "qt".into(),
            tag1: "c++".into(),
            tag2: "qt".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'qt'"));
        assert!(msg.contains("(c++, qt)"));
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_configuration_is_not_data_integrity() {
        let err = AffinityError::Configuration("cluster_size must be positive".into());
        assert!(!err.is_data_integrity());
    }
}
