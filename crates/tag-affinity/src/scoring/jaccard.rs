//! Jaccard similarity between co-occurring tags.

use crate::corpus::{PairCounts, TagCatalog};
use crate::error::{AffinityError, Result};
use crate::scoring::table::{ScoredPair, ScoredPairTable};
use crate::types::{TagOrder, TagPair};
use rayon::prelude::*;
use tracing::info;

/// `co / (count1 + count2 - co)`.
///
/// `None` when the union size is not positive, or when `co` exceeds either
/// count (the ratio would leave `[0, 1]`).
pub fn jaccard(co_occurrence: u64, count1: u64, count2: u64) -> Option<f64> {
    let union = union_size(co_occurrence, count1, count2);
    if union <= 0 || co_occurrence > count1.min(count2) {
        return None;
    }
    Some(co_occurrence as f64 / union as f64)
}

/// Like [`jaccard`], but names the pair and the violated condition on failure.
pub(crate) fn checked_jaccard(
    tag1: &str,
    tag2: &str,
    co_occurrence: u64,
    tag1_count: u64,
    tag2_count: u64,
) -> Result<f64> {
    let union = union_size(co_occurrence, tag1_count, tag2_count);
    if union <= 0 {
        return Err(AffinityError::NonPositiveUnion {
            tag1: tag1.to_string(),
            tag2: tag2.to_string(),
            union,
        });
    }
    // A pair cannot co-occur more often than either tag occurs.
    if co_occurrence > tag1_count.min(tag2_count) {
        return Err(AffinityError::InconsistentCounts {
            tag1: tag1.to_string(),
            tag2: tag2.to_string(),
            co_occurrence,
            tag1_count,
            tag2_count,
        });
    }
    Ok(co_occurrence as f64 / union as f64)
}

fn union_size(co_occurrence: u64, count1: u64, count2: u64) -> i128 {
    count1 as i128 + count2 as i128 - co_occurrence as i128
}

/// Joins pair counts with the tag catalog and scores every pair.
pub struct AssociationScorer<'a> {
    catalog: &'a TagCatalog,
    order: TagOrder,
}

impl<'a> AssociationScorer<'a> {
    /// `order` must be the order the pair counts were built under.
    pub fn new(catalog: &'a TagCatalog, order: TagOrder) -> Self {
        Self { catalog, order }
    }

    /// Score every pair. Fails on the first pair that cannot be scored.
    pub fn score(&self, counts: &PairCounts) -> Result<ScoredPairTable> {
        self.score_partitions(std::slice::from_ref(counts))
    }

    /// Score key-partitioned shards in parallel and concatenate them.
    pub fn score_partitions(&self, partitions: &[PairCounts]) -> Result<ScoredPairTable> {
        debug_assert!(partitions.iter().all(|shard| shard.order() == self.order));

        let shards: Vec<Vec<ScoredPair>> = partitions
            .par_iter()
            .map(|shard| {
                let entries: Vec<(&TagPair, u64)> = shard.iter().collect();
                entries
                    .into_par_iter()
                    .map(|(pair, co)| self.score_pair(pair, co))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let rows: Vec<ScoredPair> = shards.into_iter().flatten().collect();
        info!(
            pairs = rows.len(),
            partitions = partitions.len(),
            "scored tag pairs"
        );
        Ok(ScoredPairTable::from_canonical_rows(self.order, rows))
    }

    fn score_pair(&self, pair: &TagPair, co_occurrence: u64) -> Result<ScoredPair> {
        let (tag1, tag2) = pair.as_strs();
        let count_of = |tag: &str| {
            self.catalog
                .get(tag)
                .ok_or_else(|| AffinityError::MissingTagCount {
                    tag: tag.to_string(),
                    tag1: tag1.to_string(),
                    tag2: tag2.to_string(),
                })
        };
        let tag1_count = count_of(tag1)?;
        let tag2_count = count_of(tag2)?;
        let similarity = checked_jaccard(tag1, tag2, co_occurrence, tag1_count, tag2_count)?;

        Ok(ScoredPair {
            tag1: pair.first().clone(),
            tag2: pair.second().clone(),
            co_occurrence_count: co_occurrence,
            tag1_count,
            tag2_count,
            similarity,
        })
    }
}
