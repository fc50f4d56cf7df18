//! Canonical pair generation and co-occurrence aggregation.
//!
//! Each post is expanded into every unordered pair of its distinct tags and
//! each pair is counted once per post. Partial counts combine by summation, so
//! any split of the corpus across workers, in any order, gives the same result.

use crate::config::AggregationStrategy;
use crate::types::{Post, Tag, TagOrder, TagPair};
use dashmap::DashMap;
use fnv::{FnvBuildHasher, FnvHashMap, FnvHasher};
use rayon::prelude::*;
use serde::Serialize;
use std::hash::{Hash, Hasher};
use tracing::{debug, info, warn};

/// Canonical pair → number of distinct posts containing both tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairCounts {
    order: TagOrder,
    counts: FnvHashMap<TagPair, u64>,
}

impl PairCounts {
    pub fn new(order: TagOrder) -> Self {
        Self {
            order,
            counts: FnvHashMap::default(),
        }
    }

    pub fn order(&self) -> TagOrder {
        self.order
    }

    fn increment(&mut self, pair: TagPair) {
        *self.counts.entry(pair).or_insert(0) += 1;
    }

    /// Sum another partial result into this one.
    pub fn merge(&mut self, other: PairCounts) {
        debug_assert_eq!(self.order, other.order);
        if self.counts.len() < other.counts.len() {
            let smaller = std::mem::replace(&mut self.counts, other.counts);
            for (pair, count) in smaller {
                *self.counts.entry(pair).or_insert(0) += count;
            }
        } else {
            for (pair, count) in other.counts {
                *self.counts.entry(pair).or_insert(0) += count;
            }
        }
    }

    /// Co-occurrence count of `a` and `b`, in either argument order.
    pub fn get(&self, a: &str, b: &str) -> Option<u64> {
        let pair = TagPair::new(Tag::from(a), Tag::from(b), self.order)?;
        self.counts.get(&pair).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TagPair, u64)> {
        self.counts.iter().map(|(pair, &count)| (pair, count))
    }
}

/// Index of the partition that owns `pair` among `n` partitions.
pub fn partition_of(pair: &TagPair, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let mut hasher = FnvHasher::default();
    pair.hash(&mut hasher);
    (hasher.finish() % n as u64) as usize
}

/// Call `f` with every canonical pair of distinct `tags`.
fn for_each_pair(tags: &[Tag], order: TagOrder, mut f: impl FnMut(TagPair)) {
    for (i, a) in tags.iter().enumerate() {
        for b in &tags[i + 1..] {
            if let Some(pair) = TagPair::new(a.clone(), b.clone(), order) {
                f(pair);
            }
        }
    }
}

/// Counters describing one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    pub posts_seen: u64,
    /// Posts with at least two distinct tags.
    pub posts_paired: u64,
    /// Posts skipped because they exceeded `max_tags_per_post`.
    pub posts_oversized: u64,
    /// Total pair increments, before deduplication across posts.
    pub pair_occurrences: u64,
}

impl AggregationStats {
    pub fn combine(self, other: AggregationStats) -> AggregationStats {
        AggregationStats {
            posts_seen: self.posts_seen + other.posts_seen,
            posts_paired: self.posts_paired + other.posts_paired,
            posts_oversized: self.posts_oversized + other.posts_oversized,
            pair_occurrences: self.pair_occurrences + other.pair_occurrences,
        }
    }
}

/// Pair counts split into key-disjoint shards, plus the counters of the pass
/// that produced them.
///
/// Shard `i` holds exactly the pairs with `partition_of(pair, n) == i`, so no
/// single map ever holds every key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    shards: Vec<PairCounts>,
    pub stats: AggregationStats,
}

impl Aggregation {
    pub fn empty(order: TagOrder, partitions: usize) -> Self {
        Self {
            shards: (0..partitions.max(1)).map(|_| PairCounts::new(order)).collect(),
            stats: AggregationStats::default(),
        }
    }

    pub fn order(&self) -> TagOrder {
        self.shards[0].order()
    }

    pub fn shards(&self) -> &[PairCounts] {
        &self.shards
    }

    /// Number of distinct pairs across all shards.
    pub fn unique_pairs(&self) -> usize {
        self.shards.iter().map(PairCounts::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(PairCounts::is_empty)
    }

    /// Co-occurrence count of `a` and `b`, looked up in the owning shard only.
    pub fn get(&self, a: &str, b: &str) -> Option<u64> {
        let pair = TagPair::new(Tag::from(a), Tag::from(b), self.order())?;
        self.shards[partition_of(&pair, self.shards.len())]
            .counts
            .get(&pair)
            .copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TagPair, u64)> {
        self.shards.iter().flat_map(PairCounts::iter)
    }

    /// Count every pair of `tags` once, in the shard that owns it.
    /// `tags` must already be distinct.
    fn add_distinct_tags(&mut self, tags: &[Tag]) -> u64 {
        let order = self.order();
        let n = self.shards.len();
        let mut emitted = 0;
        for_each_pair(tags, order, |pair| {
            self.shards[partition_of(&pair, n)].increment(pair);
            emitted += 1;
        });
        emitted
    }

    /// Combine two partial aggregations shard by shard.
    /// Both sides must use the same order and partition count.
    pub fn merge(mut self, other: Aggregation) -> Self {
        debug_assert_eq!(self.shards.len(), other.shards.len());
        for (mine, theirs) in self.shards.iter_mut().zip(other.shards) {
            mine.merge(theirs);
        }
        self.stats = self.stats.combine(other.stats);
        self
    }

    /// Collapse the shards into one map.
    pub fn into_counts(self) -> PairCounts {
        let mut shards = self.shards.into_iter();
        let mut counts = shards.next().unwrap_or_else(|| PairCounts::new(TagOrder::default()));
        for shard in shards {
            counts.merge(shard);
        }
        counts
    }
}

/// Expands posts into canonical pairs and aggregates co-occurrence counts.
#[derive(Debug, Clone)]
pub struct PairAggregator {
    order: TagOrder,
    max_tags_per_post: Option<usize>,
    strategy: AggregationStrategy,
    partitions: usize,
}

impl PairAggregator {
    pub fn new(order: TagOrder) -> Self {
        Self {
            order,
            max_tags_per_post: None,
            strategy: AggregationStrategy::default(),
            partitions: 1,
        }
    }

    pub fn with_max_tags_per_post(mut self, cap: Option<usize>) -> Self {
        self.max_tags_per_post = cap;
        self
    }

    pub fn with_strategy(mut self, strategy: AggregationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Route each pair to one of `partitions` key shards while counting.
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions.max(1);
        self
    }

    pub fn aggregate(&self, posts: &[Post]) -> Aggregation {
        let aggregation = match self.strategy {
            AggregationStrategy::FoldReduce => self.fold_reduce(posts),
            AggregationStrategy::Concurrent => self.concurrent(posts),
        };

        let stats = &aggregation.stats;
        if stats.posts_oversized > 0 {
            warn!(
                skipped = stats.posts_oversized,
                cap = self.max_tags_per_post.unwrap_or_default(),
                "skipped posts exceeding the tag cap"
            );
        }
        info!(
            posts = stats.posts_seen,
            pair_occurrences = stats.pair_occurrences,
            unique_pairs = aggregation.unique_pairs(),
            partitions = self.partitions,
            "aggregated tag pairs"
        );
        aggregation
    }

    /// Distinct tags of `post`, or `None` if it contributes no pairs.
    fn expand(&self, post: &Post, stats: &mut AggregationStats) -> Option<Vec<Tag>> {
        stats.posts_seen += 1;
        let tags = post.distinct_tags();
        if tags.len() < 2 {
            return None;
        }
        if let Some(cap) = self.max_tags_per_post {
            if tags.len() > cap {
                debug!(post = %post.id, tags = tags.len(), cap, "post exceeds tag cap");
                stats.posts_oversized += 1;
                return None;
            }
        }
        stats.posts_paired += 1;
        Some(tags)
    }

    fn fold_reduce(&self, posts: &[Post]) -> Aggregation {
        let (order, partitions) = (self.order, self.partitions);
        posts
            .par_iter()
            .fold(
                || Aggregation::empty(order, partitions),
                |mut acc, post| {
                    if let Some(tags) = self.expand(post, &mut acc.stats) {
                        acc.stats.pair_occurrences += acc.add_distinct_tags(&tags);
                    }
                    acc
                },
            )
            .reduce(|| Aggregation::empty(order, partitions), Aggregation::merge)
    }

    fn concurrent(&self, posts: &[Post]) -> Aggregation {
        let order = self.order;
        let shared: Vec<DashMap<TagPair, u64, FnvBuildHasher>> = (0..self.partitions)
            .map(|_| DashMap::with_hasher(FnvBuildHasher::default()))
            .collect();

        let stats = posts
            .par_iter()
            .map(|post| {
                let mut stats = AggregationStats::default();
                if let Some(tags) = self.expand(post, &mut stats) {
                    for_each_pair(&tags, order, |pair| {
                        let shard = &shared[partition_of(&pair, shared.len())];
                        *shard.entry(pair).or_insert(0) += 1;
                        stats.pair_occurrences += 1;
                    });
                }
                stats
            })
            .reduce(AggregationStats::default, AggregationStats::combine);

        Aggregation {
            shards: shared
                .into_iter()
                .map(|shard| PairCounts {
                    order,
                    counts: shard.into_iter().collect(),
                })
                .collect(),
            stats,
        }
    }
}
