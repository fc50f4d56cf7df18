//! Per-tag global occurrence counts.

use crate::types::{Post, Tag};
use fnv::FnvHashMap;
use rayon::prelude::*;
use tracing::debug;

/// Number of posts containing each tag. Built once per run, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCatalog {
    counts: FnvHashMap<Tag, u64>,
}

impl TagCatalog {
    /// Count tag occurrences over the corpus. A tag repeated within one post counts once.
    pub fn from_posts(posts: &[Post]) -> Self {
        let counts = posts
            .par_iter()
            .fold(FnvHashMap::default, |mut acc: FnvHashMap<Tag, u64>, post| {
                for tag in post.distinct_tags() {
                    *acc.entry(tag).or_insert(0) += 1;
                }
                acc
            })
            .reduce(FnvHashMap::default, merge_counts);

        debug!(posts = posts.len(), tags = counts.len(), "built tag catalog");
        Self { counts }
    }

    /// Build a catalog from an independently computed tag → count mapping.
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: AsRef<str>,
    {
        Self {
            counts: counts
                .into_iter()
                .map(|(tag, count)| (Tag::from(tag.as_ref()), count))
                .collect(),
        }
    }

    pub fn get(&self, tag: &str) -> Option<u64> {
        self.counts.get(tag).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Tag, u64)> {
        self.counts.iter().map(|(tag, &count)| (tag, count))
    }
}

fn merge_counts(
    mut a: FnvHashMap<Tag, u64>,
    b: FnvHashMap<Tag, u64>,
) -> FnvHashMap<Tag, u64> {
    if a.len() < b.len() {
        return merge_counts(b, a);
    }
    for (tag, count) in b {
        *a.entry(tag).or_insert(0) += count;
    }
    a
}
