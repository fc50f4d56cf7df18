//! The scored-pair table: one row per canonical pair with its counts and similarity.

use crate::error::{AffinityError, Result};
use crate::scoring::jaccard::checked_jaccard;
use crate::types::{Tag, TagOrder};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// A canonical pair with its counts and Jaccard similarity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPair {
    pub tag1: Tag,
    pub tag2: Tag,
    pub co_occurrence_count: u64,
    pub tag1_count: u64,
    pub tag2_count: u64,
    pub similarity: f64,
}

/// Column of the scored-pair table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Tag1,
    Tag2,
    CoOccurrence,
    Tag1Count,
    Tag2Count,
    Similarity,
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "tag1" => Ok(SortColumn::Tag1),
            "tag2" => Ok(SortColumn::Tag2),
            "co_occurrence" | "co_occurrence_count" | "count" => Ok(SortColumn::CoOccurrence),
            "tag1_count" => Ok(SortColumn::Tag1Count),
            "tag2_count" => Ok(SortColumn::Tag2Count),
            "similarity" | "jaccard" => Ok(SortColumn::Similarity),
            other => Err(format!("unknown column '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Scored pairs in canonical pair order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPairTable {
    order: TagOrder,
    rows: Vec<ScoredPair>,
}

impl ScoredPairTable {
    /// Rows produced by the scorer: canonical and unique, in any order.
    pub(crate) fn from_canonical_rows(order: TagOrder, mut rows: Vec<ScoredPair>) -> Self {
        rows.sort_by(|a, b| order.compare_pairs((&a.tag1, &a.tag2), (&b.tag1, &b.tag2)));
        Self { order, rows }
    }

    /// Rebuild a table from previously exported rows.
    ///
    /// Rows are re-oriented to canonical form under `order` and held to the
    /// same checks as freshly scored pairs: a positive union, a co-occurrence
    /// no larger than either tag count, and a similarity equal to the Jaccard
    /// value of its counts. Self-pairs and duplicate pairs are rejected.
    pub fn from_rows(order: TagOrder, rows: Vec<ScoredPair>) -> Result<Self> {
        let mut canonical = Vec::with_capacity(rows.len());
        for row in rows {
            let row = match order.compare(&row.tag1, &row.tag2) {
                Ordering::Less => row,
                Ordering::Greater => ScoredPair {
                    tag1: row.tag2,
                    tag2: row.tag1,
                    tag1_count: row.tag2_count,
                    tag2_count: row.tag1_count,
                    ..row
                },
                Ordering::Equal => {
                    return Err(invalid(&row, "self-pair"));
                }
            };
            let expected = checked_jaccard(
                &row.tag1,
                &row.tag2,
                row.co_occurrence_count,
                row.tag1_count,
                row.tag2_count,
            )?;
            if row.similarity != expected {
                return Err(invalid(&row, "similarity does not match its counts"));
            }
            canonical.push(row);
        }

        let table = Self::from_canonical_rows(order, canonical);
        if let Some(dup) = table
            .rows
            .windows(2)
            .find(|w| w[0].tag1 == w[1].tag1 && w[0].tag2 == w[1].tag2)
        {
            return Err(invalid(&dup[0], "duplicate pair"));
        }
        Ok(table)
    }

    pub fn order(&self) -> TagOrder {
        self.order
    }

    pub fn rows(&self) -> &[ScoredPair] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredPair> {
        self.rows.iter()
    }

    /// Row for `a` and `b`, in either argument order.
    pub fn get(&self, a: &str, b: &str) -> Option<&ScoredPair> {
        let key = match self.order.compare(a, b) {
            Ordering::Less => (a, b),
            Ordering::Greater => (b, a),
            Ordering::Equal => return None,
        };
        self.rows
            .binary_search_by(|row| self.order.compare_pairs((&row.tag1, &row.tag2), key))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// New table keeping only pairs with `co_occurrence_count >= min_cooccurrence`.
    pub fn filter_min_cooccurrence(&self, min_cooccurrence: u64) -> ScoredPairTable {
        ScoredPairTable {
            order: self.order,
            rows: self
                .rows
                .iter()
                .filter(|row| row.co_occurrence_count >= min_cooccurrence)
                .cloned()
                .collect(),
        }
    }

    /// Rows sorted by `column`. Ties fall back to canonical pair order.
    pub fn sorted_by(&self, column: SortColumn, direction: SortDirection) -> Vec<&ScoredPair> {
        let order = self.order;
        let mut rows: Vec<&ScoredPair> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            let primary = match column {
                SortColumn::Tag1 => order.compare(&a.tag1, &b.tag1),
                SortColumn::Tag2 => order.compare(&a.tag2, &b.tag2),
                SortColumn::CoOccurrence => a.co_occurrence_count.cmp(&b.co_occurrence_count),
                SortColumn::Tag1Count => a.tag1_count.cmp(&b.tag1_count),
                SortColumn::Tag2Count => a.tag2_count.cmp(&b.tag2_count),
                SortColumn::Similarity => a.similarity.total_cmp(&b.similarity),
            };
            let primary = match direction {
                SortDirection::Ascending => primary,
                SortDirection::Descending => primary.reverse(),
            };
            primary.then_with(|| order.compare_pairs((&a.tag1, &a.tag2), (&b.tag1, &b.tag2)))
        });
        rows
    }
}

fn invalid(row: &ScoredPair, reason: &str) -> AffinityError {
    AffinityError::InvalidPair {
        tag1: row.tag1.to_string(),
        tag2: row.tag2.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tag1: &str, tag2: &str, co: u64, c1: u64, c2: u64) -> ScoredPair {
        ScoredPair {
            tag1: Tag::from(tag1),
            tag2: Tag::from(tag2),
            co_occurrence_count: co,
            tag1_count: c1,
            tag2_count: c2,
            similarity: co as f64 / (c1 + c2 - co) as f64,
        }
    }

    fn raw(tag1: &str, tag2: &str, co: u64, c1: u64, c2: u64, similarity: f64) -> ScoredPair {
        ScoredPair {
            tag1: Tag::from(tag1),
            tag2: Tag::from(tag2),
            co_occurrence_count: co,
            tag1_count: c1,
            tag2_count: c2,
            similarity,
        }
    }

    fn sample_table() -> ScoredPairTable {
        ScoredPairTable::from_rows(
            TagOrder::Lexicographic,
            vec![
                row("qt", "c++", 2, 3, 2),
                row("qpainter", "qt", 1, 1, 3),
                row("c++", "syntax-highlighting", 1, 2, 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rows_reoriented_to_canonical() {
        let table = sample_table();
        let first = &table.rows()[0];
        assert_eq!(&*first.tag1, "c++");
        assert_eq!(&*first.tag2, "qt");
        assert_eq!(first.tag1_count, 2);
        assert_eq!(first.tag2_count, 3);
    }

    #[test]
    fn test_get_either_order() {
        let table = sample_table();
        assert!(table.get("qt", "qpainter").is_some());
        assert!(table.get("qpainter", "qt").is_some());
        assert!(table.get("qt", "qt").is_none());
        assert!(table.get("java", "qt").is_none());
    }

    #[test]
    fn test_duplicate_rows_rejected() {
        let err = ScoredPairTable::from_rows(
            TagOrder::Lexicographic,
            vec![row("a", "b", 1, 1, 1), row("b", "a", 1, 1, 1)],
        )
        .unwrap_err();
        assert!(matches!(err, AffinityError::InvalidPair { .. }));
    }

    #[test]
    fn test_self_pair_rejected() {
        let err =
            ScoredPairTable::from_rows(TagOrder::Lexicographic, vec![row("a", "a", 1, 1, 1)])
                .unwrap_err();
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_non_positive_union_rejected() {
        let zero = raw("a", "b", 0, 0, 0, 0.0);
        let err = ScoredPairTable::from_rows(TagOrder::Lexicographic, vec![zero]).unwrap_err();
        assert!(matches!(err, AffinityError::NonPositiveUnion { union: 0, .. }));
    }

    #[test]
    fn test_co_occurrence_above_tag_count_rejected() {
        let inflated = raw("c", "d", 9, 1, 1, 0.9);
        let err =
            ScoredPairTable::from_rows(TagOrder::Lexicographic, vec![inflated]).unwrap_err();
        assert!(matches!(
            err,
            AffinityError::InconsistentCounts { co_occurrence: 9, .. }
        ));
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_similarity_must_match_counts() {
        let edited = raw("c++", "qt", 2, 2, 3, 0.9);
        let err = ScoredPairTable::from_rows(TagOrder::Lexicographic, vec![edited]).unwrap_err();
        assert!(matches!(err, AffinityError::InvalidPair { .. }));

        let nan = raw("c++", "qt", 2, 2, 3, f64::NAN);
        assert!(ScoredPairTable::from_rows(TagOrder::Lexicographic, vec![nan]).is_err());
    }

    #[test]
    fn test_sort_by_similarity_descending() {
        let table = sample_table();
        let sorted = table.sorted_by(SortColumn::Similarity, SortDirection::Descending);
        for w in sorted.windows(2) {
            assert!(w[0].similarity >= w[1].similarity);
        }
        assert_eq!(&*sorted[0].tag1, "c++");
        assert_eq!(&*sorted[0].tag2, "qt");
    }

    #[test]
    fn test_sort_ties_use_pair_order() {
        let table = sample_table();
        let sorted = table.sorted_by(SortColumn::CoOccurrence, SortDirection::Ascending);
        // Both co=1 rows: (c++, syntax-highlighting) before (qpainter, qt)
        assert_eq!(&*sorted[0].tag1, "c++");
        assert_eq!(&*sorted[1].tag1, "qpainter");
        assert_eq!(sorted[2].co_occurrence_count, 2);
    }

    #[test]
    fn test_filter_is_monotone() {
        let table = sample_table();
        let loose = table.filter_min_cooccurrence(1);
        let strict = table.filter_min_cooccurrence(2);
        assert_eq!(loose.len(), 3);
        assert_eq!(strict.len(), 1);
        for r in strict.iter() {
            assert!(loose.get(&r.tag1, &r.tag2).is_some());
        }
    }

    #[test]
    fn test_sort_column_from_str() {
        assert_eq!("similarity".parse::<SortColumn>(), Ok(SortColumn::Similarity));
        assert_eq!("co-occurrence".parse::<SortColumn>(), Ok(SortColumn::CoOccurrence));
        assert!("weight".parse::<SortColumn>().is_err());
    }
}
