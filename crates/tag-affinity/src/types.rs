//! Core value types: tags, posts, canonical tag pairs, and the tag order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A tag identifier. Shared so pair keys and graph nodes never copy tag text.
pub type Tag = Arc<str>;

/// Total order over tag identifiers, used for canonical pair keys and
/// every tie-break in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagOrder {
    /// Byte-wise lexicographic order.
    #[default]
    Lexicographic,
    /// Shorter tags first, lexicographic among equal lengths.
    LengthThenLexicographic,
}

impl TagOrder {
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            TagOrder::Lexicographic => a.cmp(b),
            TagOrder::LengthThenLexicographic => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
        }
    }

    /// Compare two canonical pairs: first tag, then second tag.
    pub fn compare_pairs(self, a: (&str, &str), b: (&str, &str)) -> Ordering {
        self.compare(a.0, b.0).then_with(|| self.compare(a.1, b.1))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TagOrder::Lexicographic => "lexicographic",
            TagOrder::LengthThenLexicographic => "length_then_lexicographic",
        }
    }
}

impl fmt::Display for TagOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "lexicographic" | "lex" => Ok(TagOrder::Lexicographic),
            "length_then_lexicographic" | "length" => Ok(TagOrder::LengthThenLexicographic),
            other => Err(format!("unknown tag order '{other}'")),
        }
    }
}

/// A post and the tag identifiers attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub tags: Vec<Tag>,
}

impl Post {
    pub fn new<I, S>(id: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            id: id.into(),
            tags: tags.into_iter().map(|t| Tag::from(t.as_ref())).collect(),
        }
    }

    /// Tags with duplicates collapsed, in byte-wise order.
    pub fn distinct_tags(&self) -> Vec<Tag> {
        let mut tags = self.tags.clone();
        tags.sort_unstable();
        tags.dedup();
        tags
    }
}

/// An unordered pair of two distinct tags in canonical `(min, max)` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagPair {
    first: Tag,
    second: Tag,
}

impl TagPair {
    /// Canonicalize `a` and `b` under `order`. Returns `None` for a self-pair.
    pub fn new(a: Tag, b: Tag, order: TagOrder) -> Option<Self> {
        match order.compare(&a, &b) {
            Ordering::Less => Some(Self {
                first: a,
                second: b,
            }),
            Ordering::Greater => Some(Self {
                first: b,
                second: a,
            }),
            Ordering::Equal => None,
        }
    }

    pub fn first(&self) -> &Tag {
        &self.first
    }

    pub fn second(&self) -> &Tag {
        &self.second
    }

    pub fn as_strs(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }

    pub fn into_tags(self) -> (Tag, Tag) {
        (self.first, self.second)
    }
}

impl fmt::Display for TagPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}
