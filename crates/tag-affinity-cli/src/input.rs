//! Readers for the pre-parsed inputs the binary consumes.
//!
//! Posts arrive as JSON Lines, one `{"id": ..., "tags": [...]}` object per
//! line, with tags already split into identifiers.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tag_affinity::report::read_pairs_jsonl;
use tag_affinity::{Post, ScoredPairTable, TagCatalog, TagOrder};
use tracing::info;

#[derive(Deserialize)]
struct PostRecord {
    id: serde_json::Value,
    tags: Vec<String>,
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        let id = match record.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Post::new(id, record.tags)
    }
}

/// Parse posts from JSON Lines. Blank lines are skipped; `source` names the input in errors.
pub fn parse_posts<R: BufRead>(reader: R, source: &str) -> Result<Vec<Post>> {
    let mut posts = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading {source}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: PostRecord = serde_json::from_str(&line)
            .with_context(|| format!("{source}:{}: invalid post record", i + 1))?;
        posts.push(record.into());
    }
    Ok(posts)
}

pub fn read_posts(path: &Path) -> Result<Vec<Post>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open posts file: {}", path.display()))?;
    let posts = parse_posts(BufReader::new(file), &path.display().to_string())?;
    info!(posts = posts.len(), path = %path.display(), "loaded posts");
    Ok(posts)
}

/// Load an independently computed `{"tag": count}` object as the tag catalog.
pub fn read_tag_counts(path: &Path) -> Result<TagCatalog> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read tag counts: {}", path.display()))?;
    let counts: BTreeMap<String, u64> = serde_json::from_str(&data)
        .with_context(|| format!("invalid tag counts in {}", path.display()))?;
    info!(tags = counts.len(), path = %path.display(), "loaded tag counts");
    Ok(TagCatalog::from_counts(counts))
}

/// Load a scored-pair table previously written by `score` or `run`.
pub fn read_pairs(path: &Path, order: TagOrder) -> Result<ScoredPairTable> {
    let file = File::open(path)
        .with_context(|| format!("failed to open pairs file: {}", path.display()))?;
    let table = read_pairs_jsonl(BufReader::new(file), order)
        .with_context(|| format!("failed to load scored pairs from {}", path.display()))?;
    info!(pairs = table.len(), path = %path.display(), "loaded scored pairs");
    Ok(table)
}
