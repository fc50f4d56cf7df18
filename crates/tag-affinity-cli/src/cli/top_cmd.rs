//! `tag-affinity top <pairs>` — print the scored-pair table sorted by any column.

use crate::cli::output;
use crate::input;
use anyhow::Result;
use std::path::Path;
use tag_affinity::{ScoredPair, SortColumn, SortDirection, TagOrder};

pub fn run(
    pairs_path: &Path,
    column: SortColumn,
    direction: SortDirection,
    limit: usize,
    order: TagOrder,
) -> Result<()> {
    let rows = top_rows(pairs_path, column, direction, limit, order)?;

    if output::is_json() {
        output::print_json(&serde_json::to_value(&rows)?);
        return Ok(());
    }

    for line in format_rows(&rows) {
        println!("{line}");
    }
    Ok(())
}

/// The first `limit` rows of the table at `pairs_path`, sorted by `column`.
pub fn top_rows(
    pairs_path: &Path,
    column: SortColumn,
    direction: SortDirection,
    limit: usize,
    order: TagOrder,
) -> Result<Vec<ScoredPair>> {
    let table = input::read_pairs(pairs_path, order)?;
    Ok(table
        .sorted_by(column, direction)
        .into_iter()
        .take(limit)
        .cloned()
        .collect())
}

/// Fixed-width table lines, header first.
pub fn format_rows(rows: &[ScoredPair]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|r| r.tag1.len().max(r.tag2.len()))
        .max()
        .unwrap_or(0)
        .max(4);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!(
        "{:<width$}  {:<width$}  {:>10}  {:>10}  {:>10}  {:>10}",
        "tag1", "tag2", "co", "tag1_count", "tag2_count", "similarity"
    ));
    for r in rows {
        lines.push(format!(
            "{:<width$}  {:<width$}  {:>10}  {:>10}  {:>10}  {:>10.6}",
            r.tag1, r.tag2, r.co_occurrence_count, r.tag1_count, r.tag2_count, r.similarity
        ));
    }
    lines
}
