//! `tag-affinity score <posts>` — aggregate and score pairs without clustering.

use crate::cli::output::{self, Styled};
use crate::cli::summary;
use crate::input;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;
use tag_affinity::report::write_pairs_jsonl;
use tag_affinity::{Pipeline, PipelineConfig, PipelineWarning, TagCatalog};

pub fn run(
    posts_path: &Path,
    out: &Path,
    tag_counts: Option<&Path>,
    config: PipelineConfig,
) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let pipeline = Pipeline::new(config).context("invalid pipeline configuration")?;
    let posts = input::read_posts(posts_path)?;
    let catalog = match tag_counts {
        Some(path) => input::read_tag_counts(path)?,
        None => TagCatalog::from_posts(&posts),
    };

    let aggregation = pipeline.aggregator().aggregate(&posts);
    let stats = aggregation.stats;
    let table = pipeline.score(&aggregation, &catalog)?;

    let mut warnings = Vec::new();
    if stats.posts_oversized > 0 {
        warnings.push(PipelineWarning::OversizedPostsSkipped {
            count: stats.posts_oversized,
            cap: pipeline.config().max_tags_per_post.unwrap_or_default(),
        });
    }
    if table.is_empty() {
        warnings.push(PipelineWarning::NoPairs);
    }

    write_pairs_jsonl(&table, BufWriter::new(File::create(out)?))
        .with_context(|| format!("failed to write {}", out.display()))?;

    let elapsed = start.elapsed();

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "stats": stats,
            "pairs": table.len(),
            "file": out.display().to_string(),
            "warnings": warnings,
            "duration_ms": elapsed.as_millis() as u64,
        }));
        return Ok(());
    }

    if !output::is_quiet() {
        output::print_header(&s);
        summary::print_pairs_summary(&s, &stats, &table);
        summary::print_warnings(&s, &warnings);
        eprintln!(
            "  {} Scored {} pairs in {}. Wrote {}.",
            s.ok_sym(),
            output::format_count(table.len() as u64),
            output::format_elapsed(elapsed.as_millis()),
            out.display()
        );
    }

    Ok(())
}
