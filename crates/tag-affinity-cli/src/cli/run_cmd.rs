//! `tag-affinity run <posts>` — full pipeline from posts to clusters.

use crate::cli::output::{self, Styled};
use crate::cli::summary;
use crate::input;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;
use tag_affinity::report::{write_pairs_jsonl, write_report_json};
use tag_affinity::{Pipeline, PipelineConfig};

pub const PAIRS_FILE: &str = "pairs.jsonl";
pub const CLUSTERS_FILE: &str = "clusters.json";

/// Run every stage and write `pairs.jsonl` and `clusters.json` into `out_dir`.
pub fn run(
    posts_path: &Path,
    out_dir: &Path,
    tag_counts: Option<&Path>,
    config: PipelineConfig,
) -> Result<()> {
    let s = Styled::new();
    let start = Instant::now();

    let pipeline = Pipeline::new(config).context("invalid pipeline configuration")?;
    let posts = input::read_posts(posts_path)?;
    let output = match tag_counts {
        Some(path) => pipeline.run_with_catalog(&posts, input::read_tag_counts(path)?)?,
        None => pipeline.run(&posts)?,
    };

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir: {}", out_dir.display()))?;
    let pairs_path = out_dir.join(PAIRS_FILE);
    let clusters_path = out_dir.join(CLUSTERS_FILE);
    write_pairs_jsonl(&output.table, BufWriter::new(File::create(&pairs_path)?))
        .with_context(|| format!("failed to write {}", pairs_path.display()))?;
    write_report_json(&output.report, BufWriter::new(File::create(&clusters_path)?))
        .with_context(|| format!("failed to write {}", clusters_path.display()))?;

    let elapsed = start.elapsed();

    if output::is_json() {
        let mut value =
            summary::clusters_json(&output.graph, &output.report, &output.warnings);
        value["stats"] = serde_json::to_value(output.stats)?;
        value["pairs"] = serde_json::json!(output.table.len());
        value["files"] = serde_json::json!({
            "pairs": pairs_path.display().to_string(),
            "clusters": clusters_path.display().to_string(),
        });
        value["duration_ms"] = serde_json::json!(elapsed.as_millis() as u64);
        output::print_json(&value);
        return Ok(());
    }

    if !output::is_quiet() {
        output::print_header(&s);
        summary::print_pairs_summary(&s, &output.stats, &output.table);
        summary::print_cluster_summary(&s, &output.graph, &output.report, &output.warnings);
        eprintln!();
        eprintln!(
            "  {} Done in {}. Wrote {} and {}.",
            s.ok_sym(),
            output::format_elapsed(elapsed.as_millis()),
            pairs_path.display(),
            clusters_path.display()
        );
    }

    Ok(())
}
