//! `tag-affinity cluster <pairs>` — rebuild the graph and clusters from a
//! scored-pair table, without re-scanning posts.

use crate::cli::output::{self, Styled};
use crate::cli::summary;
use crate::input;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tag_affinity::report::write_report_json;
use tag_affinity::{Pipeline, PipelineConfig};

pub fn run(pairs_path: &Path, out: Option<&Path>, config: PipelineConfig) -> Result<()> {
    let s = Styled::new();

    let pipeline = Pipeline::new(config).context("invalid pipeline configuration")?;
    let table = input::read_pairs(pairs_path, pipeline.config().tag_order)?;
    let stage = pipeline.cluster(&table);

    if let Some(path) = out {
        write_report_json(&stage.report, BufWriter::new(File::create(path)?))
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    if output::is_json() {
        output::print_json(&summary::clusters_json(
            &stage.graph,
            &stage.report,
            &stage.warnings,
        ));
        return Ok(());
    }

    if !output::is_quiet() {
        summary::print_cluster_summary(&s, &stage.graph, &stage.report, &stage.warnings);
        if let Some(path) = out {
            eprintln!();
            eprintln!("  {} Wrote {}.", s.ok_sym(), path.display());
        }
    }

    Ok(())
}
