//! Human-readable and JSON summaries of pipeline artifacts.

use crate::cli::output::{self, Styled};
use tag_affinity::{AggregationStats, AssociationGraph, ClusterReport, PipelineWarning, ScoredPairTable};

/// Peripherals shown per cluster unless --verbose.
const PREVIEW_PERIPHERALS: usize = 5;

pub fn print_pairs_summary(s: &Styled, stats: &AggregationStats, table: &ScoredPairTable) {
    output::print_section(s, "Pairs");
    output::print_field("Posts", &output::format_count(stats.posts_seen));
    output::print_field("Posts paired", &output::format_count(stats.posts_paired));
    if stats.posts_oversized > 0 {
        output::print_field("Posts skipped", &output::format_count(stats.posts_oversized));
    }
    output::print_field("Pair occurrences", &output::format_count(stats.pair_occurrences));
    output::print_field("Unique pairs", &output::format_count(table.len() as u64));
    eprintln!();
}

pub fn print_cluster_summary(
    s: &Styled,
    graph: &AssociationGraph,
    report: &ClusterReport,
    warnings: &[PipelineWarning],
) {
    output::print_section(s, "Graph");
    let threshold = graph
        .min_cooccurrence()
        .map(output::format_count)
        .unwrap_or_else(|| "none".to_string());
    output::print_field("Min co-occurrence", &threshold);
    output::print_field("Nodes", &output::format_count(graph.node_count() as u64));
    output::print_field("Edges", &output::format_count(graph.edge_count() as u64));
    eprintln!();

    output::print_section(
        s,
        &format!(
            "Clusters (centrality > {}, k = {})",
            report.centrality_threshold, report.cluster_size
        ),
    );
    let preview = if output::is_verbose() {
        report.cluster_size
    } else {
        PREVIEW_PERIPHERALS
    };
    for (core, cluster) in report.cores.iter().zip(&report.clusters) {
        let peripherals: Vec<String> = cluster
            .peripherals
            .iter()
            .take(preview)
            .map(|p| format!("{} {}", p.tag, s.dim(&format!("{:.3}", p.similarity))))
            .collect();
        let more = cluster.peripherals.len().saturating_sub(preview);
        let suffix = if more > 0 {
            s.dim(&format!(", +{more} more"))
        } else {
            String::new()
        };
        eprintln!(
            "    {} {}",
            s.cyan(&format!("{:<24}", core.tag)),
            s.dim(&format!("{:.3}", core.centrality))
        );
        eprintln!("        {}{suffix}", peripherals.join(", "));
    }
    if report.cores.is_empty() {
        eprintln!("    {}", s.dim("(no core tags)"));
    }

    print_warnings(s, warnings);
}

pub fn print_warnings(s: &Styled, warnings: &[PipelineWarning]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!();
    for warning in warnings {
        eprintln!("  {} {}", s.warn_sym(), s.yellow(&warning.to_string()));
    }
}

pub fn clusters_json(
    graph: &AssociationGraph,
    report: &ClusterReport,
    warnings: &[PipelineWarning],
) -> serde_json::Value {
    serde_json::json!({
        "graph": {
            "min_cooccurrence": graph.min_cooccurrence(),
            "nodes": graph.node_count(),
            "edges": graph.edge_count(),
        },
        "report": report,
        "warnings": warnings,
    })
}
