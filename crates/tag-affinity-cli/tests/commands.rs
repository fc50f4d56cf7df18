//! End-to-end checks of the subcommands against files on disk.

use std::fs;
use std::path::Path;
use tag_affinity::{PipelineConfig, SortColumn, SortDirection, TagOrder};
use tag_affinity_cli::cli::{cluster_cmd, run_cmd, score_cmd, top_cmd};
use tag_affinity_cli::input;
use tempfile::tempdir;

const POSTS: &str = r#"{"id": 1, "tags": ["python", "pandas"]}
{"id": 2, "tags": ["python", "pandas", "numpy"]}
{"id": 3, "tags": ["python", "numpy"]}
{"id": "four", "tags": ["rust", "cargo"]}

{"id": 5, "tags": ["python", "django"]}
"#;

fn write_posts(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("posts.jsonl");
    fs::write(&path, POSTS).unwrap();
    path
}

fn quiet() {
    std::env::set_var("TAG_AFFINITY_QUIET", "1");
}

#[test]
fn test_run_writes_pairs_and_clusters() {
    quiet();
    let dir = tempdir().unwrap();
    let posts = write_posts(dir.path());
    let out = dir.path().join("out");

    run_cmd::run(&posts, &out, None, PipelineConfig::default()).unwrap();

    let table = input::read_pairs(&out.join(run_cmd::PAIRS_FILE), TagOrder::Lexicographic).unwrap();
    assert_eq!(table.len(), 5);
    let row = table.get("pandas", "python").unwrap();
    assert_eq!(row.co_occurrence_count, 2);
    assert!((row.similarity - 0.5).abs() < 1e-12);

    let clusters: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(run_cmd::CLUSTERS_FILE)).unwrap())
            .unwrap();
    let cores = clusters["cores"].as_array().unwrap();
    assert_eq!(cores[0]["tag"], "python");
}

#[test]
fn test_score_then_cluster_matches_run() {
    quiet();
    let dir = tempdir().unwrap();
    let posts = write_posts(dir.path());

    let pairs = dir.path().join("pairs.jsonl");
    score_cmd::run(&posts, &pairs, None, PipelineConfig::default()).unwrap();
    let report = dir.path().join("report.json");
    cluster_cmd::run(&pairs, Some(&report), PipelineConfig::default()).unwrap();

    let out = dir.path().join("out");
    run_cmd::run(&posts, &out, None, PipelineConfig::default()).unwrap();

    assert_eq!(
        fs::read(&report).unwrap(),
        fs::read(out.join(run_cmd::CLUSTERS_FILE)).unwrap()
    );
}

#[test]
fn test_score_with_incomplete_tag_counts_fails() {
    quiet();
    let dir = tempdir().unwrap();
    let posts = write_posts(dir.path());
    let counts = dir.path().join("counts.json");
    fs::write(&counts, r#"{"python": 4, "pandas": 2}"#).unwrap();

    let err = score_cmd::run(
        &posts,
        &dir.path().join("pairs.jsonl"),
        Some(&counts),
        PipelineConfig::default(),
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("missing from the tag catalog"));
}

#[test]
fn test_invalid_config_rejected_before_reading_input() {
    quiet();
    let dir = tempdir().unwrap();
    let config = PipelineConfig {
        cluster_size: 0,
        ..PipelineConfig::default()
    };
    let missing = dir.path().join("does-not-exist.jsonl");
    let err = run_cmd::run(&missing, &dir.path().join("out"), None, config).unwrap_err();
    assert!(format!("{err:#}").contains("invalid pipeline configuration"));
}

#[test]
fn test_run_with_supplied_tag_counts_matches_derived() {
    quiet();
    let dir = tempdir().unwrap();
    let posts = write_posts(dir.path());
    let counts = dir.path().join("counts.json");
    fs::write(
        &counts,
        r#"{"python": 4, "pandas": 2, "numpy": 2, "rust": 1, "cargo": 1, "django": 1}"#,
    )
    .unwrap();

    let derived = dir.path().join("derived");
    run_cmd::run(&posts, &derived, None, PipelineConfig::default()).unwrap();
    let supplied = dir.path().join("supplied");
    run_cmd::run(&posts, &supplied, Some(&counts), PipelineConfig::default()).unwrap();

    for file in [run_cmd::PAIRS_FILE, run_cmd::CLUSTERS_FILE] {
        assert_eq!(
            fs::read(derived.join(file)).unwrap(),
            fs::read(supplied.join(file)).unwrap(),
            "{file}"
        );
    }
}

#[test]
fn test_top_sorts_ascending_with_ties_in_pair_order() {
    quiet();
    let dir = tempdir().unwrap();
    let posts = write_posts(dir.path());
    let pairs = dir.path().join("pairs.jsonl");
    score_cmd::run(&posts, &pairs, None, PipelineConfig::default()).unwrap();

    let rows = top_cmd::top_rows(
        &pairs,
        SortColumn::CoOccurrence,
        SortDirection::Ascending,
        4,
        TagOrder::Lexicographic,
    )
    .unwrap();
    let keys: Vec<(&str, &str, u64)> = rows
        .iter()
        .map(|r| (&*r.tag1, &*r.tag2, r.co_occurrence_count))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("cargo", "rust", 1),
            ("django", "python", 1),
            ("numpy", "pandas", 1),
            ("numpy", "python", 2),
        ]
    );

    top_cmd::run(
        &pairs,
        SortColumn::CoOccurrence,
        SortDirection::Ascending,
        4,
        TagOrder::Lexicographic,
    )
    .unwrap();
}
