//! CLI subcommand implementations for the tag-affinity binary.

pub mod args;
pub mod cluster_cmd;
pub mod output;
pub mod run_cmd;
pub mod score_cmd;
pub mod summary;
pub mod top_cmd;
