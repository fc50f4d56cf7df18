//! Command-line front end for the tag affinity pipeline.

pub mod audit;
pub mod cli;
pub mod input;
