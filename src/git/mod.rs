//! Git history analysis module
//!
//! Extracts commit facts (author, timestamps, change stats, derived commit
//! kind) and per-commit diffs from configured repositories using the git2
//! crate (Rust bindings to libgit2).

pub mod history;

pub use history::{MultiRepoHistory, RepoHistory};
