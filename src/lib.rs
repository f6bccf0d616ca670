//! Gitgauge - multi-repository git productivity evaluation
//!
//! Aggregates git history across configured repositories, derives
//! per-commit quality/complexity/effort signals through an external LLM
//! oracle (cached, retried, rate limited), and rolls the results into
//! per-employee and per-repository productivity metrics with a five-tier
//! performance classification.

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod git;
pub mod models;
pub mod oracle;
pub mod reporters;
pub mod scoring;
