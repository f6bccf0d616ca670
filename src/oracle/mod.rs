//! Quality oracle integration
//!
//! Sends commit metadata and diffs to an external LLM scoring oracle and
//! normalizes its free-form replies into bounded numeric scores. Uses BYOK
//! (bring your own key): API keys are read from environment variables.
//!
//! Calls are rate limited, retried with exponential backoff, and fronted by
//! the on-disk assessment cache. A commit that cannot be scored degrades to
//! a default assessment instead of failing the evaluation.
//!
//! # Environment Variables
//!
//! - `OPENROUTER_API_KEY`: preferred; routes via OpenRouter
//! - `OPENAI_API_KEY`: fallback; routes via OpenAI
//! - `OPENROUTER_MODEL`, `OPENROUTER_REFERER`, `OPENROUTER_TITLE`: optional
//!   OpenRouter overrides

mod analyzer;
mod client;
mod prompts;

pub use analyzer::{default_assessment, parse_reply, CommitAnalyzer, OracleReply, ReplyOutcome};
pub use client::{backoff_delay, LlmBackend, OracleClient};
pub use prompts::{build_assessment_prompt, truncate_diff, MAX_DIFF_CHARS};

use thiserror::Error;

/// Errors that can occur in the oracle module
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Missing API key: set {env_vars}")]
    MissingApiKey { env_vars: String },

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited by the oracle (HTTP 429)")]
    RateLimited,

    #[error("Failed to parse oracle response: {0}")]
    ParseError(String),

    #[error("Oracle call failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

pub type OracleResult<T> = Result<T, OracleError>;
