//! CLI command definitions and handlers

mod evaluate;
mod init;
mod list;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gitgauge - multi-repository git productivity evaluation
#[derive(Parser, Debug)]
#[command(name = "gitgauge")]
#[command(
    version,
    about = "Evaluate engineering productivity across git repositories — LLM-scored commit quality rolled into per-employee and per-repository metrics",
    long_about = "Gitgauge walks the recent history of every configured repository, scores each \
commit's quality, complexity, and effort through an LLM oracle (cached and rate limited), and \
rolls the results into per-employee and per-repository productivity metrics with a five-tier \
performance classification.\n\n\
Keys are read from OPENROUTER_API_KEY or OPENAI_API_KEY.",
    after_help = "\
Examples:
  gitgauge evaluate                        Monthly evaluation of configured repos
  gitgauge evaluate --period weekly        Weekly evaluation
  gitgauge evaluate --days 7 --format json Custom 7-day window, JSON output
  gitgauge repos                           List configured repositories
  gitgauge init                            Write an example gitgauge.toml"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "gitgauge.toml")]
    pub config: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the evaluation pipeline and write result/report artifacts
    #[command(after_help = "\
Examples:
  gitgauge evaluate                              Monthly evaluation
  gitgauge evaluate --period quarterly           Quarterly evaluation
  gitgauge evaluate --days 14                    Custom 14-day window
  gitgauge evaluate --format markdown            Markdown to stdout
  gitgauge evaluate --output-dir results         Write artifacts under results/")]
    Evaluate {
        /// Evaluation period
        #[arg(long, default_value = "monthly", value_parser = ["weekly", "monthly", "quarterly"])]
        period: String,

        /// Custom lookback window in days (overrides --period)
        #[arg(long)]
        days: Option<i64>,

        /// Output format: text, json, markdown (or md)
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
        format: String,

        /// Output directory for result/report files (default: from config)
        #[arg(long, short = 'o')]
        output_dir: Option<PathBuf>,
    },

    /// List configured repositories
    Repos,

    /// List configured employees and their emails
    Employees,

    /// Write an example gitgauge.toml config file
    Init,
}

/// Dispatch a parsed CLI invocation. No subcommand runs a default
/// monthly evaluation.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Evaluate {
            period,
            days,
            format,
            output_dir,
        }) => evaluate::run(&cli.config, &period, days, &format, output_dir),
        Some(Commands::Repos) => list::repos(&cli.config),
        Some(Commands::Employees) => list::employees(&cli.config),
        Some(Commands::Init) => init::run(&cli.config),
        None => evaluate::run(&cli.config, "monthly", None, "text", None),
    }
}
