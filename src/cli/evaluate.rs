//! Evaluation command: run the pipeline, persist artifacts, print the report

use crate::cache::AssessmentCache;
use crate::config::EvalConfig;
use crate::engine::{generate_report, EfficiencyEngine};
use crate::models::{EfficiencyReport, EvaluationResult};
use crate::oracle::{CommitAnalyzer, OracleClient};
use crate::reporters;
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(
    config_path: &Path,
    period: &str,
    days: Option<i64>,
    format: &str,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = EvalConfig::load(config_path)?;
    let output_dir = output_dir.unwrap_or_else(|| config.output.base_dir.clone());

    let client = OracleClient::from_env(&config.oracle)?;
    let cache = AssessmentCache::new(config.cache_dir());
    let analyzer = CommitAnalyzer::new(client, cache);

    let mut engine = EfficiencyEngine::new(config, analyzer);
    let result = engine.run_evaluation(period, days)?;
    let report = generate_report(&result);

    save_artifacts(&output_dir, &result, &report)?;

    let rendered = reporters::report(&report, format)?;
    println!("{rendered}");

    Ok(())
}

/// Write the evaluation result and report as timestamped JSON files under
/// `data/` and `reports/` in the output directory.
fn save_artifacts(
    output_dir: &Path,
    result: &EvaluationResult,
    report: &EfficiencyReport,
) -> Result<()> {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");

    let data_dir = output_dir.join("data");
    let reports_dir = output_dir.join("reports");
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    std::fs::create_dir_all(&reports_dir)
        .with_context(|| format!("Failed to create {}", reports_dir.display()))?;

    let result_path = data_dir.join(format!("evaluation_result_{timestamp}.json"));
    std::fs::write(&result_path, serde_json::to_string_pretty(result)?)
        .with_context(|| format!("Failed to write {}", result_path.display()))?;
    info!("Evaluation result written to {}", result_path.display());

    let report_path = reports_dir.join(format!("efficiency_report_{timestamp}.json"));
    std::fs::write(&report_path, serde_json::to_string_pretty(report)?)
        .with_context(|| format!("Failed to write {}", report_path.display()))?;
    info!("Efficiency report written to {}", report_path.display());

    Ok(())
}
