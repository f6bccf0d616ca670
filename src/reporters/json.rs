//! JSON reporter
//!
//! Outputs the full EfficiencyReport as pretty-printed JSON.
//! Useful for machine consumption, piping to jq, or further processing.

use crate::models::EfficiencyReport;
use anyhow::Result;

/// Render report as JSON
pub fn render(report: &EfficiencyReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
