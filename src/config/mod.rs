//! Configuration module for gitgauge
//!
//! Loads evaluation settings from a `gitgauge.toml` file into an immutable
//! [`EvalConfig`] value that is passed into every component constructor.
//! There is deliberately no ambient global configuration state.
//!
//! # Configuration Format
//!
//! ```toml
//! # gitgauge.toml
//!
//! [oracle]
//! model = "openai/gpt-4o"
//! max_retries = 6
//! base_delay_secs = 1.0
//! request_interval_secs = 1.0
//!
//! [git]
//! max_commits = 1000
//! since_days = 30
//! exclude_merge_commits = true
//! exclude_empty_commits = true
//!
//! [metrics]
//! code_quality = 0.3
//! productivity = 0.25
//! collaboration = 0.2
//! innovation = 0.15
//! maintenance = 0.1
//!
//! [[repositories]]
//! name = "backend"
//! path = "/srv/repos/backend"
//! weight = 1.0
//!
//! [employees]
//! "Ada Lovelace" = ["ada@example.com", "ada@old-domain.example"]
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Oracle client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Model identifier sent to the oracle backend
    pub model: String,
    /// Maximum attempts per commit before degrading to the default assessment
    pub max_retries: u32,
    /// Base delay in seconds for non-rate-limit retry backoff
    pub base_delay_secs: f64,
    /// Minimum spacing between requests in seconds (floored at 2s at runtime)
    pub request_interval_secs: f64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            max_retries: 6,
            base_delay_secs: 1.0,
            request_interval_secs: 1.0,
        }
    }
}

/// Git history extraction settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Hard cap on commits walked per repository
    pub max_commits: usize,
    /// Default lookback window in days
    pub since_days: i64,
    /// Drop merge commits whose first-parent diff is empty
    pub exclude_merge_commits: bool,
    /// Drop commits with no changes at all
    pub exclude_empty_commits: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            max_commits: 1000,
            since_days: 30,
            exclude_merge_commits: true,
            exclude_empty_commits: true,
        }
    }
}

/// Weights for the employee overall-score formula.
///
/// Expected (by convention, not enforced) to sum to 1.0.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsWeights {
    pub code_quality: f64,
    pub productivity: f64,
    pub collaboration: f64,
    pub innovation: f64,
    pub maintenance: f64,
}

impl Default for MetricsWeights {
    fn default() -> Self {
        Self {
            code_quality: 0.3,
            productivity: 0.25,
            collaboration: 0.2,
            innovation: 0.15,
            maintenance: 0.1,
        }
    }
}

/// One evaluated repository.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    pub name: String,
    pub path: PathBuf,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub description: String,
}

fn default_weight() -> f64 {
    1.0
}

/// A named evaluation period (weekly, monthly, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationPeriod {
    pub name: String,
    pub days: i64,
    #[serde(default)]
    pub description: String,
}

/// Output locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base directory for generated result/report files
    pub base_dir: PathBuf,
    /// Override for the assessment cache directory
    pub cache_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("analysis_results"),
            cache_dir: None,
        }
    }
}

/// Complete, immutable evaluation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalConfig {
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub metrics: MetricsWeights,
    pub repositories: Vec<RepositoryConfig>,
    /// Display-name to email-list mapping used to name employees in reports
    #[serde(default)]
    pub employees: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_periods")]
    pub periods: Vec<EvaluationPeriod>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_periods() -> Vec<EvaluationPeriod> {
    vec![
        EvaluationPeriod {
            name: "weekly".into(),
            days: 7,
            description: "Last 7 days".into(),
        },
        EvaluationPeriod {
            name: "monthly".into(),
            days: 30,
            description: "Last 30 days".into(),
        },
        EvaluationPeriod {
            name: "quarterly".into(),
            days: 90,
            description: "Last 90 days".into(),
        },
    ]
}

impl EvalConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: EvalConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        debug!(
            "Loaded config: {} repositories, {} employees",
            config.repositories.len(),
            config.employees.len()
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.repositories.is_empty() {
            bail!("Config must list at least one [[repositories]] entry");
        }
        if self.oracle.max_retries == 0 {
            bail!("oracle.max_retries must be at least 1");
        }
        for repo in &self.repositories {
            if repo.name.is_empty() {
                bail!("Repository entries must have a non-empty name");
            }
        }
        for weight in [
            self.metrics.code_quality,
            self.metrics.productivity,
            self.metrics.collaboration,
            self.metrics.innovation,
            self.metrics.maintenance,
        ] {
            if !(0.0..=1.0).contains(&weight) {
                bail!("Metric weights must be within [0, 1], got {weight}");
            }
        }
        Ok(())
    }

    /// Resolve the lookback window in days for a named period.
    ///
    /// An explicit day count wins; an unknown period name falls back to the
    /// first configured period.
    pub fn resolve_window_days(&self, period: &str, custom_days: Option<i64>) -> i64 {
        if let Some(days) = custom_days {
            return days;
        }
        self.periods
            .iter()
            .find(|p| p.name == period)
            .or_else(|| self.periods.first())
            .map(|p| p.days)
            .unwrap_or(self.git.since_days)
    }

    /// Resolve an employee's display name from an author email.
    ///
    /// Unknown emails map to themselves.
    pub fn employee_name(&self, email: &str) -> String {
        for (name, emails) in &self.employees {
            if emails.iter().any(|e| e == email) {
                return name.clone();
            }
        }
        email.to_string()
    }

    /// Directory for the assessment cache: the configured override, or
    /// `~/.cache/gitgauge/ai-analysis`.
    pub fn cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.output.cache_dir {
            return dir.clone();
        }
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gitgauge")
            .join("ai-analysis")
    }

    /// Example configuration written by `gitgauge init`.
    pub fn example_toml() -> &'static str {
        r#"# gitgauge configuration

[oracle]
# Model identifier; OPENROUTER_MODEL overrides this when set.
model = "gpt-4"
max_retries = 6
base_delay_secs = 1.0
request_interval_secs = 1.0

[git]
max_commits = 1000
since_days = 30
exclude_merge_commits = true
exclude_empty_commits = true

# Weights for the employee overall score. Expected to sum to 1.0.
[metrics]
code_quality = 0.3
productivity = 0.25
collaboration = 0.2
innovation = 0.15
maintenance = 0.1

[[repositories]]
name = "backend"
path = "/path/to/backend"
weight = 1.0
description = "Primary API service"

# Map display names to the emails they commit under.
[employees]
"Ada Lovelace" = ["ada@example.com"]

[output]
base_dir = "analysis_results"
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> EvalConfig {
        toml::from_str(
            r#"
            [[repositories]]
            name = "backend"
            path = "/tmp/backend"
            "#,
        )
        .expect("parse minimal config")
    }

    #[test]
    fn defaults_applied() {
        let config = minimal_config();
        assert_eq!(config.oracle.max_retries, 6);
        assert_eq!(config.git.since_days, 30);
        assert!(config.git.exclude_merge_commits);
        assert_eq!(config.metrics.code_quality, 0.3);
        assert_eq!(config.metrics.maintenance, 0.1);
        assert_eq!(config.repositories[0].weight, 1.0);
        assert_eq!(config.periods.len(), 3);
    }

    #[test]
    fn resolve_window_days_prefers_custom() {
        let config = minimal_config();
        assert_eq!(config.resolve_window_days("monthly", Some(7)), 7);
        assert_eq!(config.resolve_window_days("monthly", None), 30);
        assert_eq!(config.resolve_window_days("weekly", None), 7);
        // Unknown period falls back to the first configured period
        assert_eq!(config.resolve_window_days("decadely", None), 7);
    }

    #[test]
    fn employee_name_mapping() {
        let config: EvalConfig = toml::from_str(
            r#"
            [[repositories]]
            name = "backend"
            path = "/tmp/backend"

            [employees]
            "Ada Lovelace" = ["ada@example.com", "ada@old.example"]
            "#,
        )
        .expect("parse config");

        assert_eq!(config.employee_name("ada@example.com"), "Ada Lovelace");
        assert_eq!(config.employee_name("ada@old.example"), "Ada Lovelace");
        assert_eq!(
            config.employee_name("unknown@example.com"),
            "unknown@example.com"
        );
    }

    #[test]
    fn example_config_parses_and_validates() {
        let config: EvalConfig =
            toml::from_str(EvalConfig::example_toml()).expect("example config parses");
        config.validate().expect("example config validates");
        assert_eq!(config.repositories[0].name, "backend");
    }

    #[test]
    fn empty_repositories_rejected() {
        let config: Result<EvalConfig, _> = toml::from_str("repositories = []");
        let config = config.expect("parses");
        assert!(config.validate().is_err());
    }
}
