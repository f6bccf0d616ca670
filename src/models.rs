//! Core data models for gitgauge
//!
//! These models are used throughout the codebase for representing
//! commit facts, oracle assessments, and aggregated evaluation results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of change a commit represents, derived from its message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum CommitKind {
    Feature,
    Bugfix,
    Refactor,
    Documentation,
    Test,
    Merge,
    #[default]
    Other,
}

impl CommitKind {
    /// Classify a commit message by first-match keyword scan.
    ///
    /// Precedence is fixed: bugfix keywords win over feature keywords,
    /// so "fix feature toggle" classifies as a bugfix.
    pub fn from_message(message: &str) -> Self {
        let msg = message.to_lowercase();
        let contains_any = |keywords: &[&str]| keywords.iter().any(|k| msg.contains(k));

        if contains_any(&["fix", "bug", "issue", "error"]) {
            CommitKind::Bugfix
        } else if contains_any(&["feat", "feature", "add", "implement"]) {
            CommitKind::Feature
        } else if contains_any(&["refactor", "refactoring"]) {
            CommitKind::Refactor
        } else if contains_any(&["doc", "documentation", "readme"]) {
            CommitKind::Documentation
        } else if contains_any(&["test", "spec", "specs"]) {
            CommitKind::Test
        } else if contains_any(&["merge", "pull request"]) {
            CommitKind::Merge
        } else {
            CommitKind::Other
        }
    }
}

impl std::fmt::Display for CommitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitKind::Feature => write!(f, "feature"),
            CommitKind::Bugfix => write!(f, "bugfix"),
            CommitKind::Refactor => write!(f, "refactor"),
            CommitKind::Documentation => write!(f, "documentation"),
            CommitKind::Test => write!(f, "test"),
            CommitKind::Merge => write!(f, "merge"),
            CommitKind::Other => write!(f, "other"),
        }
    }
}

/// Code quality tier derived from the numeric quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Excellent,
    Good,
    #[default]
    Medium,
    Poor,
}

impl QualityTier {
    /// Derive the tier from a 0-100 quality score.
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            QualityTier::Excellent
        } else if score >= 70.0 {
            QualityTier::Good
        } else if score >= 50.0 {
            QualityTier::Medium
        } else {
            QualityTier::Poor
        }
    }
}

/// Complexity tier derived from the numeric complexity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl ComplexityTier {
    /// Derive the tier from a 0-100 complexity score.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ComplexityTier::High
        } else if score >= 40.0 {
            ComplexityTier::Medium
        } else {
            ComplexityTier::Low
        }
    }

    /// Fixed numeric proxy used when averaging complexity across commits.
    pub fn proxy(&self) -> f64 {
        match self {
            ComplexityTier::Low => 0.3,
            ComplexityTier::Medium => 0.6,
            ComplexityTier::High => 1.0,
        }
    }
}

/// Effort tier derived from the numeric effort score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EffortTier {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl EffortTier {
    /// Derive the tier from a 0-100 effort score.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            EffortTier::Hard
        } else if score >= 40.0 {
            EffortTier::Medium
        } else {
            EffortTier::Easy
        }
    }
}

/// A single observed commit. Created once per commit, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitFact {
    /// Short hash (7 characters)
    pub hash: String,
    /// Full commit hash
    pub full_hash: String,
    /// Author display name
    pub author: String,
    /// Author email (employee identity)
    pub author_email: String,
    /// Full commit message
    pub message: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
    /// Files changed in this commit
    pub files_changed: Vec<String>,
    /// Total lines added
    pub lines_added: usize,
    /// Total lines deleted
    pub lines_deleted: usize,
    /// Derived commit kind
    pub kind: CommitKind,
    /// Owning repository name
    pub repository: String,
    /// Branch the commit was observed on
    pub branch: String,
    /// Link to the commit on GitHub, when the origin remote points there
    pub link: Option<String>,
}

/// Oracle-derived quality assessment for a single commit.
///
/// The categorical tiers are a pure function of the numeric scores whenever
/// those are present; they are stored alongside for report rendering and for
/// the legacy cache shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAssessment {
    pub commit_hash: String,
    pub complexity: ComplexityTier,
    pub code_quality: QualityTier,
    pub effort: EffortTier,
    pub summary: Vec<String>,
    pub analysis: Vec<String>,
    pub advice: Vec<String>,
    pub reasoning: BTreeMap<String, String>,
    /// Combined score in [0,1]: mean of the three numeric scores / 100.
    pub score: f64,
    /// Numeric quality score in [0,100]; absent on fallback assessments.
    pub code_quality_score: Option<f64>,
    /// Numeric complexity score in [0,100]; absent on fallback assessments.
    pub complexity_score: Option<f64>,
    /// Numeric effort score in [0,100]; absent on fallback assessments.
    pub effort_score: Option<f64>,
}

/// Aggregated metrics for one employee.
///
/// Within a single repository this is a full recomputation from that
/// repository's commit stream. Across repositories the same employee
/// (keyed by email) is folded together by [`crate::engine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeMetrics {
    pub employee_id: String,
    pub employee_name: String,
    pub email: String,
    pub repositories: Vec<String>,

    // Summed counts
    pub total_commits: usize,
    pub total_lines_added: usize,
    pub total_lines_deleted: usize,
    pub total_files_changed: usize,

    // Quality
    pub average_code_quality_score: f64,
    pub bug_fix_ratio: f64,

    // Rates
    pub commits_per_day: f64,
    pub lines_per_commit: f64,
    pub average_commit_size: f64,

    // Productivity breakdown
    pub productivity_score: f64,
    pub code_output_score: f64,
    pub commit_efficiency: f64,
    pub file_impact_score: f64,
    pub complexity_multiplier: f64,
    pub effort_multiplier: f64,
    pub tech_multiplier: f64,
    pub net_code_output: i64,

    // Innovation / maintenance counters
    pub new_features_contributed: usize,
    pub maintenance_commits: usize,

    // Combined
    pub overall_score: f64,
    pub performance_level: String,

    // Evaluation window
    pub analysis_period: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Aggregated metrics for one repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryMetrics {
    pub repository_name: String,
    pub repository_path: String,
    pub weight: f64,

    pub total_commits: usize,
    pub total_contributors: usize,
    /// Net lines of code over the window (added minus deleted)
    pub net_lines_of_code: i64,

    /// Mean of per-commit combined scores
    pub average_code_quality: f64,
    /// Commit count divided by the lookback window in days
    pub commits_per_day: f64,
    pub last_commit_date: Option<DateTime<Utc>>,
    /// Mean of per-commit complexity tier proxies (low=0.3, medium=0.6, high=1.0)
    pub average_complexity: f64,

    /// Per-employee contributions within this repository, keyed by email
    pub employee_contributions: BTreeMap<String, EmployeeMetrics>,
}

/// Top-level result of one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub evaluation_id: String,
    pub evaluation_name: String,
    pub evaluation_period: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    /// Per-repository metrics, keyed by repository name
    pub repositories: BTreeMap<String, RepositoryMetrics>,
    /// Repository names in processing (configuration) order.
    /// The cross-repository employee merge folds in this order.
    pub repository_order: Vec<String>,
    /// Merged per-employee metrics, keyed by email
    pub employees: BTreeMap<String, EmployeeMetrics>,

    pub total_repositories: usize,
    pub total_employees: usize,
    /// Unweighted mean of all employee overall scores
    pub overall_team_score: f64,

    /// Echo of the configuration that produced this result
    pub config_used: ConfigEcho,
    pub generated_at: DateTime<Utc>,
}

/// The slice of configuration recorded inside an [`EvaluationResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEcho {
    pub metrics_weights: BTreeMap<String, f64>,
    pub evaluation_period: String,
    pub since_days: i64,
}

/// One of the five fixed performance bands covering [0,1].
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceBand {
    pub level: &'static str,
    pub min_score: f64,
    pub max_score: f64,
    pub description: &'static str,
    pub recommendations: &'static [&'static str],
}

/// The five ordered, non-overlapping performance bands, best first.
pub const PERFORMANCE_BANDS: &[PerformanceBand] = &[
    PerformanceBand {
        level: "excellent",
        min_score: 0.9,
        max_score: 1.0,
        description: "Excellent - outstanding performance, a core contributor",
        recommendations: &[
            "Keep up the current high standard",
            "Consider taking on more technical leadership",
            "Share best practices with the team",
        ],
    },
    PerformanceBand {
        level: "good",
        min_score: 0.7,
        max_score: 0.89,
        description: "Good - consistent performance, works independently",
        recommendations: &[
            "Deepen expertise in a focus area",
            "Participate in more code reviews",
            "Take on more challenging tasks",
        ],
    },
    PerformanceBand {
        level: "average",
        min_score: 0.5,
        max_score: 0.69,
        description: "Average - meets expectations with room to improve",
        recommendations: &[
            "Raise attention to code quality",
            "Improve commit frequency and consistency",
            "Invest in training and learning",
        ],
    },
    PerformanceBand {
        level: "below_average",
        min_score: 0.3,
        max_score: 0.49,
        description: "Below average - needs focused attention",
        recommendations: &[
            "Put a concrete improvement plan in place",
            "Seek mentorship",
            "Strengthen foundational skills",
        ],
    },
    PerformanceBand {
        level: "poor",
        min_score: 0.0,
        max_score: 0.29,
        description: "Poor - immediate action required",
        recommendations: &[
            "Put a strict improvement plan in place",
            "Consider a role adjustment",
            "Provide support and training",
        ],
    },
];

/// Look up the performance band containing a score.
///
/// Linear scan over [`PERFORMANCE_BANDS`]; bands are closed and contiguous
/// over [0,1], so out-of-range scores fall through to the worst band.
pub fn performance_band_for(score: f64) -> &'static PerformanceBand {
    for band in PERFORMANCE_BANDS {
        if band.min_score <= score && score <= band.max_score {
            return band;
        }
    }
    &PERFORMANCE_BANDS[PERFORMANCE_BANDS.len() - 1]
}

/// Per-repository activity entry in the charts data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoActivity {
    pub commits_per_day: f64,
    pub total_commits: usize,
    pub contributors: usize,
}

/// Per-employee score entry in the charts data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeScore {
    pub overall_score: f64,
    pub quality_score: f64,
    pub productivity: f64,
}

/// Chart-ready data derived from an evaluation result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartsData {
    /// Headcount per performance level
    pub performance_distribution: BTreeMap<String, usize>,
    /// Activity per repository name
    pub repository_activity: BTreeMap<String, RepoActivity>,
    /// Scores per employee display name
    pub employee_scores: BTreeMap<String, EmployeeScore>,
}

/// Rendered evaluation report consumed by the reporters.
#[derive(Debug, Clone, Serialize)]
pub struct EfficiencyReport {
    pub report_id: String,
    pub report_type: String,
    pub evaluation_result: EvaluationResult,

    pub summary: String,
    pub key_findings: Vec<String>,
    pub recommendations: Vec<String>,
    pub charts_data: ChartsData,

    pub generated_at: DateTime<Utc>,
}
