//! Metrics roll-up engine
//!
//! Folds per-commit facts and oracle assessments into per-repository and
//! per-employee metrics, merges the same employee across repositories, and
//! derives the team-wide score.
//!
//! The pipeline is strictly sequential: repositories are processed one at a
//! time in configuration order, and within a repository oracle calls are
//! issued one commit at a time. Per-commit and per-repository failures
//! degrade to defaults or skips; nothing short of a programmer error or an
//! interrupt aborts the whole evaluation.

pub mod report;

pub use report::generate_report;

use crate::config::{EvalConfig, MetricsWeights};
use crate::git::{MultiRepoHistory, RepoHistory};
use crate::models::{
    performance_band_for, CommitAssessment, CommitFact, CommitKind, ConfigEcho, EmployeeMetrics,
    EvaluationResult, RepositoryMetrics,
};
use crate::oracle::CommitAnalyzer;
use crate::scoring::{compute_productivity, round2};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};
use uuid::Uuid;

/// Orchestrates one full evaluation run.
pub struct EfficiencyEngine {
    config: EvalConfig,
    analyzer: CommitAnalyzer,
}

impl EfficiencyEngine {
    pub fn new(config: EvalConfig, analyzer: CommitAnalyzer) -> Self {
        Self { config, analyzer }
    }

    /// Run the evaluation for a named period (or an explicit day count).
    pub fn run_evaluation(
        &mut self,
        period: &str,
        custom_days: Option<i64>,
    ) -> Result<EvaluationResult> {
        let since_days = self.config.resolve_window_days(period, custom_days);
        let end_date = Utc::now();
        let start_date = end_date - Duration::days(since_days);

        info!("Starting efficiency evaluation, period: {period} ({since_days} days)");

        let mut result = EvaluationResult {
            evaluation_id: Uuid::new_v4().to_string(),
            evaluation_name: format!(
                "efficiency_evaluation_{period}_{}",
                end_date.format("%Y%m%d")
            ),
            evaluation_period: period.to_string(),
            start_date,
            end_date,
            repositories: BTreeMap::new(),
            repository_order: Vec::new(),
            employees: BTreeMap::new(),
            total_repositories: self.config.repositories.len(),
            total_employees: 0,
            overall_team_score: 0.0,
            config_used: self.config_echo(period, since_days),
            generated_at: end_date,
        };

        let repositories = self.config.repositories.clone();
        let histories = MultiRepoHistory::open_all(&repositories);
        let mut per_repo_employees = Vec::new();

        for repo_config in &repositories {
            let Some(history) = histories.get(&repo_config.name) else {
                continue; // open failure already logged
            };

            let facts = match history.collect_facts(&self.config.git, since_days) {
                Ok(facts) => facts,
                Err(e) => {
                    warn!("Skipping repository {}: {e:#}", repo_config.name);
                    continue;
                }
            };

            info!(
                "Analyzing repository {}: {} commits",
                repo_config.name,
                facts.len()
            );

            let diffs = collect_diffs(history, &facts);
            let assessments = self.assess_commits(&repo_config.name, &facts, &diffs);

            let mut repo_metrics = compute_repository_metrics(
                &repo_config.name,
                &repo_config.path.to_string_lossy(),
                repo_config.weight,
                &facts,
                &assessments,
                since_days,
            );
            let employees = compute_employee_metrics(
                &self.config,
                &repo_config.name,
                &facts,
                &assessments,
                since_days,
                start_date,
                end_date,
            );
            repo_metrics.employee_contributions = employees.clone();

            result.repository_order.push(repo_config.name.clone());
            result
                .repositories
                .insert(repo_config.name.clone(), repo_metrics);
            per_repo_employees.push(employees);
        }

        result.employees = merge_employee_metrics(&self.config.metrics, per_repo_employees);
        result.total_employees = result.employees.len();
        result.overall_team_score = team_score(&result.employees);

        info!(
            "Evaluation complete: {} repositories, {} employees, team score {}",
            result.repositories.len(),
            result.total_employees,
            result.overall_team_score
        );

        Ok(result)
    }

    /// Score a repository's commits in order, one oracle call at a time.
    fn assess_commits(
        &mut self,
        repo_name: &str,
        facts: &[CommitFact],
        diffs: &HashMap<String, String>,
    ) -> Vec<CommitAssessment> {
        let pb = ProgressBar::new(facts.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{prefix} [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb.set_prefix(repo_name.to_string());

        let mut assessments = Vec::with_capacity(facts.len());
        for fact in facts {
            pb.set_message(fact.hash.clone());
            let diff = diffs.get(&fact.hash).map(String::as_str).unwrap_or("");
            assessments.push(self.analyzer.assess(fact, diff));
            pb.inc(1);
        }
        pb.finish_and_clear();
        assessments
    }

    fn config_echo(&self, period: &str, since_days: i64) -> ConfigEcho {
        let w = &self.config.metrics;
        ConfigEcho {
            metrics_weights: BTreeMap::from([
                ("code_quality".to_string(), w.code_quality),
                ("productivity".to_string(), w.productivity),
                ("collaboration".to_string(), w.collaboration),
                ("innovation".to_string(), w.innovation),
                ("maintenance".to_string(), w.maintenance),
            ]),
            evaluation_period: period.to_string(),
            since_days,
        }
    }
}

/// Fetch the diff for every commit; a failed lookup scores as empty content.
fn collect_diffs(history: &RepoHistory, facts: &[CommitFact]) -> HashMap<String, String> {
    let mut diffs = HashMap::with_capacity(facts.len());
    for fact in facts {
        match history.diff_text(&fact.full_hash) {
            Ok(diff) => {
                diffs.insert(fact.hash.clone(), diff);
            }
            Err(e) => {
                warn!("Failed to get diff for {}: {e:#}", fact.hash);
                diffs.insert(fact.hash.clone(), String::new());
            }
        }
    }
    diffs
}

/// Roll one repository's commit stream into [`RepositoryMetrics`].
pub fn compute_repository_metrics(
    name: &str,
    path: &str,
    weight: f64,
    facts: &[CommitFact],
    assessments: &[CommitAssessment],
    since_days: i64,
) -> RepositoryMetrics {
    let total_commits = facts.len();
    let total_lines_added: usize = facts.iter().map(|f| f.lines_added).sum();
    let total_lines_deleted: usize = facts.iter().map(|f| f.lines_deleted).sum();

    let contributors: std::collections::BTreeSet<&str> =
        facts.iter().map(|f| f.author_email.as_str()).collect();

    let average_code_quality = if assessments.is_empty() {
        0.0
    } else {
        assessments.iter().map(|a| a.score).sum::<f64>() / assessments.len() as f64
    };

    let commits_per_day = if total_commits > 0 && since_days > 0 {
        total_commits as f64 / since_days as f64
    } else {
        0.0
    };

    let average_complexity = if assessments.is_empty() {
        0.0
    } else {
        assessments.iter().map(|a| a.complexity.proxy()).sum::<f64>() / assessments.len() as f64
    };

    RepositoryMetrics {
        repository_name: name.to_string(),
        repository_path: path.to_string(),
        weight,
        total_commits,
        total_contributors: contributors.len(),
        net_lines_of_code: total_lines_added as i64 - total_lines_deleted as i64,
        average_code_quality,
        commits_per_day,
        last_commit_date: facts.iter().map(|f| f.timestamp).max(),
        average_complexity,
        employee_contributions: BTreeMap::new(),
    }
}

/// Roll one repository's commit stream into per-employee metrics.
///
/// Commits group by author email. Assessments pair with commits by list
/// position; an employee whose commits extend past the assessment list
/// truncates to the shorter side. Employees with zero commits in the window
/// never appear in the map.
pub fn compute_employee_metrics(
    config: &EvalConfig,
    repo_name: &str,
    facts: &[CommitFact],
    assessments: &[CommitAssessment],
    window_days: i64,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> BTreeMap<String, EmployeeMetrics> {
    let mut commits_by_employee: BTreeMap<String, Vec<&CommitFact>> = BTreeMap::new();
    let mut assessments_by_employee: BTreeMap<String, Vec<&CommitAssessment>> = BTreeMap::new();

    for (i, fact) in facts.iter().enumerate() {
        commits_by_employee
            .entry(fact.author_email.clone())
            .or_default()
            .push(fact);
        if let Some(assessment) = assessments.get(i) {
            assessments_by_employee
                .entry(fact.author_email.clone())
                .or_default()
                .push(assessment);
        }
    }

    let mut metrics = BTreeMap::new();

    for (email, commits) in commits_by_employee {
        let employee_assessments = assessments_by_employee.remove(&email).unwrap_or_default();

        let total_commits = commits.len();
        let total_lines_added: usize = commits.iter().map(|c| c.lines_added).sum();
        let total_lines_deleted: usize = commits.iter().map(|c| c.lines_deleted).sum();
        let total_files_changed: usize = commits.iter().map(|c| c.files_changed.len()).sum();

        // Numeric quality preferred per commit; the combined score stands in
        // where the oracle never returned numbers.
        let (average_code_quality_score, bug_fix_ratio) = if employee_assessments.is_empty() {
            (0.0, 0.0)
        } else {
            let quality_sum: f64 = employee_assessments
                .iter()
                .map(|a| match a.code_quality_score {
                    Some(score) => score / 100.0,
                    None => a.score,
                })
                .sum();
            let bugfixes = commits
                .iter()
                .filter(|c| c.kind == CommitKind::Bugfix)
                .count();
            (
                quality_sum / employee_assessments.len() as f64,
                bugfixes as f64 / total_commits as f64,
            )
        };

        let owned_commits: Vec<CommitFact> = commits.iter().map(|c| (*c).clone()).collect();
        let owned_assessments: Vec<CommitAssessment> = employee_assessments
            .iter()
            .map(|a| (*a).clone())
            .collect();
        let productivity = compute_productivity(&owned_commits, &owned_assessments, window_days);

        let lines_per_commit = if total_commits > 0 {
            total_lines_added as f64 / total_commits as f64
        } else {
            0.0
        };
        let average_commit_size = if total_commits > 0 {
            (total_lines_added + total_lines_deleted) as f64 / total_commits as f64
        } else {
            0.0
        };

        let new_features_contributed = commits
            .iter()
            .filter(|c| c.kind == CommitKind::Feature)
            .count();
        let maintenance_commits = commits
            .iter()
            .filter(|c| matches!(c.kind, CommitKind::Bugfix | CommitKind::Refactor))
            .count();

        let overall_score = overall_employee_score(
            &config.metrics,
            average_code_quality_score,
            productivity.productivity_score,
            bug_fix_ratio,
            new_features_contributed,
            maintenance_commits,
        );
        let band = performance_band_for(overall_score);

        metrics.insert(
            email.clone(),
            EmployeeMetrics {
                employee_id: email.clone(),
                employee_name: config.employee_name(&email),
                email,
                repositories: vec![repo_name.to_string()],
                total_commits,
                total_lines_added,
                total_lines_deleted,
                total_files_changed,
                average_code_quality_score,
                bug_fix_ratio,
                commits_per_day: productivity.commits_per_day,
                lines_per_commit,
                average_commit_size,
                productivity_score: productivity.productivity_score,
                code_output_score: productivity.code_output_score,
                commit_efficiency: productivity.commit_efficiency,
                file_impact_score: productivity.file_impact_score,
                complexity_multiplier: productivity.complexity_multiplier,
                effort_multiplier: productivity.effort_multiplier,
                tech_multiplier: productivity.tech_multiplier,
                net_code_output: productivity.net_code_output,
                new_features_contributed,
                maintenance_commits,
                overall_score,
                performance_level: band.level.to_string(),
                analysis_period: format!("{window_days} days"),
                start_date,
                end_date,
            },
        );
    }

    metrics
}

/// Weighted employee overall score, rounded to 2 decimals.
///
/// The productivity slot is normalized with `min(x, 1)`; the innovation and
/// maintenance counters saturate at 5 features and 10 maintenance commits.
pub fn overall_employee_score(
    weights: &MetricsWeights,
    quality_score: f64,
    productivity_score: f64,
    bug_fix_ratio: f64,
    new_features: usize,
    maintenance_commits: usize,
) -> f64 {
    let normalized_productivity = productivity_score.min(1.0);
    let normalized_innovation = (new_features as f64 / 5.0).min(1.0);
    let normalized_maintenance = (maintenance_commits as f64 / 10.0).min(1.0);

    round2(
        quality_score * weights.code_quality
            + normalized_productivity * weights.productivity
            + bug_fix_ratio * weights.collaboration
            + normalized_innovation * weights.innovation
            + normalized_maintenance * weights.maintenance,
    )
}

/// Merge per-repository employee maps, folding repositories in processing
/// order.
///
/// Additive fields sum. Rate fields (quality, lines-per-commit, commit size)
/// take the pairwise mean of the merged-so-far value and the incoming value
/// on every fold, so the result depends on repository order; downstream
/// consumers rely on this exact fold, so it must not be swapped for a
/// volume-weighted average. After each fold the overall score is recomputed
/// with the summed commits-per-day standing in for the productivity slot.
pub fn merge_employee_metrics(
    weights: &MetricsWeights,
    per_repo: Vec<BTreeMap<String, EmployeeMetrics>>,
) -> BTreeMap<String, EmployeeMetrics> {
    let mut merged: BTreeMap<String, EmployeeMetrics> = BTreeMap::new();

    for repo_metrics in per_repo {
        for (email, metrics) in repo_metrics {
            match merged.get_mut(&email) {
                Some(existing) => {
                    existing.total_commits += metrics.total_commits;
                    existing.total_lines_added += metrics.total_lines_added;
                    existing.total_lines_deleted += metrics.total_lines_deleted;
                    existing.total_files_changed += metrics.total_files_changed;
                    existing.repositories.extend(metrics.repositories);
                    existing.repositories.sort();
                    existing.repositories.dedup();

                    // Pairwise re-averaging, not volume weighted.
                    existing.average_code_quality_score =
                        (existing.average_code_quality_score + metrics.average_code_quality_score)
                            / 2.0;
                    existing.commits_per_day += metrics.commits_per_day;
                    existing.lines_per_commit =
                        (existing.lines_per_commit + metrics.lines_per_commit) / 2.0;
                    existing.average_commit_size =
                        (existing.average_commit_size + metrics.average_commit_size) / 2.0;

                    // Merge recompute: summed cadence stands in for the
                    // productivity score here, unlike the single-repository
                    // computation above.
                    existing.overall_score = overall_employee_score(
                        weights,
                        existing.average_code_quality_score,
                        existing.commits_per_day,
                        existing.bug_fix_ratio,
                        existing.new_features_contributed,
                        existing.maintenance_commits,
                    );
                    existing.performance_level =
                        performance_band_for(existing.overall_score).level.to_string();
                }
                None => {
                    merged.insert(email, metrics);
                }
            }
        }
    }

    merged
}

/// Unweighted mean of all employee overall scores, rounded to 2 decimals.
pub fn team_score(employees: &BTreeMap<String, EmployeeMetrics>) -> f64 {
    if employees.is_empty() {
        return 0.0;
    }
    let total: f64 = employees.values().map(|e| e.overall_score).sum();
    round2(total / employees.len() as f64)
}
