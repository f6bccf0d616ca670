//! Efficiency report synthesis
//!
//! Turns an [`EvaluationResult`] into an [`EfficiencyReport`]: a free-text
//! summary, rule-based key findings and recommendations, and chart-ready
//! data. All rules are deterministic over the evaluation result.

use crate::models::{
    ChartsData, EfficiencyReport, EmployeeScore, EvaluationResult, RepoActivity,
};
use chrono::Utc;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Repositories above this cadence are called out as highly active.
const HIGH_ACTIVITY_COMMITS_PER_DAY: f64 = 5.0;
/// Repositories below this cadence are called out as low activity.
const LOW_ACTIVITY_COMMITS_PER_DAY: f64 = 1.0;
/// Team scores below this trigger quality-process recommendations.
const TEAM_SCORE_ATTENTION_THRESHOLD: f64 = 0.6;

/// Synthesize the comprehensive report for an evaluation result.
pub fn generate_report(result: &EvaluationResult) -> EfficiencyReport {
    EfficiencyReport {
        report_id: Uuid::new_v4().to_string(),
        report_type: "comprehensive".to_string(),
        evaluation_result: result.clone(),
        summary: generate_summary(result),
        key_findings: generate_key_findings(result),
        recommendations: generate_recommendations(result),
        charts_data: generate_charts_data(result),
        generated_at: Utc::now(),
    }
}

fn performance_distribution(result: &EvaluationResult) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for employee in result.employees.values() {
        *counts.entry(employee.performance_level.clone()).or_insert(0) += 1;
    }
    counts
}

fn generate_summary(result: &EvaluationResult) -> String {
    let distribution = performance_distribution(result);
    let count = |level: &str| distribution.get(level).copied().unwrap_or(0);

    format!(
        "This evaluation covers {repos} repositories and {employees} developers.\n\
         \n\
         Overall team score: {score}/1.0\n\
         \n\
         Performance distribution:\n\
         - excellent: {excellent}\n\
         - good: {good}\n\
         - average: {average}\n\
         - below average: {below}\n\
         - poor: {poor}\n\
         \n\
         Evaluation window: {start} to {end}",
        repos = result.total_repositories,
        employees = result.total_employees,
        score = result.overall_team_score,
        excellent = count("excellent"),
        good = count("good"),
        average = count("average"),
        below = count("below_average"),
        poor = count("poor"),
        start = result.start_date.format("%Y-%m-%d"),
        end = result.end_date.format("%Y-%m-%d"),
    )
}

fn generate_key_findings(result: &EvaluationResult) -> Vec<String> {
    let mut findings = Vec::new();

    if result.overall_team_score >= 0.8 {
        findings.push(
            "Team performance is strong; code quality and delivery pace are both at a high level"
                .to_string(),
        );
    } else if result.overall_team_score >= TEAM_SCORE_ATTENTION_THRESHOLD {
        findings.push(
            "Team performance is good overall, with room for improvement in places".to_string(),
        );
    } else {
        findings.push(
            "Team performance needs attention; consider putting an improvement plan in place"
                .to_string(),
        );
    }

    let distribution = performance_distribution(result);
    if let Some(&poor) = distribution.get("poor").filter(|&&n| n > 0) {
        findings.push(format!(
            "{poor} employee(s) are underperforming and need focused attention"
        ));
    }
    if let Some(&excellent) = distribution.get("excellent").filter(|&&n| n > 0) {
        findings.push(format!(
            "{excellent} employee(s) are performing at an exemplary level"
        ));
    }

    for name in &result.repository_order {
        let Some(repo) = result.repositories.get(name) else {
            continue;
        };
        if repo.commits_per_day > HIGH_ACTIVITY_COMMITS_PER_DAY {
            findings.push(format!(
                "Repository {name} is highly active with a fast development cadence"
            ));
        } else if repo.commits_per_day < LOW_ACTIVITY_COMMITS_PER_DAY {
            findings.push(format!(
                "Repository {name} has low activity and may need attention"
            ));
        }
    }

    findings
}

fn generate_recommendations(result: &EvaluationResult) -> Vec<String> {
    let mut recommendations = Vec::new();

    if result.overall_team_score < TEAM_SCORE_ATTENTION_THRESHOLD {
        recommendations
            .push("Strengthen the code review process to raise code quality".to_string());
        recommendations
            .push("Consider more technical training and knowledge-sharing sessions".to_string());
    }

    let poor_performers = result
        .employees
        .values()
        .filter(|e| e.performance_level == "poor")
        .count();
    if poor_performers > 0 {
        recommendations.push(format!(
            "Create individual improvement plans for {poor_performers} underperforming employee(s)"
        ));
        recommendations.push("Arrange mentorship to help build up skills".to_string());
    }

    let low_activity = result
        .repositories
        .values()
        .filter(|r| r.commits_per_day < LOW_ACTIVITY_COMMITS_PER_DAY)
        .count();
    if low_activity > 0 {
        recommendations.push(
            "Re-evaluate priorities and staffing for low-activity repositories".to_string(),
        );
    }

    recommendations.push("Hold regular code quality reviews".to_string());
    recommendations.push(
        "Encourage open source contributions to broaden technical perspective".to_string(),
    );
    recommendations
        .push("Invest in documentation and knowledge bases to spread expertise".to_string());

    recommendations
}

fn generate_charts_data(result: &EvaluationResult) -> ChartsData {
    let mut charts = ChartsData {
        performance_distribution: performance_distribution(result),
        ..ChartsData::default()
    };

    for (name, repo) in &result.repositories {
        charts.repository_activity.insert(
            name.clone(),
            RepoActivity {
                commits_per_day: repo.commits_per_day,
                total_commits: repo.total_commits,
                contributors: repo.total_contributors,
            },
        );
    }

    for employee in result.employees.values() {
        charts.employee_scores.insert(
            employee.employee_name.clone(),
            EmployeeScore {
                overall_score: employee.overall_score,
                quality_score: employee.average_code_quality_score,
                productivity: employee.commits_per_day,
            },
        );
    }

    charts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{performance_band_for, ConfigEcho, EmployeeMetrics, RepositoryMetrics};

    fn employee(email: &str, overall: f64) -> EmployeeMetrics {
        EmployeeMetrics {
            employee_id: email.into(),
            employee_name: email.into(),
            email: email.into(),
            repositories: vec!["backend".into()],
            total_commits: 10,
            total_lines_added: 100,
            total_lines_deleted: 20,
            total_files_changed: 5,
            average_code_quality_score: 0.6,
            bug_fix_ratio: 0.2,
            commits_per_day: 0.33,
            lines_per_commit: 10.0,
            average_commit_size: 12.0,
            productivity_score: 0.4,
            code_output_score: 0.08,
            commit_efficiency: 0.11,
            file_impact_score: 0.1,
            complexity_multiplier: 0.5,
            effort_multiplier: 0.5,
            tech_multiplier: 1.0,
            net_code_output: 80,
            new_features_contributed: 1,
            maintenance_commits: 2,
            overall_score: overall,
            performance_level: performance_band_for(overall).level.to_string(),
            analysis_period: "30 days".into(),
            start_date: Utc::now(),
            end_date: Utc::now(),
        }
    }

    fn repository(name: &str, commits_per_day: f64) -> RepositoryMetrics {
        RepositoryMetrics {
            repository_name: name.into(),
            repository_path: format!("/tmp/{name}"),
            weight: 1.0,
            total_commits: 30,
            total_contributors: 2,
            net_lines_of_code: 500,
            average_code_quality: 0.7,
            commits_per_day,
            last_commit_date: None,
            average_complexity: 0.6,
            employee_contributions: BTreeMap::new(),
        }
    }

    fn result(team_score: f64, employees: Vec<EmployeeMetrics>) -> EvaluationResult {
        let employees: BTreeMap<String, EmployeeMetrics> = employees
            .into_iter()
            .map(|e| (e.email.clone(), e))
            .collect();
        EvaluationResult {
            evaluation_id: "test".into(),
            evaluation_name: "test_eval".into(),
            evaluation_period: "monthly".into(),
            start_date: Utc::now(),
            end_date: Utc::now(),
            repositories: BTreeMap::new(),
            repository_order: Vec::new(),
            total_employees: employees.len(),
            employees,
            total_repositories: 1,
            overall_team_score: team_score,
            config_used: ConfigEcho {
                metrics_weights: BTreeMap::new(),
                evaluation_period: "monthly".into(),
                since_days: 30,
            },
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn findings_call_out_poor_and_excellent_headcounts() {
        let result = result(
            0.65,
            vec![
                employee("a@example.com", 0.95),
                employee("b@example.com", 0.1),
                employee("c@example.com", 0.6),
            ],
        );
        let findings = generate_key_findings(&result);

        assert!(findings[0].contains("good overall"));
        assert!(findings.iter().any(|f| f.contains("1 employee(s) are underperforming")));
        assert!(findings.iter().any(|f| f.contains("1 employee(s) are performing at an exemplary")));
    }

    #[test]
    fn findings_call_out_repository_activity() {
        let mut res = result(0.85, vec![employee("a@example.com", 0.85)]);
        res.repositories
            .insert("busy".into(), repository("busy", 7.5));
        res.repositories
            .insert("quiet".into(), repository("quiet", 0.2));
        res.repositories
            .insert("steady".into(), repository("steady", 2.0));
        res.repository_order = vec!["busy".into(), "quiet".into(), "steady".into()];

        let findings = generate_key_findings(&res);
        assert!(findings[0].contains("strong"));
        assert!(findings.iter().any(|f| f.contains("busy is highly active")));
        assert!(findings.iter().any(|f| f.contains("quiet has low activity")));
        assert!(!findings.iter().any(|f| f.contains("steady")));
    }

    #[test]
    fn recommendations_follow_trigger_rules() {
        // Healthy team: only the three boilerplate entries.
        let healthy = result(0.8, vec![employee("a@example.com", 0.8)]);
        assert_eq!(generate_recommendations(&healthy).len(), 3);

        // Struggling team with a poor performer and a quiet repository.
        let mut struggling = result(0.4, vec![employee("a@example.com", 0.1)]);
        struggling
            .repositories
            .insert("quiet".into(), repository("quiet", 0.1));
        let recs = generate_recommendations(&struggling);
        assert_eq!(recs.len(), 8);
        assert!(recs[0].contains("code review"));
        assert!(recs.iter().any(|r| r.contains("improvement plans for 1")));
        assert!(recs.iter().any(|r| r.contains("low-activity repositories")));
    }

    #[test]
    fn charts_data_shapes() {
        let mut res = result(
            0.7,
            vec![
                employee("a@example.com", 0.95),
                employee("b@example.com", 0.6),
            ],
        );
        res.repositories
            .insert("backend".into(), repository("backend", 1.0));

        let charts = generate_charts_data(&res);
        assert_eq!(charts.performance_distribution["excellent"], 1);
        assert_eq!(charts.performance_distribution["average"], 1);
        assert_eq!(charts.repository_activity["backend"].total_commits, 30);
        assert_eq!(charts.employee_scores["a@example.com"].overall_score, 0.95);
    }

    #[test]
    fn summary_mentions_score_and_window() {
        let res = result(0.55, vec![employee("a@example.com", 0.55)]);
        let summary = generate_summary(&res);
        assert!(summary.contains("Overall team score: 0.55/1.0"));
        assert!(summary.contains("Evaluation window:"));
    }
}
