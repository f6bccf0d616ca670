//! Markdown reporter
//!
//! GitHub-flavored Markdown suitable for wikis, PR comments, or docs.

use crate::models::EfficiencyReport;
use anyhow::Result;

/// Render report as Markdown
pub fn render(report: &EfficiencyReport) -> Result<String> {
    let result = &report.evaluation_result;
    let mut out = String::new();

    out.push_str("# Gitgauge Evaluation Report\n\n");
    out.push_str(&format!(
        "**Team score:** {:.2}/1.0 | **Period:** {} | **Window:** {} to {}\n\n",
        result.overall_team_score,
        result.evaluation_period,
        result.start_date.format("%Y-%m-%d"),
        result.end_date.format("%Y-%m-%d")
    ));

    out.push_str("## Repositories\n\n");
    out.push_str("| Repository | Commits | Contributors | Commits/day | Avg quality |\n");
    out.push_str("|---|---:|---:|---:|---:|\n");
    for name in &result.repository_order {
        let Some(repo) = result.repositories.get(name) else {
            continue;
        };
        out.push_str(&format!(
            "| {name} | {} | {} | {:.2} | {:.2} |\n",
            repo.total_commits,
            repo.total_contributors,
            repo.commits_per_day,
            repo.average_code_quality
        ));
    }
    out.push('\n');

    out.push_str("## Employees\n\n");
    out.push_str("| Employee | Overall | Level | Commits | Quality | Bug-fix ratio |\n");
    out.push_str("|---|---:|---|---:|---:|---:|\n");
    let mut employees: Vec<_> = result.employees.values().collect();
    employees.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for employee in employees {
        out.push_str(&format!(
            "| {} | {:.2} | {} | {} | {:.2} | {:.2} |\n",
            employee.employee_name,
            employee.overall_score,
            employee.performance_level,
            employee.total_commits,
            employee.average_code_quality_score,
            employee.bug_fix_ratio
        ));
    }
    out.push('\n');

    if !report.key_findings.is_empty() {
        out.push_str("## Key Findings\n\n");
        for finding in &report.key_findings {
            out.push_str(&format!("- {finding}\n"));
        }
        out.push('\n');
    }

    if !report.recommendations.is_empty() {
        out.push_str("## Recommendations\n\n");
        for rec in &report.recommendations {
            out.push_str(&format!("- {rec}\n"));
        }
        out.push('\n');
    }

    Ok(out)
}
