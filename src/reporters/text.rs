//! Text (terminal) reporter with colors and formatting

use crate::models::EfficiencyReport;
use anyhow::Result;

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Performance level colors (ANSI escape codes)
fn level_color(level: &str) -> &'static str {
    match level {
        "excellent" => "\x1b[32m",     // Green
        "good" => "\x1b[92m",          // Light green
        "average" => "\x1b[33m",       // Yellow
        "below_average" => "\x1b[91m", // Light red
        "poor" => "\x1b[31m",          // Red
        _ => "\x1b[0m",
    }
}

/// Render report as formatted terminal output
pub fn render(report: &EfficiencyReport) -> Result<String> {
    let result = &report.evaluation_result;
    let mut out = String::new();

    // Header
    out.push_str(&format!("\n{BOLD}Gitgauge Evaluation{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Team score: {BOLD}{:.2}/1.0{RESET}  Period: {}  ",
        result.overall_team_score, result.evaluation_period
    ));
    out.push_str(&format!(
        "Repositories: {}  Employees: {}\n",
        result.total_repositories, result.total_employees
    ));
    out.push_str(&format!(
        "{DIM}{} to {}{RESET}\n\n",
        result.start_date.format("%Y-%m-%d"),
        result.end_date.format("%Y-%m-%d")
    ));

    // Repositories
    out.push_str(&format!("{BOLD}REPOSITORIES{RESET}\n"));
    for name in &result.repository_order {
        let Some(repo) = result.repositories.get(name) else {
            continue;
        };
        out.push_str(&format!(
            "  {name}: {} commits, {} contributors, {:.2} commits/day, quality {:.2}\n",
            repo.total_commits,
            repo.total_contributors,
            repo.commits_per_day,
            repo.average_code_quality
        ));
    }
    out.push('\n');

    // Employees, best first
    out.push_str(&format!("{BOLD}EMPLOYEES{RESET}\n"));
    let mut employees: Vec<_> = result.employees.values().collect();
    employees.sort_by(|a, b| {
        b.overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for employee in employees {
        let color = level_color(&employee.performance_level);
        out.push_str(&format!(
            "  {:.2}  {color}{:<13}{RESET} {} ({} commits, quality {:.2})\n",
            employee.overall_score,
            employee.performance_level,
            employee.employee_name,
            employee.total_commits,
            employee.average_code_quality_score
        ));
    }
    out.push('\n');

    // Findings and recommendations
    if !report.key_findings.is_empty() {
        out.push_str(&format!("{BOLD}KEY FINDINGS{RESET}\n"));
        for (i, finding) in report.key_findings.iter().enumerate() {
            out.push_str(&format!("  {}. {finding}\n", i + 1));
        }
        out.push('\n');
    }

    if !report.recommendations.is_empty() {
        out.push_str(&format!("{BOLD}RECOMMENDATIONS{RESET}\n"));
        for (i, rec) in report.recommendations.iter().enumerate() {
            out.push_str(&format!("  {}. {rec}\n", i + 1));
        }
        out.push('\n');
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_text_render_contains_sections() {
        let report = test_report();
        let text = render(&report).expect("render text");
        assert!(text.contains("Gitgauge Evaluation"));
        assert!(text.contains("REPOSITORIES"));
        assert!(text.contains("EMPLOYEES"));
        assert!(text.contains("Ada Lovelace"));
        assert!(text.contains("KEY FINDINGS"));
        assert!(text.contains("RECOMMENDATIONS"));
    }

    #[test]
    fn test_text_render_shows_team_score() {
        let report = test_report();
        let text = render(&report).expect("render text");
        assert!(text.contains("0.74/1.0"));
    }
}
