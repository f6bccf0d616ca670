//! Integration tests for the roll-up pipeline
//!
//! Drives the aggregation path end-to-end over synthetic commit streams:
//! per-repository employee metrics, the cross-repository merge, team
//! scoring, report synthesis, and all three report renderers. No network
//! and no git repositories are involved; the oracle boundary is exercised
//! with prebuilt assessments.

use chrono::Utc;
use gitgauge::config::EvalConfig;
use gitgauge::engine::{
    compute_employee_metrics, compute_repository_metrics, generate_report, merge_employee_metrics,
    team_score,
};
use gitgauge::models::{
    performance_band_for, CommitAssessment, CommitFact, CommitKind, ComplexityTier, ConfigEcho,
    EffortTier, EvaluationResult, QualityTier,
};
use gitgauge::reporters::{report_with_format, OutputFormat};
use gitgauge::scoring::compute_productivity;
use std::collections::BTreeMap;

fn test_config() -> EvalConfig {
    toml::from_str(
        r#"
        [[repositories]]
        name = "backend"
        path = "/tmp/backend"

        [[repositories]]
        name = "frontend"
        path = "/tmp/frontend"

        [employees]
        "Ada Lovelace" = ["ada@example.com"]
        "#,
    )
    .expect("parse test config")
}

fn fact(repo: &str, email: &str, message: &str, added: usize, deleted: usize) -> CommitFact {
    CommitFact {
        hash: format!("{:.7}", format!("{repo}{email}{message}0000000")),
        full_hash: format!("{repo}-{message}-full"),
        author: email.split('@').next().unwrap_or("dev").to_string(),
        author_email: email.to_string(),
        message: message.to_string(),
        timestamp: Utc::now(),
        files_changed: vec!["src/lib.rs".to_string(), "src/main.rs".to_string()],
        lines_added: added,
        lines_deleted: deleted,
        kind: CommitKind::from_message(message),
        repository: repo.to_string(),
        branch: "main".to_string(),
        link: None,
    }
}

fn assessment(quality: f64, complexity: f64, effort: f64) -> CommitAssessment {
    let score = ((quality + complexity + effort) / 3.0).round() / 100.0;
    CommitAssessment {
        commit_hash: "abc1234".to_string(),
        complexity: ComplexityTier::from_score(complexity),
        code_quality: QualityTier::from_score(quality),
        effort: EffortTier::from_score(effort),
        summary: vec!["synthetic".to_string()],
        analysis: vec![],
        advice: vec![],
        reasoning: BTreeMap::new(),
        score,
        code_quality_score: Some(quality),
        complexity_score: Some(complexity),
        effort_score: Some(effort),
    }
}

#[test]
fn high_output_commit_hits_full_output_score() {
    let commits = vec![fact("backend", "ada@example.com", "implement importer", 1000, 0)];
    let assessments = vec![assessment(90.0, 80.0, 80.0)];

    assert_eq!(assessments[0].score, 0.83);

    let breakdown = compute_productivity(&commits, &assessments, 30);
    assert_eq!(breakdown.code_output_score, 1.0);
    assert_eq!(breakdown.net_code_output, 1000);
}

#[test]
fn cross_repository_merge_and_team_score() {
    let config = test_config();
    let now = Utc::now();

    // Ada commits in both repositories, Bob only in backend.
    let backend_facts = vec![
        fact("backend", "ada@example.com", "fix login crash", 120, 30),
        fact("backend", "ada@example.com", "add session cache", 300, 10),
        fact("backend", "bob@example.com", "refactor handlers", 80, 200),
    ];
    let backend_assessments = vec![
        assessment(60.0, 50.0, 50.0),
        assessment(60.0, 50.0, 50.0),
        assessment(70.0, 60.0, 40.0),
    ];
    let frontend_facts = vec![fact("frontend", "ada@example.com", "add dashboard", 500, 0)];
    let frontend_assessments = vec![assessment(80.0, 40.0, 60.0)];

    let backend_employees = compute_employee_metrics(
        &config,
        "backend",
        &backend_facts,
        &backend_assessments,
        30,
        now,
        now,
    );
    let frontend_employees = compute_employee_metrics(
        &config,
        "frontend",
        &frontend_facts,
        &frontend_assessments,
        30,
        now,
        now,
    );

    // Per-repo quality for Ada: backend 0.6, frontend 0.8.
    assert!(
        (backend_employees["ada@example.com"].average_code_quality_score - 0.6).abs() < 1e-9
    );
    assert!(
        (frontend_employees["ada@example.com"].average_code_quality_score - 0.8).abs() < 1e-9
    );
    // Employee names resolve through the config mapping.
    assert_eq!(
        backend_employees["ada@example.com"].employee_name,
        "Ada Lovelace"
    );
    assert_eq!(backend_employees["bob@example.com"].employee_name, "bob@example.com");

    let merged = merge_employee_metrics(
        &config.metrics,
        vec![backend_employees, frontend_employees],
    );

    // Pairwise mean, not volume weighted: (0.6 + 0.8) / 2.
    let ada = &merged["ada@example.com"];
    assert!((ada.average_code_quality_score - 0.7).abs() < 1e-9);
    assert_eq!(ada.total_commits, 3);
    assert_eq!(
        ada.repositories,
        vec!["backend".to_string(), "frontend".to_string()]
    );

    // Team score is the unweighted mean of the final overall scores.
    let bob = &merged["bob@example.com"];
    let expected = ((ada.overall_score + bob.overall_score) / 2.0 * 100.0).round() / 100.0;
    assert_eq!(team_score(&merged), expected);
}

#[test]
fn report_synthesis_and_rendering() {
    let config = test_config();
    let now = Utc::now();

    let facts = vec![
        fact("backend", "ada@example.com", "fix panic in parser", 200, 50),
        fact("backend", "ada@example.com", "add metrics endpoint", 400, 0),
    ];
    let assessments = vec![assessment(85.0, 60.0, 55.0), assessment(90.0, 70.0, 65.0)];

    let employees = compute_employee_metrics(&config, "backend", &facts, &assessments, 30, now, now);
    let mut repo_metrics =
        compute_repository_metrics("backend", "/tmp/backend", 1.0, &facts, &assessments, 30);
    repo_metrics.employee_contributions = employees.clone();

    let merged = merge_employee_metrics(&config.metrics, vec![employees]);
    let overall_team_score = team_score(&merged);

    let result = EvaluationResult {
        evaluation_id: "eval-test".to_string(),
        evaluation_name: "efficiency_evaluation_monthly_test".to_string(),
        evaluation_period: "monthly".to_string(),
        start_date: now,
        end_date: now,
        repositories: BTreeMap::from([("backend".to_string(), repo_metrics)]),
        repository_order: vec!["backend".to_string()],
        total_employees: merged.len(),
        employees: merged,
        total_repositories: 1,
        overall_team_score,
        config_used: ConfigEcho {
            metrics_weights: BTreeMap::new(),
            evaluation_period: "monthly".to_string(),
            since_days: 30,
        },
        generated_at: now,
    };

    let report = generate_report(&result);

    // Low cadence (2 commits over 30 days) triggers the low-activity finding.
    assert!(report
        .key_findings
        .iter()
        .any(|f| f.contains("backend has low activity")));
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("low-activity repositories")));
    assert_eq!(
        report.charts_data.repository_activity["backend"].total_commits,
        2
    );
    assert!(report
        .charts_data
        .employee_scores
        .contains_key("Ada Lovelace"));

    // All three renderers accept the report.
    let text = report_with_format(&report, OutputFormat::Text).expect("text render");
    assert!(text.contains("Ada Lovelace"));
    let json = report_with_format(&report, OutputFormat::Json).expect("json render");
    let parsed: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(parsed["evaluation_result"]["total_employees"], 1);
    let md = report_with_format(&report, OutputFormat::Markdown).expect("markdown render");
    assert!(md.contains("| Ada Lovelace |"));
}

#[test]
fn performance_levels_track_overall_scores() {
    let config = test_config();
    let now = Utc::now();

    // A single low-output employee lands in a low band.
    let facts = vec![fact("backend", "bob@example.com", "tweak styles", 3, 1)];
    let assessments = vec![assessment(40.0, 20.0, 20.0)];
    let employees = compute_employee_metrics(&config, "backend", &facts, &assessments, 30, now, now);

    let bob = &employees["bob@example.com"];
    assert_eq!(
        bob.performance_level,
        performance_band_for(bob.overall_score).level
    );
    assert!(bob.overall_score < 0.5);
}
