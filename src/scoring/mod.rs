//! Productivity scoring
//!
//! Converts a set of commit facts plus oracle assessments into a single
//! productivity score per actor, using a fixed weighted formula. All
//! sub-scores are clamped to [0,1] before combination; the final product
//! with the technology multiplier is deliberately NOT re-clamped, so the
//! productivity score can exceed 1 (callers normalize where required).

use crate::models::{CommitAssessment, CommitFact};
use serde::{Deserialize, Serialize};

/// Technology stack categories recognized by the extension scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Technology {
    Java,
    Js,
    #[serde(rename = "c++")]
    Cpp,
    Go,
    #[default]
    Unknown,
}

impl Technology {
    /// Productivity multiplier for the dominant technology.
    pub fn multiplier(&self) -> f64 {
        match self {
            Technology::Java => 1.0,
            Technology::Js => 0.8,
            Technology::Cpp => 1.3,
            Technology::Go => 1.1,
            Technology::Unknown => 1.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Technology::Java => "java",
            Technology::Js => "js",
            Technology::Cpp => "c++",
            Technology::Go => "go",
            Technology::Unknown => "unknown",
        }
    }
}

/// Detect the dominant technology over a set of file paths.
///
/// Counts extension matches per category; ties break toward the
/// first-enumerated category (java, js, c++, go). Returns `Unknown`
/// when no file matches any category.
pub fn dominant_technology<'a>(files: impl Iterator<Item = &'a str>) -> Technology {
    let mut counts = [0usize; 4]; // java, js, c++, go

    for file in files {
        if file.ends_with(".java") {
            counts[0] += 1;
        } else if file.ends_with(".js")
            || file.ends_with(".jsx")
            || file.ends_with(".ts")
            || file.ends_with(".tsx")
        {
            counts[1] += 1;
        } else if file.ends_with(".cpp")
            || file.ends_with(".cc")
            || file.ends_with(".hpp")
            || file.ends_with(".cxx")
        {
            counts[2] += 1;
        } else if file.ends_with(".go") {
            counts[3] += 1;
        }
    }

    const CATEGORIES: [Technology; 4] = [
        Technology::Java,
        Technology::Js,
        Technology::Cpp,
        Technology::Go,
    ];

    let mut best = 0;
    for i in 1..counts.len() {
        if counts[i] > counts[best] {
            best = i;
        }
    }

    if counts[best] == 0 {
        Technology::Unknown
    } else {
        CATEGORIES[best]
    }
}

/// Round to 2 decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Round to 3 decimal places.
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn clamp01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

/// Full productivity breakdown for one actor's commit subset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductivityBreakdown {
    /// Weighted combination of the sub-scores times the technology
    /// multiplier; may exceed 1.0.
    pub productivity_score: f64,
    pub code_output_score: f64,
    pub commit_efficiency: f64,
    pub file_impact_score: f64,
    pub complexity_multiplier: f64,
    pub effort_multiplier: f64,
    pub tech_multiplier: f64,
    pub net_code_output: i64,
    pub total_files_changed: usize,
    pub commits_per_day: f64,
}

/// Compute the productivity breakdown over a commit subset.
///
/// `window_days` is the evaluation lookback window; a zero or negative
/// window yields zero commit cadence rather than dividing by zero.
pub fn compute_productivity(
    commits: &[CommitFact],
    assessments: &[CommitAssessment],
    window_days: i64,
) -> ProductivityBreakdown {
    let total_commits = commits.len();
    let total_lines_added: usize = commits.iter().map(|c| c.lines_added).sum();
    let total_lines_deleted: usize = commits.iter().map(|c| c.lines_deleted).sum();
    let total_files_changed: usize = commits.iter().map(|c| c.files_changed.len()).sum();

    // Net output: 1000 net lines is full marks, negative clamps to 0.
    let net_code_output = total_lines_added as i64 - total_lines_deleted as i64;
    let code_output_score = clamp01(net_code_output as f64 / 1000.0);

    let complexity_multiplier = mean_score(assessments.iter().map(|a| a.complexity_score));
    let effort_multiplier = mean_score(assessments.iter().map(|a| a.effort_score));

    // Cadence: 3 commits per day is full marks.
    let commits_per_day = if window_days > 0 {
        total_commits as f64 / window_days as f64
    } else {
        0.0
    };
    let commit_efficiency = clamp01(commits_per_day / 3.0);

    // Breadth: 50 distinct file touches is full marks.
    let file_impact_score = clamp01(total_files_changed as f64 / 50.0);

    let tech = dominant_technology(
        commits
            .iter()
            .flat_map(|c| c.files_changed.iter().map(String::as_str)),
    );
    let tech_multiplier = tech.multiplier();

    // Not re-clamped after the technology multiplier.
    let productivity_score = (code_output_score * 0.3
        + commit_efficiency * 0.2
        + file_impact_score * 0.2
        + complexity_multiplier * 0.15
        + effort_multiplier * 0.15)
        * tech_multiplier;

    ProductivityBreakdown {
        productivity_score: round3(productivity_score),
        code_output_score: round3(code_output_score),
        commit_efficiency: round3(commit_efficiency),
        file_impact_score: round3(file_impact_score),
        complexity_multiplier: round3(complexity_multiplier),
        effort_multiplier: round3(effort_multiplier),
        tech_multiplier: round3(tech_multiplier),
        net_code_output,
        total_files_changed,
        commits_per_day: round2(commits_per_day),
    }
}

/// Mean of the present 0-100 scores scaled to [0,1]; 0.5 when none are present.
fn mean_score(scores: impl Iterator<Item = Option<f64>>) -> f64 {
    let present: Vec<f64> = scores.flatten().collect();
    if present.is_empty() {
        0.5
    } else {
        present.iter().sum::<f64>() / present.len() as f64 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommitKind, ComplexityTier, EffortTier, QualityTier};
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn fact(files: Vec<&str>, added: usize, deleted: usize) -> CommitFact {
        CommitFact {
            hash: "abc1234".into(),
            full_hash: "abc1234def".into(),
            author: "Ada".into(),
            author_email: "ada@example.com".into(),
            message: "change".into(),
            timestamp: Utc::now(),
            files_changed: files.into_iter().map(String::from).collect(),
            lines_added: added,
            lines_deleted: deleted,
            kind: CommitKind::Other,
            repository: "backend".into(),
            branch: "main".into(),
            link: None,
        }
    }

    fn assessment(complexity: Option<f64>, effort: Option<f64>) -> CommitAssessment {
        CommitAssessment {
            commit_hash: "abc1234".into(),
            complexity: ComplexityTier::Medium,
            code_quality: QualityTier::Medium,
            effort: EffortTier::Medium,
            summary: vec![],
            analysis: vec![],
            advice: vec![],
            reasoning: BTreeMap::new(),
            score: 0.6,
            code_quality_score: None,
            complexity_score: complexity,
            effort_score: effort,
        }
    }

    #[test]
    fn dominant_technology_counts_and_ties() {
        assert_eq!(
            dominant_technology(["a.java", "b.java", "c.go"].into_iter()),
            Technology::Java
        );
        assert_eq!(
            dominant_technology(["a.ts", "b.jsx", "c.go"].into_iter()),
            Technology::Js
        );
        // Tie between java and go breaks toward the first-enumerated category
        assert_eq!(
            dominant_technology(["a.java", "b.go"].into_iter()),
            Technology::Java
        );
        assert_eq!(
            dominant_technology(["readme.md", "notes.txt"].into_iter()),
            Technology::Unknown
        );
        assert_eq!(dominant_technology([].into_iter()), Technology::Unknown);
    }

    #[test]
    fn tech_multiplier_table() {
        assert_eq!(Technology::Java.multiplier(), 1.0);
        assert_eq!(Technology::Js.multiplier(), 0.8);
        assert_eq!(Technology::Cpp.multiplier(), 1.3);
        assert_eq!(Technology::Go.multiplier(), 1.1);
        assert_eq!(Technology::Unknown.multiplier(), 1.0);
    }

    #[test]
    fn code_output_clamps_to_full_marks() {
        let commits = vec![fact(vec!["a.rs"], 1000, 0)];
        let breakdown = compute_productivity(&commits, &[], 30);
        assert_eq!(breakdown.code_output_score, 1.0);
        assert_eq!(breakdown.net_code_output, 1000);
    }

    #[test]
    fn negative_net_output_clamps_to_zero() {
        let commits = vec![fact(vec!["a.rs"], 10, 500)];
        let breakdown = compute_productivity(&commits, &[], 30);
        assert_eq!(breakdown.code_output_score, 0.0);
        assert_eq!(breakdown.net_code_output, -490);
    }

    #[test]
    fn zero_window_days_is_guarded() {
        let commits = vec![fact(vec!["a.rs"], 10, 0)];
        let breakdown = compute_productivity(&commits, &[], 0);
        assert_eq!(breakdown.commits_per_day, 0.0);
        assert_eq!(breakdown.commit_efficiency, 0.0);
    }

    #[test]
    fn empty_commit_set_yields_zero_subscores() {
        let breakdown = compute_productivity(&[], &[], 30);
        assert_eq!(breakdown.code_output_score, 0.0);
        assert_eq!(breakdown.commit_efficiency, 0.0);
        assert_eq!(breakdown.file_impact_score, 0.0);
        // Missing assessments default the multipliers to 0.5
        assert_eq!(breakdown.complexity_multiplier, 0.5);
        assert_eq!(breakdown.effort_multiplier, 0.5);
        assert_eq!(breakdown.tech_multiplier, 1.0);
    }

    #[test]
    fn multipliers_average_present_scores_only() {
        let assessments = vec![
            assessment(Some(80.0), Some(60.0)),
            assessment(None, None),
            assessment(Some(40.0), Some(20.0)),
        ];
        let breakdown = compute_productivity(&[fact(vec!["a.rs"], 1, 0)], &assessments, 30);
        assert_eq!(breakdown.complexity_multiplier, 0.6);
        assert_eq!(breakdown.effort_multiplier, 0.4);
    }

    #[test]
    fn subscores_stay_in_unit_range_on_pathological_input() {
        let commits = vec![
            fact((0..200).map(|_| "x.rs").collect(), 0, 100_000),
            fact(vec![], 0, 0),
        ];
        let breakdown = compute_productivity(&commits, &[], 1);
        for sub in [
            breakdown.code_output_score,
            breakdown.commit_efficiency,
            breakdown.file_impact_score,
            breakdown.complexity_multiplier,
            breakdown.effort_multiplier,
        ] {
            assert!((0.0..=1.0).contains(&sub), "sub-score {sub} out of range");
        }
    }

    #[test]
    fn productivity_can_exceed_one_with_cpp_multiplier() {
        // All sub-scores maxed with the 1.3 multiplier: 1.0 * 1.3
        let commits: Vec<CommitFact> = (0..180)
            .map(|_| fact(vec!["core.cpp"], 100, 0))
            .collect();
        let assessments: Vec<CommitAssessment> = (0..180)
            .map(|_| assessment(Some(100.0), Some(100.0)))
            .collect();
        let breakdown = compute_productivity(&commits, &assessments, 30);
        assert!(breakdown.productivity_score > 1.0);
        assert_eq!(breakdown.tech_multiplier, 1.3);
    }
}
