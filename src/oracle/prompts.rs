//! Prompt construction for commit assessment

use crate::models::CommitFact;
use crate::scoring::dominant_technology;

/// Maximum diff characters embedded in a prompt.
pub const MAX_DIFF_CHARS: usize = 3000;

const TRUNCATION_MARKER: &str = "\n... (diff truncated) ...";

/// Clip a diff to the prompt budget, marking the cut when it happens.
pub fn truncate_diff(diff: &str) -> String {
    if diff.chars().count() <= MAX_DIFF_CHARS {
        return diff.to_string();
    }
    let clipped: String = diff.chars().take(MAX_DIFF_CHARS).collect();
    format!("{clipped}{TRUNCATION_MARKER}")
}

/// Build the assessment prompt for one commit.
///
/// Embeds commit metadata and the dominant technology so the oracle can
/// score against that stack's conventions. The reply contract is a JSON
/// object with three 0-100 scores plus free-text rationale.
pub fn build_assessment_prompt(fact: &CommitFact, diff: &str) -> String {
    let tech = dominant_technology(fact.files_changed.iter().map(String::as_str));

    format!(
        r#"You are an expert code reviewer specializing in code quality and engineering productivity.
The dominant technology in this commit is: {tech}
Score the commit against that stack's best practices and quality standards:

1. code_quality_score (0-100, higher is better; spread the distribution -
   reserve very high scores for clearly excellent code and very low scores
   for clearly broken code; avoid clustering everything in 60-80)
2. complexity_score (0-100, higher is more complex)
3. effort_score (0-100, higher is more work)
4. detailed reasoning

Reply with JSON in exactly this shape:
{{
  "code_quality_score": 85,
  "complexity_score": 40,
  "effort_score": 30,
  "summary": ["..."],
  "analysis": ["..."],
  "advice": ["..."],
  "reasoning": {{
    "code_quality": "...",
    "complexity": "...",
    "effort": "..."
  }}
}}

Commit:
- hash: {hash}
- author: {author}
- message: {message}
- timestamp: {timestamp}
- files changed: {files}
- lines added: {added}
- lines deleted: {deleted}

Diff:
{diff}
"#,
        tech = tech.label(),
        hash = fact.hash,
        author = fact.author,
        message = fact.message,
        timestamp = fact.timestamp.format("%Y-%m-%d %H:%M:%S"),
        files = fact.files_changed.len(),
        added = fact.lines_added,
        deleted = fact.lines_deleted,
        diff = diff,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommitKind;
    use chrono::Utc;

    fn fact() -> CommitFact {
        CommitFact {
            hash: "abc1234".into(),
            full_hash: "abc1234def".into(),
            author: "Ada".into(),
            author_email: "ada@example.com".into(),
            message: "implement parser".into(),
            timestamp: Utc::now(),
            files_changed: vec!["src/parser.go".into(), "src/lexer.go".into()],
            lines_added: 120,
            lines_deleted: 4,
            kind: CommitKind::Feature,
            repository: "backend".into(),
            branch: "main".into(),
            link: None,
        }
    }

    #[test]
    fn short_diff_is_untouched() {
        assert_eq!(truncate_diff("small diff"), "small diff");
    }

    #[test]
    fn long_diff_is_clipped_with_marker() {
        let long = "x".repeat(MAX_DIFF_CHARS + 50);
        let clipped = truncate_diff(&long);
        assert!(clipped.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            clipped.chars().count(),
            MAX_DIFF_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn prompt_embeds_metadata_and_technology() {
        let prompt = build_assessment_prompt(&fact(), "diff body");
        assert!(prompt.contains("abc1234"));
        assert!(prompt.contains("implement parser"));
        assert!(prompt.contains("dominant technology in this commit is: go"));
        assert!(prompt.contains("diff body"));
    }
}
