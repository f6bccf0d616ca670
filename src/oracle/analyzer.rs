//! Cache-fronted commit assessment
//!
//! `CommitAnalyzer` wraps the oracle client with the on-disk cache and the
//! reply normalization rules. `assess` never fails: commits that cannot be
//! scored degrade to a default assessment, keeping per-commit failures
//! isolated from the rest of the evaluation.

use crate::cache::{fingerprint, AssessmentCache};
use crate::models::{
    CommitAssessment, CommitFact, ComplexityTier, EffortTier, QualityTier,
};
use crate::oracle::prompts::{build_assessment_prompt, truncate_diff};
use crate::oracle::OracleClient;
use crate::scoring::round2;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Structured oracle reply after JSON extraction.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleReply {
    pub code_quality_score: Option<f64>,
    pub complexity_score: Option<f64>,
    pub effort_score: Option<f64>,
    #[serde(default)]
    pub summary: Vec<String>,
    #[serde(default)]
    pub analysis: Vec<String>,
    #[serde(default)]
    pub advice: Vec<String>,
    #[serde(default)]
    pub reasoning: BTreeMap<String, String>,
}

/// Outcome of normalizing a raw oracle reply.
///
/// Malformed replies (no JSON, or any numeric score missing) are an explicit
/// branch, not an exception path.
#[derive(Debug)]
pub enum ReplyOutcome {
    Parsed(OracleReply),
    Malformed,
}

/// Extract and validate the JSON object embedded in a reply.
///
/// The object is taken from the first `{` to the last `}` of the text, which
/// tolerates prose around the JSON. A reply missing any of the three numeric
/// scores is malformed.
pub fn parse_reply(text: &str) -> ReplyOutcome {
    let start = match text.find('{') {
        Some(i) => i,
        None => return ReplyOutcome::Malformed,
    };
    let end = match text.rfind('}') {
        Some(i) => i,
        None => return ReplyOutcome::Malformed,
    };
    if end < start {
        return ReplyOutcome::Malformed;
    }

    let reply: OracleReply = match serde_json::from_str(&text[start..=end]) {
        Ok(reply) => reply,
        Err(_) => return ReplyOutcome::Malformed,
    };

    if reply.code_quality_score.is_none()
        || reply.complexity_score.is_none()
        || reply.effort_score.is_none()
    {
        return ReplyOutcome::Malformed;
    }

    ReplyOutcome::Parsed(reply)
}

/// Fixed assessment used when the oracle cannot score a commit:
/// all tiers medium, combined score 0.6, numeric scores absent.
pub fn default_assessment(commit_hash: &str) -> CommitAssessment {
    CommitAssessment {
        commit_hash: commit_hash.to_string(),
        complexity: ComplexityTier::Medium,
        code_quality: QualityTier::Medium,
        effort: EffortTier::Medium,
        summary: vec!["Automated analysis unavailable; default assessment applied".into()],
        analysis: vec!["No detailed analysis could be obtained".into()],
        advice: vec!["Review this commit manually".into()],
        reasoning: BTreeMap::from([
            ("complexity".to_string(), "Defaulted to medium".to_string()),
            ("code_quality".to_string(), "Defaulted to medium".to_string()),
            ("effort".to_string(), "Defaulted to medium".to_string()),
        ]),
        score: 0.6,
        code_quality_score: None,
        complexity_score: None,
        effort_score: None,
    }
}

fn assessment_from_reply(commit_hash: &str, reply: OracleReply) -> CommitAssessment {
    // parse_reply guarantees all three scores are present here.
    let quality = reply.code_quality_score.unwrap_or_default().clamp(0.0, 100.0);
    let complexity = reply.complexity_score.unwrap_or_default().clamp(0.0, 100.0);
    let effort = reply.effort_score.unwrap_or_default().clamp(0.0, 100.0);

    CommitAssessment {
        commit_hash: commit_hash.to_string(),
        complexity: ComplexityTier::from_score(complexity),
        code_quality: QualityTier::from_score(quality),
        effort: EffortTier::from_score(effort),
        summary: reply.summary,
        analysis: reply.analysis,
        advice: reply.advice,
        reasoning: reply.reasoning,
        score: round2((quality + complexity + effort) / 3.0 / 100.0),
        code_quality_score: Some(quality),
        complexity_score: Some(complexity),
        effort_score: Some(effort),
    }
}

/// Oracle client plus assessment cache.
pub struct CommitAnalyzer {
    client: OracleClient,
    cache: AssessmentCache,
}

impl CommitAnalyzer {
    pub fn new(client: OracleClient, cache: AssessmentCache) -> Self {
        Self { client, cache }
    }

    /// Assess one commit. Infallible: degraded paths return the default
    /// assessment instead of an error.
    pub fn assess(&mut self, fact: &CommitFact, diff: &str) -> CommitAssessment {
        let key = fingerprint(&fact.hash, &fact.message, diff);
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let prompt = build_assessment_prompt(fact, &truncate_diff(diff));

        match self.client.complete(&prompt) {
            Ok(reply_text) => {
                let assessment = match parse_reply(&reply_text) {
                    ReplyOutcome::Parsed(reply) => assessment_from_reply(&fact.hash, reply),
                    ReplyOutcome::Malformed => {
                        warn!("Unparsable oracle reply for {}, using defaults", fact.hash);
                        default_assessment(&fact.hash)
                    }
                };
                // Both parsed and malformed-default results flow into the
                // cache; transport failures below do not.
                self.cache.put(&key, &assessment);
                assessment
            }
            Err(e) => {
                warn!("Oracle assessment failed for {}: {e}", fact.hash);
                default_assessment(&fact.hash)
            }
        }
    }

}
