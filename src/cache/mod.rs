//! Assessment caching
//!
//! Content-addressed cache mapping a commit fingerprint to a previously
//! obtained oracle assessment, avoiding redundant external calls. One JSON
//! file per fingerprint, written atomically; unbounded and never expired.
//!
//! Two on-disk shapes exist. Current records carry the three numeric scores;
//! legacy records carry categorical tiers only. A single dispatch-on-shape
//! deserializer handles both: numeric records re-derive their tiers from the
//! scores, legacy records keep their stored tiers with numeric fields
//! backfilled as absent.

use crate::models::{CommitAssessment, ComplexityTier, EffortTier, QualityTier};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Number of diff characters folded into the fingerprint.
const FINGERPRINT_DIFF_CHARS: usize = 1000;

/// Stable cache key over (commit hash, message, diff prefix).
pub fn fingerprint(commit_hash: &str, message: &str, diff: &str) -> String {
    let prefix: String = diff.chars().take(FINGERPRINT_DIFF_CHARS).collect();
    let input = format!("{commit_hash}_{message}_{prefix}");

    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    format!("{digest:x}")
}

/// On-disk assessment cache, one file per fingerprint.
pub struct AssessmentCache {
    dir: PathBuf,
}

impl AssessmentCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Look up an assessment by fingerprint.
    ///
    /// Unreadable or corrupt entries are treated as misses, never errors.
    pub fn get(&self, key: &str) -> Option<CommitAssessment> {
        let path = self.entry_path(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return None,
        };

        match serde_json::from_str::<CachedShape>(&content) {
            Ok(shape) => {
                debug!("Cache hit for {key}");
                Some(shape.into_assessment())
            }
            Err(e) => {
                warn!("Discarding corrupt cache entry {}: {e}", path.display());
                None
            }
        }
    }

    /// Store an assessment under a fingerprint.
    ///
    /// Write failures are logged and swallowed; the cache is an optimization,
    /// not a correctness requirement.
    pub fn put(&self, key: &str, assessment: &CommitAssessment) {
        if let Err(e) = self.try_put(key, assessment) {
            warn!("Failed to cache assessment {key}: {e}");
        }
    }

    fn try_put(&self, key: &str, assessment: &CommitAssessment) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.entry_path(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        let json = serde_json::to_string_pretty(assessment)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        // Whole-file atomicity: write to a sibling, then rename over.
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;
        debug!("Cached assessment {key}");
        Ok(())
    }
}

/// Versioned union of the two cache record shapes.
///
/// Numeric matches first: all three scores present and non-null. Anything
/// else falls through to the legacy categorical shape.
#[derive(Deserialize)]
#[serde(untagged)]
enum CachedShape {
    Numeric(NumericRecord),
    Legacy(LegacyRecord),
}

#[derive(Deserialize)]
struct NumericRecord {
    #[serde(default)]
    commit_hash: String,
    code_quality_score: f64,
    complexity_score: f64,
    effort_score: f64,
    #[serde(default)]
    summary: Vec<String>,
    #[serde(default)]
    analysis: Vec<String>,
    #[serde(default)]
    advice: Vec<String>,
    #[serde(default)]
    reasoning: BTreeMap<String, String>,
    #[serde(default)]
    score: f64,
}

#[derive(Deserialize)]
struct LegacyRecord {
    #[serde(default)]
    commit_hash: String,
    #[serde(default)]
    complexity: Option<String>,
    #[serde(default)]
    code_quality: Option<String>,
    #[serde(default)]
    effort: Option<String>,
    #[serde(default)]
    summary: Vec<String>,
    #[serde(default)]
    analysis: Vec<String>,
    #[serde(default)]
    advice: Vec<String>,
    #[serde(default)]
    reasoning: BTreeMap<String, String>,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    code_quality_score: Option<f64>,
    #[serde(default)]
    complexity_score: Option<f64>,
    #[serde(default)]
    effort_score: Option<f64>,
}

impl CachedShape {
    fn into_assessment(self) -> CommitAssessment {
        match self {
            // Tiers are always re-derived from numeric scores when present.
            CachedShape::Numeric(r) => CommitAssessment {
                commit_hash: r.commit_hash,
                complexity: ComplexityTier::from_score(r.complexity_score),
                code_quality: QualityTier::from_score(r.code_quality_score),
                effort: EffortTier::from_score(r.effort_score),
                summary: r.summary,
                analysis: r.analysis,
                advice: r.advice,
                reasoning: r.reasoning,
                score: r.score,
                code_quality_score: Some(r.code_quality_score),
                complexity_score: Some(r.complexity_score),
                effort_score: Some(r.effort_score),
            },
            CachedShape::Legacy(r) => CommitAssessment {
                commit_hash: r.commit_hash,
                complexity: match r.complexity.as_deref() {
                    Some("low") => ComplexityTier::Low,
                    Some("high") => ComplexityTier::High,
                    _ => ComplexityTier::Medium,
                },
                code_quality: match r.code_quality.as_deref() {
                    Some("excellent") => QualityTier::Excellent,
                    Some("good") => QualityTier::Good,
                    Some("poor") => QualityTier::Poor,
                    _ => QualityTier::Medium,
                },
                effort: match r.effort.as_deref() {
                    Some("easy") => EffortTier::Easy,
                    Some("hard") => EffortTier::Hard,
                    _ => EffortTier::Medium,
                },
                summary: r.summary,
                analysis: r.analysis,
                advice: r.advice,
                reasoning: r.reasoning,
                score: r.score,
                code_quality_score: r.code_quality_score,
                complexity_score: r.complexity_score,
                effort_score: r.effort_score,
            },
        }
    }
}
