//! Commit fact extraction using libgit2
//!
//! Walks repository history inside the evaluation window, applies the
//! merge/empty-commit exclusion policies, and produces immutable
//! [`CommitFact`] records plus per-commit diff text.

use crate::config::{GitConfig, RepositoryConfig};
use crate::models::{CommitFact, CommitKind};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, TimeZone, Utc};
use git2::{DiffFormat, Repository, Sort};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// History reader for a single repository.
pub struct RepoHistory {
    repo: Repository,
    name: String,
}

impl RepoHistory {
    /// Open a git repository (or any subdirectory of one).
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("Failed to open git repository at {:?}", path))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "repo".to_string());
        debug!("Opened git repository at {:?}", repo.path());
        Ok(Self { repo, name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collect commit facts inside the lookback window, newest first.
    ///
    /// Stops at the window boundary (the walk is time-sorted) or at the
    /// configured commit cap. Merge commits with an empty first-parent diff
    /// and empty non-merge commits are dropped per the exclusion policy.
    pub fn collect_facts(&self, git_config: &GitConfig, since_days: i64) -> Result<Vec<CommitFact>> {
        let cutoff = Utc::now() - Duration::days(since_days);
        let branch = self.branch_name();
        let origin_url = self.origin_url();

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push_head()?;

        let mut facts = Vec::new();

        for oid_result in revwalk {
            if facts.len() >= git_config.max_commits {
                break;
            }

            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;

            let commit_time = commit_timestamp(&commit);
            if commit_time <= cutoff {
                // Time-sorted walk: everything past here is older.
                break;
            }

            let is_merge = commit.parent_count() > 1;
            let delta_count = self.first_parent_delta_count(&commit)?;

            if is_merge && git_config.exclude_merge_commits && delta_count == 0 {
                debug!("Skipping contentless merge commit {}", short_hash(&commit));
                continue;
            }
            if !is_merge && git_config.exclude_empty_commits && delta_count == 0 {
                debug!("Skipping empty commit {}", short_hash(&commit));
                continue;
            }

            facts.push(self.extract_fact(&commit, commit_time, &branch, origin_url.as_deref())?);
        }

        debug!("{}: collected {} commit facts", self.name, facts.len());
        Ok(facts)
    }

    /// Unified diff text of a commit against its first parent.
    pub fn diff_text(&self, full_hash: &str) -> Result<String> {
        let oid = git2::Oid::from_str(full_hash)?;
        let commit = self.repo.find_commit(oid)?;
        let diff = self.first_parent_diff(&commit)?;

        let mut text = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            match line.origin() {
                '+' | '-' | ' ' => text.push(line.origin()),
                _ => {}
            }
            text.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok(text)
    }

    fn first_parent_diff(&self, commit: &git2::Commit) -> Result<git2::Diff<'_>> {
        let parent = commit.parent(0).ok();
        let tree = commit.tree()?;
        let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;

        Ok(self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?)
    }

    fn first_parent_delta_count(&self, commit: &git2::Commit) -> Result<usize> {
        Ok(self.first_parent_diff(commit)?.deltas().len())
    }

    fn extract_fact(
        &self,
        commit: &git2::Commit,
        timestamp: DateTime<Utc>,
        branch: &str,
        origin_url: Option<&str>,
    ) -> Result<CommitFact> {
        let author = commit.author();
        let message = commit.message().unwrap_or("").trim().to_string();

        let diff = self.first_parent_diff(commit)?;
        let mut files_changed = Vec::new();
        diff.foreach(
            &mut |delta, _| {
                if let Some(path) = delta.new_file().path() {
                    files_changed.push(path.to_string_lossy().to_string());
                }
                true
            },
            None,
            None,
            None,
        )?;
        let stats = diff.stats()?;

        let full_hash = commit.id().to_string();
        Ok(CommitFact {
            hash: full_hash[..7].to_string(),
            kind: CommitKind::from_message(&message),
            link: origin_url.and_then(|url| github_commit_link(url, &full_hash)),
            full_hash,
            author: author.name().unwrap_or("Unknown").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            message,
            timestamp,
            files_changed,
            lines_added: stats.insertions(),
            lines_deleted: stats.deletions(),
            repository: self.name.clone(),
            branch: branch.to_string(),
        })
    }

    fn branch_name(&self) -> String {
        self.repo
            .head()
            .ok()
            .and_then(|h| h.shorthand().map(String::from))
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn origin_url(&self) -> Option<String> {
        self.repo
            .find_remote("origin")
            .ok()
            .and_then(|r| r.url().map(String::from))
    }
}

/// Build a GitHub commit link from an origin remote URL, when it points
/// at GitHub (both SSH and HTTPS remote forms).
fn github_commit_link(remote_url: &str, full_hash: &str) -> Option<String> {
    let url = remote_url.strip_suffix(".git").unwrap_or(remote_url);

    let org_repo = if let Some(rest) = url.strip_prefix("git@github.com:") {
        rest
    } else if let Some(rest) = url.strip_prefix("https://github.com/") {
        rest
    } else {
        return None;
    };

    Some(format!("https://github.com/{org_repo}/commit/{full_hash}"))
}

fn commit_timestamp(commit: &git2::Commit) -> DateTime<Utc> {
    Utc.timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn short_hash(commit: &git2::Commit) -> String {
    commit.id().to_string()[..7].to_string()
}

/// History readers for every configured repository.
///
/// Repositories that fail to open are skipped with a warning; the
/// evaluation continues with the rest.
pub struct MultiRepoHistory {
    histories: BTreeMap<String, RepoHistory>,
}

impl MultiRepoHistory {
    pub fn open_all(repositories: &[RepositoryConfig]) -> Self {
        let mut histories = BTreeMap::new();
        for repo_config in repositories {
            match RepoHistory::open(&repo_config.path) {
                Ok(history) => {
                    histories.insert(repo_config.name.clone(), history);
                }
                Err(e) => {
                    warn!(
                        "Skipping repository {} ({}): {e:#}",
                        repo_config.name,
                        repo_config.path.display()
                    );
                }
            }
        }
        Self { histories }
    }

    pub fn get(&self, name: &str) -> Option<&RepoHistory> {
        self.histories.get(name)
    }

    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}
