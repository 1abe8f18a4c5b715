//! Branch creation estimator
//!
//! The platform does not expose when a branch was created, so the time is
//! approximated from one sampled commit per branch. Only the first
//! `sample_limit` branches are looked at; larger repositories under-report.
//! A rebased branch can also appear older than it is.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::entities::AggregationWindow;
use crate::domain::ports::{SourceApi, SourceBranch};

use super::batch::run_in_paced_batches;

#[derive(Debug, Clone, Copy)]
pub struct BranchEstimatorSettings {
    pub sample_limit: usize,
    pub batch_size: usize,
    pub batch_delay: Duration,
}

impl Default for BranchEstimatorSettings {
    fn default() -> Self {
        Self {
            sample_limit: 30,
            batch_size: 10,
            batch_delay: Duration::from_millis(250),
        }
    }
}

/// A branch whose sampled commit falls inside the window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatedBranch {
    pub name: String,
    pub repository: String,
    pub created_at: DateTime<Utc>,
    pub commit_sha: String,
    pub commit_url: String,
    /// Login of the sampled commit's author; `None` when it has no linked account
    pub creator: Option<String>,
}

pub struct BranchEstimator<S: SourceApi + ?Sized> {
    source: Arc<S>,
    settings: BranchEstimatorSettings,
}

impl<S: SourceApi + ?Sized> BranchEstimator<S> {
    pub fn new(source: Arc<S>, settings: BranchEstimatorSettings) -> Self {
        Self { source, settings }
    }

    /// Branches of `repo` estimated to have been created inside `window`
    ///
    /// Never fails: a listing failure yields no branches and a per-branch
    /// failure drops only that branch.
    pub async fn estimate(&self, repo: &str, window: &AggregationWindow) -> Vec<EstimatedBranch> {
        let mut branches = match self.source.list_branches(repo).await {
            Ok(branches) => branches,
            Err(e) => {
                tracing::warn!(repo = %repo, "Failed to list branches: {}", e);
                return Vec::new();
            }
        };

        if branches.len() > self.settings.sample_limit {
            tracing::debug!(
                repo = %repo,
                total = branches.len(),
                sampled = self.settings.sample_limit,
                "Sampling branches"
            );
            branches.truncate(self.settings.sample_limit);
        }

        let estimates = run_in_paced_batches(
            branches,
            self.settings.batch_size,
            self.settings.batch_delay,
            |branch| self.estimate_one(repo, branch),
        )
        .await;

        estimates
            .into_iter()
            .flatten()
            .filter(|b| window.contains(b.created_at))
            .collect()
    }

    async fn estimate_one(&self, repo: &str, branch: SourceBranch) -> Option<EstimatedBranch> {
        let commit = match self.source.sample_branch_commit(repo, &branch.name).await {
            Ok(Some(commit)) => commit,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(repo = %repo, branch = %branch.name, "Failed to sample branch: {}", e);
                return None;
            }
        };

        let created_at = commit.committed_at()?;
        Some(EstimatedBranch {
            name: branch.name,
            repository: repo.to_string(),
            created_at,
            creator: commit.author_login().map(str::to_string),
            commit_url: commit.html_url,
            commit_sha: commit.sha,
        })
    }
}
