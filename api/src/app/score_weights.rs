//! Score weight table
//!
//! Defines how much each contribution kind is worth. Callers can override
//! any weight through [`ScoreWeights`]; the constants are the defaults.

use serde::{Deserialize, Serialize};

use crate::domain::entities::ContributionKind;

/// Points per commit
pub const DEFAULT_WEIGHT_COMMITS: u64 = 2;

/// Points per pull request opened
pub const DEFAULT_WEIGHT_PULL_REQUESTS_OPENED: u64 = 5;

/// Points per pull request review submitted
pub const DEFAULT_WEIGHT_PULL_REQUESTS_REVIEWED: u64 = 3;

/// Points per issue opened
pub const DEFAULT_WEIGHT_ISSUES_OPENED: u64 = 1;

/// Points per issue closed
pub const DEFAULT_WEIGHT_ISSUES_CLOSED: u64 = 4;

/// Points per pull request comment
pub const DEFAULT_WEIGHT_PR_COMMENTS: u64 = 2;

/// Points per branch created
pub const DEFAULT_WEIGHT_BRANCHES_CREATED: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub commits: u64,
    pub pull_requests_opened: u64,
    pub pull_requests_reviewed: u64,
    pub issues_opened: u64,
    pub issues_closed: u64,
    pub pr_comments: u64,
    pub branches_created: u64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            commits: DEFAULT_WEIGHT_COMMITS,
            pull_requests_opened: DEFAULT_WEIGHT_PULL_REQUESTS_OPENED,
            pull_requests_reviewed: DEFAULT_WEIGHT_PULL_REQUESTS_REVIEWED,
            issues_opened: DEFAULT_WEIGHT_ISSUES_OPENED,
            issues_closed: DEFAULT_WEIGHT_ISSUES_CLOSED,
            pr_comments: DEFAULT_WEIGHT_PR_COMMENTS,
            branches_created: DEFAULT_WEIGHT_BRANCHES_CREATED,
        }
    }
}

impl ScoreWeights {
    pub fn weight(&self, kind: ContributionKind) -> u64 {
        match kind {
            ContributionKind::Commits => self.commits,
            ContributionKind::PullRequestsOpened => self.pull_requests_opened,
            ContributionKind::PullRequestsReviewed => self.pull_requests_reviewed,
            ContributionKind::IssuesOpened => self.issues_opened,
            ContributionKind::IssuesClosed => self.issues_closed,
            ContributionKind::PrComments => self.pr_comments,
            ContributionKind::BranchesCreated => self.branches_created,
        }
    }
}
