//! Contribution records
//!
//! Immutable facts describing one action attributable to one contributor.
//! Every record carries its repository and, where applicable, the pull
//! request it belongs to so it can be traced back to its source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of characters kept from a comment body
pub const COMMENT_EXCERPT_CHARS: usize = 100;

/// The seven kinds of contribution that are tracked and scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContributionKind {
    Commits,
    PullRequestsOpened,
    PullRequestsReviewed,
    IssuesOpened,
    IssuesClosed,
    PrComments,
    BranchesCreated,
}

impl ContributionKind {
    pub const ALL: [ContributionKind; 7] = [
        ContributionKind::Commits,
        ContributionKind::PullRequestsOpened,
        ContributionKind::PullRequestsReviewed,
        ContributionKind::IssuesOpened,
        ContributionKind::IssuesClosed,
        ContributionKind::PrComments,
        ContributionKind::BranchesCreated,
    ];
}

impl std::fmt::Display for ContributionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContributionKind::Commits => write!(f, "commits"),
            ContributionKind::PullRequestsOpened => write!(f, "pull_requests_opened"),
            ContributionKind::PullRequestsReviewed => write!(f, "pull_requests_reviewed"),
            ContributionKind::IssuesOpened => write!(f, "issues_opened"),
            ContributionKind::IssuesClosed => write!(f, "issues_closed"),
            ContributionKind::PrComments => write!(f, "pr_comments"),
            ContributionKind::BranchesCreated => write!(f, "branches_created"),
        }
    }
}

/// State of a pull request at collection time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

impl PullRequestState {
    /// A merge timestamp wins over the raw open/closed state
    pub fn from_source(state: &str, merged: bool) -> Self {
        if merged {
            return PullRequestState::Merged;
        }
        match state.to_lowercase().as_str() {
            "closed" => PullRequestState::Closed,
            _ => PullRequestState::Open,
        }
    }
}

impl std::fmt::Display for PullRequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PullRequestState::Open => write!(f, "open"),
            PullRequestState::Closed => write!(f, "closed"),
            PullRequestState::Merged => write!(f, "merged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitContribution {
    pub url: String,
    pub sha: String,
    pub message: String,
    pub repository: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestContribution {
    pub url: String,
    pub number: u64,
    pub title: String,
    pub repository: String,
    pub state: PullRequestState,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewContribution {
    pub url: String,
    pub pr_url: String,
    pub pr_number: u64,
    pub pr_title: String,
    pub repository: String,
    /// Verdict as reported by the platform (APPROVED, CHANGES_REQUESTED, COMMENTED)
    pub state: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueOpenedContribution {
    pub url: String,
    pub number: u64,
    pub title: String,
    pub repository: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueClosedContribution {
    pub url: String,
    pub number: u64,
    pub title: String,
    pub repository: String,
    pub closed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentContribution {
    pub url: String,
    pub pr_url: String,
    pub pr_number: u64,
    pub pr_title: String,
    pub repository: String,
    /// Excerpt of the comment body, see [`excerpt`]
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A branch whose creation time was estimated from its sampled commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchContribution {
    pub name: String,
    pub repository: String,
    /// Approximate: the timestamp of the sampled commit, not a true creation time
    pub created_at: DateTime<Utc>,
    pub commit_sha: String,
    pub commit_url: String,
}

/// One contribution of any kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContributionRecord {
    Commit(CommitContribution),
    PullRequestOpened(PullRequestContribution),
    PullRequestReviewed(ReviewContribution),
    IssueOpened(IssueOpenedContribution),
    IssueClosed(IssueClosedContribution),
    PrComment(CommentContribution),
    BranchCreated(BranchContribution),
}

impl ContributionRecord {
    pub fn kind(&self) -> ContributionKind {
        match self {
            ContributionRecord::Commit(_) => ContributionKind::Commits,
            ContributionRecord::PullRequestOpened(_) => ContributionKind::PullRequestsOpened,
            ContributionRecord::PullRequestReviewed(_) => ContributionKind::PullRequestsReviewed,
            ContributionRecord::IssueOpened(_) => ContributionKind::IssuesOpened,
            ContributionRecord::IssueClosed(_) => ContributionKind::IssuesClosed,
            ContributionRecord::PrComment(_) => ContributionKind::PrComments,
            ContributionRecord::BranchCreated(_) => ContributionKind::BranchesCreated,
        }
    }

    pub fn repository(&self) -> &str {
        match self {
            ContributionRecord::Commit(c) => &c.repository,
            ContributionRecord::PullRequestOpened(c) => &c.repository,
            ContributionRecord::PullRequestReviewed(c) => &c.repository,
            ContributionRecord::IssueOpened(c) => &c.repository,
            ContributionRecord::IssueClosed(c) => &c.repository,
            ContributionRecord::PrComment(c) => &c.repository,
            ContributionRecord::BranchCreated(c) => &c.repository,
        }
    }
}

/// Truncate a comment body to [`COMMENT_EXCERPT_CHARS`] characters plus an ellipsis
pub fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(COMMENT_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_state_wins_over_closed() {
        assert_eq!(
            PullRequestState::from_source("closed", true),
            PullRequestState::Merged
        );
        assert_eq!(
            PullRequestState::from_source("closed", false),
            PullRequestState::Closed
        );
        assert_eq!(
            PullRequestState::from_source("open", false),
            PullRequestState::Open
        );
    }

    #[test]
    fn pull_request_state_serializes_lowercase() {
        let json = serde_json::to_string(&PullRequestState::Merged).unwrap();
        assert_eq!(json, "\"merged\"");
    }

    #[test]
    fn short_bodies_are_kept_verbatim() {
        assert_eq!(excerpt("LGTM"), "LGTM");
        assert_eq!(excerpt(""), "");
    }

    #[test]
    fn long_bodies_are_truncated_with_ellipsis() {
        let body = "a".repeat(150);
        let short = excerpt(&body);
        assert_eq!(short.len(), COMMENT_EXCERPT_CHARS + 3);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let body = "ç".repeat(COMMENT_EXCERPT_CHARS);
        assert_eq!(excerpt(&body), body);
    }

    #[test]
    fn kind_names_match_report_keys() {
        assert_eq!(ContributionKind::PrComments.to_string(), "pr_comments");
        assert_eq!(
            serde_json::to_string(&ContributionKind::BranchesCreated).unwrap(),
            "\"branches_created\""
        );
    }
}
