//! Source API port trait
//!
//! Defines the interface for reading contribution data from the hosting
//! platform. All listing operations return fully depaginated results.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SourceError;

/// Helper to deserialize null as default (empty string, false, etc.)
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::deserialize(deserializer)?.unwrap_or_default())
}

/// Platform account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUser {
    pub login: String,
}

/// Organization repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRepo {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

/// Git-level author or committer signature
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceGitSignature {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceCommitDetail {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub message: String,
    #[serde(default)]
    pub author: Option<SourceGitSignature>,
    #[serde(default)]
    pub committer: Option<SourceGitSignature>,
}

/// Commit as listed for a repository or branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCommit {
    pub sha: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub html_url: String,
    /// Platform account linked to the commit; absent when the email is unknown
    #[serde(default)]
    pub author: Option<SourceUser>,
    #[serde(default)]
    pub commit: SourceCommitDetail,
}

impl SourceCommit {
    pub fn author_login(&self) -> Option<&str> {
        self.author.as_ref().map(|u| u.login.as_str())
    }

    /// Author date, falling back to the committer date
    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        let author = self.commit.author.as_ref().and_then(|s| s.date);
        author.or_else(|| self.commit.committer.as_ref().and_then(|s| s.date))
    }

    /// Committer date, falling back to the author date
    pub fn committed_at(&self) -> Option<DateTime<Utc>> {
        let committer = self.commit.committer.as_ref().and_then(|s| s.date);
        committer.or_else(|| self.commit.author.as_ref().and_then(|s| s.date))
    }
}

/// Pull request in any state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcePullRequest {
    pub number: u64,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub title: String,
    pub html_url: String,
    pub state: String,
    #[serde(default)]
    pub user: Option<SourceUser>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// PR review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReview {
    pub id: u64,
    #[serde(default)]
    pub user: Option<SourceUser>,
    pub state: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub html_url: String,
    /// Absent while the review is still pending
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Marker present on issues that are really pull requests
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcePullRequestMarker {
    #[serde(default)]
    pub url: Option<String>,
}

/// Issue as returned by the issues listing, which also includes pull requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceIssue {
    pub number: u64,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub title: String,
    pub html_url: String,
    pub state: String,
    #[serde(default)]
    pub user: Option<SourceUser>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pull_request: Option<SourcePullRequestMarker>,
}

impl SourceIssue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Entry in an issue's event timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceIssueEvent {
    pub event: String,
    #[serde(default)]
    pub actor: Option<SourceUser>,
    pub created_at: DateTime<Utc>,
}

/// Conversation or inline review comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceComment {
    pub id: u64,
    #[serde(default)]
    pub user: Option<SourceUser>,
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceBranchHead {
    pub sha: String,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceBranch {
    pub name: String,
    pub commit: SourceBranchHead,
}

/// Remaining request quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// Port trait for hosting platform reads, scoped to one organization
#[async_trait]
pub trait SourceApi: Send + Sync {
    /// Organization the source reads from
    fn organization(&self) -> &str;

    /// List every repository of the organization
    async fn list_repositories(&self) -> Result<Vec<SourceRepo>, SourceError>;

    /// List commits on the default branch between `since` and `until`
    async fn list_commits(
        &self,
        repo: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SourceCommit>, SourceError>;

    /// List pull requests in every state
    async fn list_pull_requests(&self, repo: &str) -> Result<Vec<SourcePullRequest>, SourceError>;

    /// List issues (and pull requests) updated since `since`, in every state
    async fn list_issues(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SourceIssue>, SourceError>;

    /// List the event timeline of one issue
    async fn list_issue_events(
        &self,
        repo: &str,
        issue_number: u64,
    ) -> Result<Vec<SourceIssueEvent>, SourceError>;

    /// List branches of a repository
    async fn list_branches(&self, repo: &str) -> Result<Vec<SourceBranch>, SourceError>;

    /// First entry of a branch's commit listing, fetched with a page size of one
    async fn sample_branch_commit(
        &self,
        repo: &str,
        branch: &str,
    ) -> Result<Option<SourceCommit>, SourceError>;

    /// List reviews submitted on a pull request
    async fn list_reviews(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceReview>, SourceError>;

    /// List conversation comments on a pull request
    async fn list_issue_comments(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceComment>, SourceError>;

    /// List inline code review comments on a pull request
    async fn list_review_comments(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceComment>, SourceError>;

    /// Current request quota
    async fn rate_limit(&self) -> Result<RateLimitStatus, SourceError>;
}
