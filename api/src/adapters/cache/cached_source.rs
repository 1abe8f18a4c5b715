//! Caching decorator for any [`SourceApi`]
//!
//! Listings are memoized under a key built from the operation name and its
//! filtering parameters. Quota checks always go to the wrapped source.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    RateLimitStatus, SourceApi, SourceBranch, SourceComment, SourceCommit, SourceIssue,
    SourceIssueEvent, SourcePullRequest, SourceRepo, SourceReview,
};
use crate::error::SourceError;

use super::ResponseCache;

pub struct CachedSource<S> {
    inner: S,
    cache: ResponseCache,
}

impl<S: SourceApi> CachedSource<S> {
    pub fn new(inner: S, cache: ResponseCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn key(&self, operation: &str, params: &[&str]) -> String {
        let mut key = format!("{}:{}", self.inner.organization(), operation);
        for param in params {
            key.push(':');
            key.push_str(param);
        }
        key
    }
}

#[async_trait]
impl<S: SourceApi> SourceApi for CachedSource<S> {
    fn organization(&self) -> &str {
        self.inner.organization()
    }

    async fn list_repositories(&self) -> Result<Vec<SourceRepo>, SourceError> {
        let key = self.key("repos", &[]);
        self.cache
            .with_cache(key, || self.inner.list_repositories())
            .await
    }

    async fn list_commits(
        &self,
        repo: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SourceCommit>, SourceError> {
        let key = self.key("commits", &[repo, &since.to_rfc3339(), &until.to_rfc3339()]);
        self.cache
            .with_cache(key, || self.inner.list_commits(repo, since, until))
            .await
    }

    async fn list_pull_requests(&self, repo: &str) -> Result<Vec<SourcePullRequest>, SourceError> {
        let key = self.key("pulls", &[repo]);
        self.cache
            .with_cache(key, || self.inner.list_pull_requests(repo))
            .await
    }

    async fn list_issues(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SourceIssue>, SourceError> {
        let key = self.key("issues", &[repo, &since.to_rfc3339()]);
        self.cache
            .with_cache(key, || self.inner.list_issues(repo, since))
            .await
    }

    async fn list_issue_events(
        &self,
        repo: &str,
        issue_number: u64,
    ) -> Result<Vec<SourceIssueEvent>, SourceError> {
        let key = self.key("issue_events", &[repo, &issue_number.to_string()]);
        self.cache
            .with_cache(key, || self.inner.list_issue_events(repo, issue_number))
            .await
    }

    async fn list_branches(&self, repo: &str) -> Result<Vec<SourceBranch>, SourceError> {
        let key = self.key("branches", &[repo]);
        self.cache
            .with_cache(key, || self.inner.list_branches(repo))
            .await
    }

    async fn sample_branch_commit(
        &self,
        repo: &str,
        branch: &str,
    ) -> Result<Option<SourceCommit>, SourceError> {
        let key = self.key("branch_commit", &[repo, branch]);
        self.cache
            .with_cache(key, || self.inner.sample_branch_commit(repo, branch))
            .await
    }

    async fn list_reviews(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceReview>, SourceError> {
        let key = self.key("reviews", &[repo, &pr_number.to_string()]);
        self.cache
            .with_cache(key, || self.inner.list_reviews(repo, pr_number))
            .await
    }

    async fn list_issue_comments(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceComment>, SourceError> {
        let key = self.key("issue_comments", &[repo, &pr_number.to_string()]);
        self.cache
            .with_cache(key, || self.inner.list_issue_comments(repo, pr_number))
            .await
    }

    async fn list_review_comments(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceComment>, SourceError> {
        let key = self.key("review_comments", &[repo, &pr_number.to_string()]);
        self.cache
            .with_cache(key, || self.inner.list_review_comments(repo, pr_number))
            .await
    }

    async fn rate_limit(&self) -> Result<RateLimitStatus, SourceError> {
        self.inner.rate_limit().await
    }
}
