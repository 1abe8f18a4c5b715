//! In-memory implementation of the source API port
//!
//! Holds per-repository fixtures, can be told to fail for chosen
//! repositories, branches or pull requests, and counts the calls it serves.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::domain::ports::{
    RateLimitStatus, SourceApi, SourceBranch, SourceBranchHead, SourceComment, SourceCommit,
    SourceIssue, SourceIssueEvent, SourcePullRequest, SourceRepo, SourceReview,
};
use crate::error::SourceError;

#[derive(Default, Clone)]
struct RepoFixture {
    commits: Vec<SourceCommit>,
    pull_requests: Vec<SourcePullRequest>,
    issues: Vec<SourceIssue>,
    issue_events: HashMap<u64, Vec<SourceIssueEvent>>,
    branches: Vec<(SourceBranch, SourceCommit)>,
    reviews: HashMap<u64, Vec<SourceReview>>,
    issue_comments: HashMap<u64, Vec<SourceComment>>,
    review_comments: HashMap<u64, Vec<SourceComment>>,
}

pub struct InMemorySource {
    org: String,
    repo_order: Vec<String>,
    repos: Arc<RwLock<HashMap<String, RepoFixture>>>,
    failing_repos: HashSet<String>,
    failing_branches: HashSet<(String, String)>,
    failing_pull_requests: HashSet<(String, u64)>,
    failing_issues: HashSet<(String, u64)>,
    rate_limit: RateLimitStatus,
    calls: Arc<RwLock<HashMap<&'static str, usize>>>,
    rate_limit_checks: AtomicUsize,
    branch_samples: AtomicUsize,
}

impl InMemorySource {
    pub fn new(org: &str) -> Self {
        Self {
            org: org.to_string(),
            repo_order: Vec::new(),
            repos: Arc::new(RwLock::new(HashMap::new())),
            failing_repos: HashSet::new(),
            failing_branches: HashSet::new(),
            failing_pull_requests: HashSet::new(),
            failing_issues: HashSet::new(),
            rate_limit: RateLimitStatus {
                remaining: 5000,
                reset_at: Utc::now() + chrono::Duration::hours(1),
            },
            calls: Arc::new(RwLock::new(HashMap::new())),
            rate_limit_checks: AtomicUsize::new(0),
            branch_samples: AtomicUsize::new(0),
        }
    }

    pub fn with_repo(mut self, name: &str) -> Self {
        if !self.repo_order.iter().any(|r| r == name) {
            self.repo_order.push(name.to_string());
        }
        self.repos
            .write()
            .unwrap()
            .entry(name.to_string())
            .or_default();
        self
    }

    fn update(self, repo: &str, f: impl FnOnce(&mut RepoFixture)) -> Self {
        let this = self.with_repo(repo);
        f(this.repos.write().unwrap().entry(repo.to_string()).or_default());
        this
    }

    pub fn with_commit(self, repo: &str, commit: SourceCommit) -> Self {
        self.update(repo, |r| r.commits.push(commit))
    }

    pub fn with_pull_request(self, repo: &str, pr: SourcePullRequest) -> Self {
        self.update(repo, |r| r.pull_requests.push(pr))
    }

    pub fn with_issue(self, repo: &str, issue: SourceIssue) -> Self {
        self.update(repo, |r| r.issues.push(issue))
    }

    pub fn with_issue_event(self, repo: &str, issue_number: u64, event: SourceIssueEvent) -> Self {
        self.update(repo, |r| {
            r.issue_events.entry(issue_number).or_default().push(event)
        })
    }

    /// Add a branch whose sampled commit is `commit`
    pub fn with_branch(self, repo: &str, name: &str, commit: SourceCommit) -> Self {
        let branch = SourceBranch {
            name: name.to_string(),
            commit: SourceBranchHead {
                sha: commit.sha.clone(),
                url: commit.html_url.clone(),
            },
        };
        self.update(repo, |r| r.branches.push((branch, commit)))
    }

    pub fn with_review(self, repo: &str, pr_number: u64, review: SourceReview) -> Self {
        self.update(repo, |r| r.reviews.entry(pr_number).or_default().push(review))
    }

    pub fn with_issue_comment(self, repo: &str, pr_number: u64, comment: SourceComment) -> Self {
        self.update(repo, |r| {
            r.issue_comments.entry(pr_number).or_default().push(comment)
        })
    }

    pub fn with_review_comment(self, repo: &str, pr_number: u64, comment: SourceComment) -> Self {
        self.update(repo, |r| {
            r.review_comments.entry(pr_number).or_default().push(comment)
        })
    }

    pub fn with_rate_limit(mut self, remaining: u32, reset_at: DateTime<Utc>) -> Self {
        self.rate_limit = RateLimitStatus {
            remaining,
            reset_at,
        };
        self
    }

    /// Every listing for `repo` fails
    pub fn failing_repo(mut self, repo: &str) -> Self {
        self.failing_repos.insert(repo.to_string());
        self
    }

    pub fn failing_branch(mut self, repo: &str, branch: &str) -> Self {
        self.failing_branches
            .insert((repo.to_string(), branch.to_string()));
        self
    }

    /// Review and comment lookups for one pull request fail
    pub fn failing_pull_request(mut self, repo: &str, pr_number: u64) -> Self {
        self.failing_pull_requests
            .insert((repo.to_string(), pr_number));
        self
    }

    /// Event timeline lookups for one issue fail
    pub fn failing_issue(mut self, repo: &str, issue_number: u64) -> Self {
        self.failing_issues.insert((repo.to_string(), issue_number));
        self
    }

    /// Number of calls served for one operation
    pub fn calls(&self, operation: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn rate_limit_checks(&self) -> usize {
        self.rate_limit_checks.load(Ordering::SeqCst)
    }

    pub fn branch_samples(&self) -> usize {
        self.branch_samples.load(Ordering::SeqCst)
    }

    fn track(&self, operation: &'static str) {
        *self.calls.write().unwrap().entry(operation).or_insert(0) += 1;
    }

    /// Fixture for `repo`, failing when the repository is marked as failing
    fn repo(&self, repo: &str) -> Result<RepoFixture, SourceError> {
        if self.failing_repos.contains(repo) {
            return Err(SourceError::Api {
                status: 500,
                message: format!("{} is unavailable", repo),
            });
        }
        self.repos
            .read()
            .unwrap()
            .get(repo)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(repo.to_string()))
    }

    fn pull_request_guard(&self, repo: &str, pr_number: u64) -> Result<(), SourceError> {
        if self
            .failing_pull_requests
            .contains(&(repo.to_string(), pr_number))
        {
            return Err(SourceError::Api {
                status: 502,
                message: format!("{}#{} is unavailable", repo, pr_number),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SourceApi for InMemorySource {
    fn organization(&self) -> &str {
        &self.org
    }

    async fn list_repositories(&self) -> Result<Vec<SourceRepo>, SourceError> {
        self.track("list_repositories");
        Ok(self
            .repo_order
            .iter()
            .map(|name| SourceRepo {
                name: name.clone(),
                full_name: Some(format!("{}/{}", self.org, name)),
                archived: false,
            })
            .collect())
    }

    async fn list_commits(
        &self,
        repo: &str,
        _since: DateTime<Utc>,
        _until: DateTime<Utc>,
    ) -> Result<Vec<SourceCommit>, SourceError> {
        self.track("list_commits");
        Ok(self.repo(repo)?.commits)
    }

    async fn list_pull_requests(&self, repo: &str) -> Result<Vec<SourcePullRequest>, SourceError> {
        self.track("list_pull_requests");
        Ok(self.repo(repo)?.pull_requests)
    }

    async fn list_issues(
        &self,
        repo: &str,
        _since: DateTime<Utc>,
    ) -> Result<Vec<SourceIssue>, SourceError> {
        self.track("list_issues");
        Ok(self.repo(repo)?.issues)
    }

    async fn list_issue_events(
        &self,
        repo: &str,
        issue_number: u64,
    ) -> Result<Vec<SourceIssueEvent>, SourceError> {
        self.track("list_issue_events");
        if self.failing_issues.contains(&(repo.to_string(), issue_number)) {
            return Err(SourceError::Api {
                status: 502,
                message: format!("{}#{} timeline is unavailable", repo, issue_number),
            });
        }
        Ok(self
            .repo(repo)?
            .issue_events
            .remove(&issue_number)
            .unwrap_or_default())
    }

    async fn list_branches(&self, repo: &str) -> Result<Vec<SourceBranch>, SourceError> {
        self.track("list_branches");
        Ok(self
            .repo(repo)?
            .branches
            .into_iter()
            .map(|(branch, _)| branch)
            .collect())
    }

    async fn sample_branch_commit(
        &self,
        repo: &str,
        branch: &str,
    ) -> Result<Option<SourceCommit>, SourceError> {
        self.track("sample_branch_commit");
        self.branch_samples.fetch_add(1, Ordering::SeqCst);
        if self
            .failing_branches
            .contains(&(repo.to_string(), branch.to_string()))
        {
            return Err(SourceError::NotFound(format!("{}@{}", repo, branch)));
        }
        Ok(self
            .repo(repo)?
            .branches
            .into_iter()
            .find(|(b, _)| b.name == branch)
            .map(|(_, commit)| commit))
    }

    async fn list_reviews(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceReview>, SourceError> {
        self.track("list_reviews");
        self.pull_request_guard(repo, pr_number)?;
        Ok(self.repo(repo)?.reviews.remove(&pr_number).unwrap_or_default())
    }

    async fn list_issue_comments(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceComment>, SourceError> {
        self.track("list_issue_comments");
        self.pull_request_guard(repo, pr_number)?;
        Ok(self
            .repo(repo)?
            .issue_comments
            .remove(&pr_number)
            .unwrap_or_default())
    }

    async fn list_review_comments(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceComment>, SourceError> {
        self.track("list_review_comments");
        self.pull_request_guard(repo, pr_number)?;
        Ok(self
            .repo(repo)?
            .review_comments
            .remove(&pr_number)
            .unwrap_or_default())
    }

    async fn rate_limit(&self) -> Result<RateLimitStatus, SourceError> {
        self.rate_limit_checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.rate_limit)
    }
}
