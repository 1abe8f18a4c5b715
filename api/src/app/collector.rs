//! Per-repository collector
//!
//! Retrieves every raw record of one repository that falls inside the
//! aggregation window. Commits, pull requests, issues and branches are
//! fetched concurrently; reviews, comments and issue timelines depend on
//! the first round and are fetched afterwards in bounded batches.

use std::sync::Arc;

use crate::domain::entities::AggregationWindow;
use crate::domain::ports::{
    SourceApi, SourceComment, SourceCommit, SourceIssue, SourcePullRequest, SourceReview,
};
use crate::error::SourceError;

use super::batch::run_in_batches;
use super::branch_estimator::{BranchEstimator, BranchEstimatorSettings, EstimatedBranch};

/// Review state of a plain comment without an approve/request-changes verdict
const COMMENTED_REVIEW_STATE: &str = "COMMENTED";

#[derive(Debug, Clone, Copy)]
pub struct CollectorSettings {
    /// Sub-fetches (reviews, comments, issue timelines) in flight per repository
    pub request_width: usize,
    pub count_comment_reviews: bool,
    pub branches: BranchEstimatorSettings,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            request_width: 10,
            count_comment_reviews: true,
            branches: BranchEstimatorSettings::default(),
        }
    }
}

/// Pull request a review or comment belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub number: u64,
    pub title: String,
    pub url: String,
}

impl From<&SourcePullRequest> for PullRequestRef {
    fn from(pr: &SourcePullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title.clone(),
            url: pr.html_url.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CollectedReview {
    pub review: SourceReview,
    pub pull_request: PullRequestRef,
}

#[derive(Debug, Clone)]
pub struct CollectedComment {
    pub comment: SourceComment,
    pub pull_request: PullRequestRef,
}

#[derive(Debug, Clone)]
pub struct CollectedIssue {
    pub issue: SourceIssue,
    pub opened_in_window: bool,
    pub closed_in_window: bool,
    /// Actor of the last `closed` event, resolved only when closed in the window
    pub closed_by: Option<String>,
}

/// Everything one repository contributed inside the window
#[derive(Debug, Clone, Default)]
pub struct CollectedRepository {
    pub commits: Vec<SourceCommit>,
    pub pull_requests: Vec<SourcePullRequest>,
    pub issues: Vec<CollectedIssue>,
    pub branches: Vec<EstimatedBranch>,
    pub reviews: Vec<CollectedReview>,
    pub comments: Vec<CollectedComment>,
}

impl CollectedRepository {
    pub fn record_count(&self) -> usize {
        self.commits.len()
            + self.pull_requests.len()
            + self.issues.len()
            + self.branches.len()
            + self.reviews.len()
            + self.comments.len()
    }
}

pub struct RepositoryCollector<S: SourceApi + ?Sized> {
    source: Arc<S>,
    branches: BranchEstimator<S>,
    settings: CollectorSettings,
}

impl<S: SourceApi + ?Sized> RepositoryCollector<S> {
    pub fn new(source: Arc<S>, settings: CollectorSettings) -> Self {
        Self {
            branches: BranchEstimator::new(Arc::clone(&source), settings.branches),
            source,
            settings,
        }
    }

    /// Collect the window's records for one repository
    ///
    /// Fails when one of the four primary listings fails. Failures of
    /// individual pull request, issue or branch lookups only drop that item.
    pub async fn collect(
        &self,
        repo: &str,
        window: &AggregationWindow,
    ) -> Result<CollectedRepository, SourceError> {
        let start = window.start_instant();
        let end = window.end_instant();

        let (commits, pull_requests, issues, branches) = tokio::join!(
            self.source.list_commits(repo, start, end),
            self.source.list_pull_requests(repo),
            self.source.list_issues(repo, start),
            self.branches.estimate(repo, window),
        );

        let commits: Vec<SourceCommit> = commits?
            .into_iter()
            .filter(|c| c.authored_at().is_some_and(|at| window.contains(at)))
            .collect();

        let pull_requests: Vec<SourcePullRequest> = pull_requests?
            .into_iter()
            .filter(|pr| window.contains(pr.created_at))
            .collect();

        let issues = self.resolve_issues(repo, window, issues?).await;
        let reviews = self.collect_reviews(repo, window, &pull_requests).await;
        let comments = self.collect_comments(repo, window, &pull_requests).await;

        Ok(CollectedRepository {
            commits,
            pull_requests,
            issues,
            branches,
            reviews,
            comments,
        })
    }

    async fn resolve_issues(
        &self,
        repo: &str,
        window: &AggregationWindow,
        issues: Vec<SourceIssue>,
    ) -> Vec<CollectedIssue> {
        let relevant: Vec<CollectedIssue> = issues
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .map(|issue| CollectedIssue {
                opened_in_window: window.contains(issue.created_at),
                closed_in_window: issue.closed_at.is_some_and(|at| window.contains(at)),
                closed_by: None,
                issue,
            })
            .filter(|c| c.opened_in_window || c.closed_in_window)
            .collect();

        run_in_batches(relevant, self.settings.request_width, |mut collected| async move {
            if collected.closed_in_window {
                collected.closed_by = self.find_closer(repo, collected.issue.number).await;
            }
            collected
        })
        .await
    }

    async fn find_closer(&self, repo: &str, issue_number: u64) -> Option<String> {
        match self.source.list_issue_events(repo, issue_number).await {
            Ok(events) => events
                .into_iter()
                .filter(|e| e.event == "closed")
                .filter_map(|e| e.actor.map(|a| (e.created_at, a.login)))
                .max_by_key(|(at, _)| *at)
                .map(|(_, login)| login),
            Err(e) => {
                tracing::warn!(repo = %repo, issue = issue_number, "Failed to load issue events: {}", e);
                None
            }
        }
    }

    async fn collect_reviews(
        &self,
        repo: &str,
        window: &AggregationWindow,
        pull_requests: &[SourcePullRequest],
    ) -> Vec<CollectedReview> {
        let prs: Vec<&SourcePullRequest> = pull_requests.iter().collect();
        let per_pr = run_in_batches(prs, self.settings.request_width, |pr| async move {
            match self.source.list_reviews(repo, pr.number).await {
                Ok(reviews) => reviews
                    .into_iter()
                    .filter(|r| self.counts_review(r, window))
                    .map(|review| CollectedReview {
                        review,
                        pull_request: PullRequestRef::from(pr),
                    })
                    .collect::<Vec<_>>(),
                Err(e) => {
                    tracing::warn!(repo = %repo, pr = pr.number, "Failed to load reviews: {}", e);
                    Vec::new()
                }
            }
        })
        .await;

        per_pr.into_iter().flatten().collect()
    }

    /// Pending reviews have no submission time and never count
    fn counts_review(&self, review: &SourceReview, window: &AggregationWindow) -> bool {
        let Some(submitted_at) = review.submitted_at else {
            return false;
        };
        if !self.settings.count_comment_reviews && review.state == COMMENTED_REVIEW_STATE {
            return false;
        }
        window.contains(submitted_at)
    }

    async fn collect_comments(
        &self,
        repo: &str,
        window: &AggregationWindow,
        pull_requests: &[SourcePullRequest],
    ) -> Vec<CollectedComment> {
        let prs: Vec<&SourcePullRequest> = pull_requests.iter().collect();
        let per_pr = run_in_batches(prs, self.settings.request_width, |pr| async move {
            let (conversation, inline) = tokio::join!(
                self.source.list_issue_comments(repo, pr.number),
                self.source.list_review_comments(repo, pr.number),
            );

            let mut comments = Vec::new();
            for listing in [conversation, inline] {
                match listing {
                    Ok(found) => comments.extend(found),
                    Err(e) => {
                        tracing::warn!(repo = %repo, pr = pr.number, "Failed to load comments: {}", e)
                    }
                }
            }

            comments
                .into_iter()
                .filter(|c| window.contains(c.created_at))
                .map(|comment| CollectedComment {
                    comment,
                    pull_request: PullRequestRef::from(pr),
                })
                .collect::<Vec<_>>()
        })
        .await;

        per_pr.into_iter().flatten().collect()
    }
}
