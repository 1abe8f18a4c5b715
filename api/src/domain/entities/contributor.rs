//! Contributor profile
//!
//! Per-contributor accumulation of contribution records, one ordered list
//! per kind. Lists keep processing order, not chronological order.

use serde::{Deserialize, Serialize};

use super::contribution::{
    BranchContribution, CommentContribution, CommitContribution, ContributionKind,
    ContributionRecord, IssueClosedContribution, IssueOpenedContribution,
    PullRequestContribution, ReviewContribution,
};

/// An append-only list that serializes as `{ number, items }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionList<T> {
    number: usize,
    items: Vec<T>,
}

impl<T> Default for ContributionList<T> {
    fn default() -> Self {
        Self {
            number: 0,
            items: Vec::new(),
        }
    }
}

impl<T> ContributionList<T> {
    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.number = self.items.len();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributions {
    pub commits: ContributionList<CommitContribution>,
    pub pull_requests_opened: ContributionList<PullRequestContribution>,
    pub pull_requests_reviewed: ContributionList<ReviewContribution>,
    pub issues_opened: ContributionList<IssueOpenedContribution>,
    pub issues_closed: ContributionList<IssueClosedContribution>,
    pub pr_comments: ContributionList<CommentContribution>,
    pub branches_created: ContributionList<BranchContribution>,
}

impl Contributions {
    pub fn count(&self, kind: ContributionKind) -> usize {
        match kind {
            ContributionKind::Commits => self.commits.len(),
            ContributionKind::PullRequestsOpened => self.pull_requests_opened.len(),
            ContributionKind::PullRequestsReviewed => self.pull_requests_reviewed.len(),
            ContributionKind::IssuesOpened => self.issues_opened.len(),
            ContributionKind::IssuesClosed => self.issues_closed.len(),
            ContributionKind::PrComments => self.pr_comments.len(),
            ContributionKind::BranchesCreated => self.branches_created.len(),
        }
    }

    pub fn total(&self) -> usize {
        ContributionKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    /// Append a record to the list for its kind
    pub fn push(&mut self, record: ContributionRecord) {
        match record {
            ContributionRecord::Commit(c) => self.commits.push(c),
            ContributionRecord::PullRequestOpened(c) => self.pull_requests_opened.push(c),
            ContributionRecord::PullRequestReviewed(c) => self.pull_requests_reviewed.push(c),
            ContributionRecord::IssueOpened(c) => self.issues_opened.push(c),
            ContributionRecord::IssueClosed(c) => self.issues_closed.push(c),
            ContributionRecord::PrComment(c) => self.pr_comments.push(c),
            ContributionRecord::BranchCreated(c) => self.branches_created.push(c),
        }
    }
}

/// A contributor and everything attributed to them during one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorProfile {
    pub username: String,
    pub score: u64,
    pub contributions: Contributions,
}

impl ContributorProfile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            score: 0,
            contributions: Contributions::default(),
        }
    }
}
