//! Contribution accumulator
//!
//! Maps contributor logins to their profiles for one aggregation run and
//! turns collected repository records into attributed contributions.
//! Records without a resolvable login are skipped.

use std::collections::HashMap;

use crate::domain::entities::{
    excerpt, AggregationWindow, BranchContribution, CommentContribution, CommitContribution,
    ContributionRecord, ContributorProfile, IssueClosedContribution, IssueOpenedContribution,
    PullRequestContribution, PullRequestState, Report, ReviewContribution,
};

use super::collector::CollectedRepository;
use super::scoring::rank;
use super::ScoreWeights;

#[derive(Debug, Default)]
pub struct Accumulator {
    profiles: HashMap<String, ContributorProfile>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn get(&self, username: &str) -> Option<&ContributorProfile> {
        self.profiles.get(username)
    }

    /// Profile for `username`, created empty on first sight
    pub fn ensure(&mut self, username: &str) -> &mut ContributorProfile {
        self.profiles
            .entry(username.to_string())
            .or_insert_with(|| ContributorProfile::new(username))
    }

    pub fn record(&mut self, username: &str, record: ContributionRecord) {
        self.ensure(username).contributions.push(record);
    }

    /// Attribute everything collected for `repo`, returning the number of records kept
    pub fn merge(&mut self, repo: &str, collected: CollectedRepository) -> usize {
        let mut merged = 0;
        let mut skipped = 0;
        let mut attribute = |acc: &mut Self, login: Option<&str>, record: ContributionRecord| {
            match login {
                Some(login) => {
                    acc.record(login, record);
                    merged += 1;
                }
                None => skipped += 1,
            }
        };

        for commit in collected.commits {
            let Some(date) = commit.authored_at() else {
                continue;
            };
            let login = commit.author_login().map(str::to_string);
            let record = ContributionRecord::Commit(CommitContribution {
                url: commit.html_url,
                sha: commit.sha,
                message: commit.commit.message,
                repository: repo.to_string(),
                date,
            });
            attribute(self, login.as_deref(), record);
        }

        for pr in collected.pull_requests {
            let record = ContributionRecord::PullRequestOpened(PullRequestContribution {
                state: PullRequestState::from_source(&pr.state, pr.merged_at.is_some()),
                url: pr.html_url,
                number: pr.number,
                title: pr.title,
                repository: repo.to_string(),
                created_at: pr.created_at,
            });
            attribute(self, pr.user.as_ref().map(|u| u.login.as_str()), record);
        }

        for review in collected.reviews {
            let Some(submitted_at) = review.review.submitted_at else {
                continue;
            };
            let record = ContributionRecord::PullRequestReviewed(ReviewContribution {
                url: review.review.html_url,
                pr_url: review.pull_request.url,
                pr_number: review.pull_request.number,
                pr_title: review.pull_request.title,
                repository: repo.to_string(),
                state: review.review.state,
                submitted_at,
            });
            attribute(self, review.review.user.as_ref().map(|u| u.login.as_str()), record);
        }

        for collected_issue in collected.issues {
            let issue = collected_issue.issue;
            if collected_issue.opened_in_window {
                let record = ContributionRecord::IssueOpened(IssueOpenedContribution {
                    url: issue.html_url.clone(),
                    number: issue.number,
                    title: issue.title.clone(),
                    repository: repo.to_string(),
                    state: issue.state.clone(),
                    created_at: issue.created_at,
                });
                attribute(self, issue.user.as_ref().map(|u| u.login.as_str()), record);
            }
            if let (true, Some(closed_at)) = (collected_issue.closed_in_window, issue.closed_at) {
                let record = ContributionRecord::IssueClosed(IssueClosedContribution {
                    url: issue.html_url,
                    number: issue.number,
                    title: issue.title,
                    repository: repo.to_string(),
                    closed_at,
                });
                attribute(self, collected_issue.closed_by.as_deref(), record);
            }
        }

        for comment in collected.comments {
            let record = ContributionRecord::PrComment(CommentContribution {
                url: comment.comment.html_url,
                pr_url: comment.pull_request.url,
                pr_number: comment.pull_request.number,
                pr_title: comment.pull_request.title,
                repository: repo.to_string(),
                body: excerpt(comment.comment.body.as_deref().unwrap_or_default()),
                created_at: comment.comment.created_at,
            });
            attribute(self, comment.comment.user.as_ref().map(|u| u.login.as_str()), record);
        }

        for branch in collected.branches {
            let record = ContributionRecord::BranchCreated(BranchContribution {
                name: branch.name,
                repository: repo.to_string(),
                created_at: branch.created_at,
                commit_sha: branch.commit_sha,
                commit_url: branch.commit_url,
            });
            attribute(self, branch.creator.as_deref(), record);
        }

        if skipped > 0 {
            tracing::debug!(repo = %repo, skipped, "Skipped records without a resolvable author");
        }
        merged
    }

    /// Score every profile and produce the ranked report
    pub fn into_report(self, window: AggregationWindow, weights: &ScoreWeights) -> Report {
        Report {
            range: window,
            developers: rank(self.profiles.into_values().collect(), weights),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::branch_estimator::EstimatedBranch;
    use crate::app::collector::{CollectedComment, CollectedIssue, CollectedReview, PullRequestRef};
    use crate::domain::entities::ContributionKind;
    use crate::test_utils::fixtures;

    fn window() -> AggregationWindow {
        AggregationWindow::parse("2024-01-01", "2024-01-31").unwrap()
    }

    fn pr_ref() -> PullRequestRef {
        PullRequestRef {
            number: 1,
            title: "Add endpoint".to_string(),
            url: "https://github.com/acme/api/pull/1".to_string(),
        }
    }

    #[test]
    fn ensure_creates_profile_once() {
        let mut acc = Accumulator::new();
        acc.ensure("alice");
        acc.ensure("alice").score = 3;

        assert_eq!(acc.len(), 1);
        assert_eq!(acc.get("alice").unwrap().score, 3);
    }

    #[test]
    fn commits_without_author_are_skipped() {
        let mut acc = Accumulator::new();
        let collected = CollectedRepository {
            commits: vec![
                fixtures::commit("c1", Some("alice"), "2024-01-05T10:00:00Z"),
                fixtures::commit("c2", None, "2024-01-06T10:00:00Z"),
            ],
            ..Default::default()
        };

        let merged = acc.merge("api", collected);

        assert_eq!(merged, 1);
        assert_eq!(acc.len(), 1);
        let alice = acc.get("alice").unwrap();
        assert_eq!(alice.contributions.commits.items()[0].sha, "c1");
        assert_eq!(alice.contributions.commits.items()[0].repository, "api");
    }

    #[test]
    fn merged_pull_request_state_is_merged() {
        let mut acc = Accumulator::new();
        let collected = CollectedRepository {
            pull_requests: vec![fixtures::pull_request(
                7,
                "alice",
                "2024-01-10T10:00:00Z",
                Some("2024-01-12T10:00:00Z"),
            )],
            ..Default::default()
        };

        acc.merge("api", collected);

        let pr = &acc.get("alice").unwrap().contributions.pull_requests_opened.items()[0];
        assert_eq!(pr.state, PullRequestState::Merged);
        assert_eq!(pr.number, 7);
    }

    #[test]
    fn opener_and_closer_get_separate_entries() {
        let mut issue = fixtures::issue(3, "bob", "2024-01-02T10:00:00Z");
        issue.closed_at = Some(fixtures::ts("2024-01-20T10:00:00Z"));
        let collected = CollectedRepository {
            issues: vec![CollectedIssue {
                issue,
                opened_in_window: true,
                closed_in_window: true,
                closed_by: Some("carol".to_string()),
            }],
            ..Default::default()
        };

        let mut acc = Accumulator::new();
        acc.merge("api", collected);

        let bob = &acc.get("bob").unwrap().contributions;
        let carol = &acc.get("carol").unwrap().contributions;
        assert_eq!(bob.count(ContributionKind::IssuesOpened), 1);
        assert_eq!(bob.count(ContributionKind::IssuesClosed), 0);
        assert_eq!(carol.count(ContributionKind::IssuesOpened), 0);
        assert_eq!(carol.count(ContributionKind::IssuesClosed), 1);
    }

    #[test]
    fn unresolved_closer_records_nothing_for_closing() {
        let mut issue = fixtures::issue(3, "bob", "2023-12-02T10:00:00Z");
        issue.closed_at = Some(fixtures::ts("2024-01-20T10:00:00Z"));
        let collected = CollectedRepository {
            issues: vec![CollectedIssue {
                issue,
                opened_in_window: false,
                closed_in_window: true,
                closed_by: None,
            }],
            ..Default::default()
        };

        let mut acc = Accumulator::new();
        assert_eq!(acc.merge("api", collected), 0);
        assert!(acc.is_empty());
    }

    #[test]
    fn reviews_comments_and_branches_carry_their_context() {
        let collected = CollectedRepository {
            reviews: vec![CollectedReview {
                review: fixtures::review(10, "bob", "APPROVED", Some("2024-01-11T10:00:00Z")),
                pull_request: pr_ref(),
            }],
            comments: vec![CollectedComment {
                comment: fixtures::comment(100, "bob", &"x".repeat(120), "2024-01-11T10:00:00Z"),
                pull_request: pr_ref(),
            }],
            branches: vec![EstimatedBranch {
                name: "feature/x".to_string(),
                repository: "api".to_string(),
                created_at: fixtures::ts("2024-01-09T10:00:00Z"),
                commit_sha: "b1".to_string(),
                commit_url: "https://github.com/acme/api/commit/b1".to_string(),
                creator: Some("bob".to_string()),
            }],
            ..Default::default()
        };

        let mut acc = Accumulator::new();
        assert_eq!(acc.merge("api", collected), 3);

        let bob = &acc.get("bob").unwrap().contributions;
        let review = &bob.pull_requests_reviewed.items()[0];
        assert_eq!(review.pr_number, 1);
        assert_eq!(review.pr_url, "https://github.com/acme/api/pull/1");
        assert_eq!(review.state, "APPROVED");

        let comment = &bob.pr_comments.items()[0];
        assert_eq!(comment.pr_title, "Add endpoint");
        assert!(comment.body.ends_with("..."));
        assert_eq!(comment.body.chars().count(), 103);

        assert_eq!(bob.branches_created.items()[0].name, "feature/x");
    }

    #[test]
    fn report_is_scored_and_sorted() {
        let mut acc = Accumulator::new();
        acc.record("zed", fixtures::commit_record("api", "z1"));
        acc.record("amy", fixtures::pull_request_record("api", 1));

        let report = acc.into_report(window(), &ScoreWeights::default());

        assert_eq!(report.developers[0].username, "amy");
        assert_eq!(report.developers[0].score, 5);
        assert_eq!(report.developers[1].username, "zed");
        assert_eq!(report.developers[1].score, 2);
    }
}
