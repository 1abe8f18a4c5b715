//! Test fixtures
//!
//! Factory functions for creating source records and contributions with
//! sensible defaults. Timestamps are RFC 3339 strings for readability.

use chrono::{DateTime, Utc};

use crate::domain::entities::{
    CommitContribution, ContributionRecord, PullRequestContribution, PullRequestState,
};
use crate::domain::ports::{
    SourceComment, SourceCommit, SourceCommitDetail, SourceGitSignature, SourceIssue,
    SourceIssueEvent, SourcePullRequest, SourcePullRequestMarker, SourceReview, SourceUser,
};

/// Parse an RFC 3339 timestamp
pub fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .unwrap()
        .with_timezone(&Utc)
}

fn user(login: &str) -> Option<SourceUser> {
    Some(SourceUser {
        login: login.to_string(),
    })
}

/// Commit authored and committed at `date`; `login` is the linked account
pub fn commit(sha: &str, login: Option<&str>, date: &str) -> SourceCommit {
    let signature = SourceGitSignature {
        name: Some(login.unwrap_or("Unknown").to_string()),
        date: Some(ts(date)),
    };
    SourceCommit {
        sha: sha.to_string(),
        html_url: format!("https://github.com/acme/repo/commit/{}", sha),
        author: login.and_then(user),
        commit: SourceCommitDetail {
            message: format!("Commit {}", sha),
            author: Some(signature.clone()),
            committer: Some(signature),
        },
    }
}

/// Pull request opened by `login`; merged when `merged_at` is given
pub fn pull_request(number: u64, login: &str, created_at: &str, merged_at: Option<&str>) -> SourcePullRequest {
    SourcePullRequest {
        number,
        title: format!("Pull request {}", number),
        html_url: format!("https://github.com/acme/repo/pull/{}", number),
        state: if merged_at.is_some() { "closed" } else { "open" }.to_string(),
        user: user(login),
        created_at: ts(created_at),
        merged_at: merged_at.map(ts),
    }
}

/// Open issue created by `login`
pub fn issue(number: u64, login: &str, created_at: &str) -> SourceIssue {
    SourceIssue {
        number,
        title: format!("Issue {}", number),
        html_url: format!("https://github.com/acme/repo/issues/{}", number),
        state: "open".to_string(),
        user: user(login),
        created_at: ts(created_at),
        closed_at: None,
        pull_request: None,
    }
}

/// Issue listing entry that is really a pull request
pub fn issue_as_pull_request(number: u64, login: &str, created_at: &str) -> SourceIssue {
    SourceIssue {
        html_url: format!("https://github.com/acme/repo/pull/{}", number),
        pull_request: Some(SourcePullRequestMarker {
            url: Some(format!("https://api.github.com/repos/acme/repo/pulls/{}", number)),
        }),
        ..issue(number, login, created_at)
    }
}

pub fn closed_event(login: &str, at: &str) -> SourceIssueEvent {
    SourceIssueEvent {
        event: "closed".to_string(),
        actor: user(login),
        created_at: ts(at),
    }
}

/// Review by `login`; pending when `submitted_at` is `None`
pub fn review(id: u64, login: &str, state: &str, submitted_at: Option<&str>) -> SourceReview {
    SourceReview {
        id,
        user: user(login),
        state: state.to_string(),
        html_url: format!("https://github.com/acme/repo/pull/1#pullrequestreview-{}", id),
        submitted_at: submitted_at.map(ts),
    }
}

pub fn comment(id: u64, login: &str, body: &str, created_at: &str) -> SourceComment {
    SourceComment {
        id,
        user: user(login),
        body: Some(body.to_string()),
        html_url: format!("https://github.com/acme/repo/pull/1#issuecomment-{}", id),
        created_at: ts(created_at),
    }
}

pub fn commit_record(repo: &str, sha: &str) -> ContributionRecord {
    ContributionRecord::Commit(CommitContribution {
        url: format!("https://github.com/acme/{}/commit/{}", repo, sha),
        sha: sha.to_string(),
        message: format!("Commit {}", sha),
        repository: repo.to_string(),
        date: ts("2024-01-05T10:00:00Z"),
    })
}

pub fn pull_request_record(repo: &str, number: u64) -> ContributionRecord {
    ContributionRecord::PullRequestOpened(PullRequestContribution {
        url: format!("https://github.com/acme/{}/pull/{}", repo, number),
        number,
        title: format!("Pull request {}", number),
        repository: repo.to_string(),
        state: PullRequestState::Open,
        created_at: ts("2024-01-10T10:00:00Z"),
    })
}
