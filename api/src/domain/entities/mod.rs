//! Domain entities
//!
//! Contribution records, contributor profiles and the ranked report built
//! from them.

pub mod contribution;
pub mod contributor;
pub mod report;
pub mod window;

pub use contribution::{
    excerpt, BranchContribution, CommentContribution, CommitContribution, ContributionKind,
    ContributionRecord, IssueClosedContribution, IssueOpenedContribution,
    PullRequestContribution, PullRequestState, ReviewContribution, COMMENT_EXCERPT_CHARS,
};
pub use contributor::{ContributionList, ContributorProfile, Contributions};
pub use report::Report;
pub use window::{is_iso_date, within_window, AggregationWindow};
