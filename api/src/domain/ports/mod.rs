//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod source;

pub use source::{
    RateLimitStatus, SourceApi, SourceBranch, SourceBranchHead, SourceComment, SourceCommit,
    SourceCommitDetail, SourceGitSignature, SourceIssue, SourceIssueEvent, SourcePullRequest,
    SourcePullRequestMarker, SourceRepo, SourceReview, SourceUser,
};
