//! Ranked aggregation result

use serde::{Deserialize, Serialize};

use super::contributor::ContributorProfile;
use super::window::AggregationWindow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub range: AggregationWindow,
    /// Sorted by score descending, then username ascending
    pub developers: Vec<ContributorProfile>,
}

impl Report {
    pub fn top(&self, n: usize) -> &[ContributorProfile] {
        &self.developers[..n.min(self.developers.len())]
    }

    pub fn find(&self, username: &str) -> Option<&ContributorProfile> {
        self.developers.iter().find(|d| d.username == username)
    }

    pub fn is_empty(&self) -> bool {
        self.developers.is_empty()
    }
}
