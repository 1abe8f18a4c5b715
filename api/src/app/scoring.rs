//! Score calculation and ranking

use std::cmp::Ordering;

use crate::domain::entities::{ContributionKind, Contributions, ContributorProfile};

use super::ScoreWeights;

/// Weighted sum of the per-kind counts
pub fn score(contributions: &Contributions, weights: &ScoreWeights) -> u64 {
    ContributionKind::ALL
        .iter()
        .map(|kind| contributions.count(*kind) as u64 * weights.weight(*kind))
        .sum()
}

/// Score every profile and sort by score descending, then username ascending
pub fn rank(mut profiles: Vec<ContributorProfile>, weights: &ScoreWeights) -> Vec<ContributorProfile> {
    for profile in &mut profiles {
        profile.score = score(&profile.contributions, weights);
    }
    profiles.sort_by(compare);
    profiles
}

fn compare(a: &ContributorProfile, b: &ContributorProfile) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.username.cmp(&b.username))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;

    fn profile(username: &str, commits: usize, prs: usize) -> ContributorProfile {
        let mut profile = ContributorProfile::new(username);
        for i in 0..commits {
            profile
                .contributions
                .push(fixtures::commit_record("api", &format!("{}{}", username, i)));
        }
        for i in 0..prs {
            profile
                .contributions
                .push(fixtures::pull_request_record("api", i as u64 + 1));
        }
        profile
    }

    #[test]
    fn score_is_weighted_sum() {
        let p = profile("carol", 3, 1);
        assert_eq!(score(&p.contributions, &ScoreWeights::default()), 3 * 2 + 5);
    }

    #[test]
    fn custom_weights_are_applied() {
        let weights = ScoreWeights {
            commits: 10,
            ..ScoreWeights::default()
        };
        let p = profile("carol", 3, 1);
        assert_eq!(score(&p.contributions, &weights), 35);
    }

    #[test]
    fn empty_profile_scores_zero() {
        let p = ContributorProfile::new("nobody");
        assert_eq!(score(&p.contributions, &ScoreWeights::default()), 0);
    }

    #[test]
    fn rank_sorts_by_score_then_username() {
        let ranked = rank(
            vec![
                profile("zed", 1, 0),
                profile("bob", 0, 1),
                profile("amy", 1, 0),
                profile("dan", 5, 0),
            ],
            &ScoreWeights::default(),
        );

        let names: Vec<_> = ranked.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, vec!["dan", "bob", "amy", "zed"]);
        assert_eq!(ranked[0].score, 10);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
