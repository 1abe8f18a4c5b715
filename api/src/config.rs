use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::app::ScoreWeights;
use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub access token; requests are unauthenticated when empty
    pub github_token: Option<String>,
    pub github_org: String,
    pub github_api_url: String,
    pub port: u16,
    /// Repositories processed concurrently within one batch
    pub max_concurrent_repos: usize,
    /// Per-repository sub-fetches (reviews, comments, issue events) in flight at once
    pub max_concurrent_requests: usize,
    pub branch_sample_limit: usize,
    pub branch_batch_size: usize,
    pub branch_batch_delay: Duration,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub rate_limit_check_interval: Duration,
    pub rate_limit_max_wait: Duration,
    /// Whether plain COMMENTED reviews count as reviews
    pub count_comment_reviews: bool,
    pub weights: ScoreWeights,
    pub discord: DiscordConfig,
}

/// Identity used when posting the ranking to a chat webhook
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub webhook_url: Option<String>,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            github_org: String::new(),
            github_api_url: "https://api.github.com".to_string(),
            port: 3000,
            max_concurrent_repos: 30,
            max_concurrent_requests: 10,
            branch_sample_limit: 30,
            branch_batch_size: 10,
            branch_batch_delay: Duration::from_millis(250),
            cache_enabled: true,
            cache_ttl: Duration::from_secs(3600),
            rate_limit_check_interval: Duration::from_secs(60),
            rate_limit_max_wait: Duration::from_secs(300),
            count_comment_reviews: true,
            weights: ScoreWeights::default(),
            discord: DiscordConfig {
                webhook_url: None,
                username: "PRFormance".to_string(),
                avatar_url: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let weights = ScoreWeights {
            commits: parse_or("WEIGHT_COMMITS", defaults.weights.commits)?,
            pull_requests_opened: parse_or(
                "WEIGHT_PULL_REQUESTS_OPENED",
                defaults.weights.pull_requests_opened,
            )?,
            pull_requests_reviewed: parse_or(
                "WEIGHT_PULL_REQUESTS_REVIEWED",
                defaults.weights.pull_requests_reviewed,
            )?,
            issues_opened: parse_or("WEIGHT_ISSUES_OPENED", defaults.weights.issues_opened)?,
            issues_closed: parse_or("WEIGHT_ISSUES_CLOSED", defaults.weights.issues_closed)?,
            pr_comments: parse_or("WEIGHT_PR_COMMENTS", defaults.weights.pr_comments)?,
            branches_created: parse_or(
                "WEIGHT_BRANCHES_CREATED",
                defaults.weights.branches_created,
            )?,
        };

        let github_org = env::var("GITHUB_ORG")
            .ok()
            .filter(|org| !org.trim().is_empty())
            .ok_or(ConfigError::Missing("GITHUB_ORG"))?;

        Ok(Self {
            github_token: env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            github_org,
            github_api_url: env::var("GITHUB_API_URL").unwrap_or(defaults.github_api_url),
            port: parse_or("PORT", defaults.port)?,
            max_concurrent_repos: parse_or("MAX_CONCURRENT_REPOS", defaults.max_concurrent_repos)?,
            max_concurrent_requests: parse_or(
                "MAX_CONCURRENT_REQUESTS",
                defaults.max_concurrent_requests,
            )?,
            branch_sample_limit: parse_or("BRANCH_SAMPLE_LIMIT", defaults.branch_sample_limit)?,
            branch_batch_size: parse_or("BRANCH_BATCH_SIZE", defaults.branch_batch_size)?,
            branch_batch_delay: Duration::from_millis(parse_or(
                "BRANCH_BATCH_DELAY_MS",
                defaults.branch_batch_delay.as_millis() as u64,
            )?),
            cache_enabled: parse_or("CACHE_ENABLED", defaults.cache_enabled)?,
            cache_ttl: Duration::from_secs(parse_or(
                "CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )?),
            rate_limit_check_interval: Duration::from_secs(parse_or(
                "RATE_LIMIT_CHECK_INTERVAL_SECS",
                defaults.rate_limit_check_interval.as_secs(),
            )?),
            rate_limit_max_wait: Duration::from_secs(parse_or(
                "RATE_LIMIT_MAX_WAIT_SECS",
                defaults.rate_limit_max_wait.as_secs(),
            )?),
            count_comment_reviews: parse_or(
                "COUNT_COMMENT_REVIEWS",
                defaults.count_comment_reviews,
            )?,
            weights,
            discord: DiscordConfig {
                webhook_url: env::var("DISCORD_WEBHOOK_URL")
                    .ok()
                    .filter(|u| !u.is_empty()),
                username: env::var("DISCORD_USERNAME").unwrap_or(defaults.discord.username),
                avatar_url: env::var("DISCORD_AVATAR_URL")
                    .ok()
                    .filter(|u| !u.is_empty()),
            },
        })
    }
}

/// Read `name` from the environment, falling back to `default` when unset
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw,
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.max_concurrent_repos, 30);
        assert_eq!(config.max_concurrent_requests, 10);
        assert_eq!(config.branch_sample_limit, 30);
        assert_eq!(config.port, 3000);
        assert!(config.cache_enabled);
        assert!(config.count_comment_reviews);
    }

    #[test]
    fn parse_or_falls_back_when_unset() {
        let value: usize = parse_or("PRFORMANCE_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
