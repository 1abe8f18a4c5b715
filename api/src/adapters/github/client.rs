//! GitHub REST API client implementation

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::app::RateLimitBudget;
use crate::domain::ports::{
    RateLimitStatus, SourceApi, SourceBranch, SourceComment, SourceCommit, SourceIssue,
    SourceIssueEvent, SourcePullRequest, SourceRepo, SourceReview,
};
use crate::error::SourceError;

/// Page size used for every listing (the API maximum)
const PER_PAGE: usize = 100;

/// Times a rate-limited request is retried after waiting for the reset
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Fallback wait when a rate-limited response carries no reset header
const DEFAULT_RETRY_AFTER_SECS: i64 = 60;

/// Implementation of [`SourceApi`] against the GitHub REST API
pub struct GitHubClient {
    http: Client,
    base_url: String,
    org: String,
    budget: Arc<RateLimitBudget>,
}

impl GitHubClient {
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        org: impl Into<String>,
        budget: Arc<RateLimitBudget>,
    ) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));

        if let Some(token) = token {
            let mut auth =
                HeaderValue::from_str(&format!("token {}", token)).map_err(|_| SourceError::Unauthorized)?;
            auth.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth);
        }

        let http = Client::builder()
            .user_agent(concat!("prformance/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            org: org.into(),
            budget,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn repo_path(&self, repo: &str, rest: &str) -> String {
        format!("/repos/{}/{}{}", self.org, repo, rest)
    }

    /// GET a JSON document, waiting out and retrying rate-limit rejections
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, SourceError> {
        let url = self.api_url(path);
        let mut retries = 0;

        loop {
            self.budget.await_capacity().await?;

            tracing::debug!(url = %url, "GitHub request");
            let response = self.http.get(&url).query(query).send().await?;
            if let Some(status) = extract_rate_limit(response.headers()) {
                self.budget.observe(status);
            }

            match handle_response(response).await {
                Err(SourceError::RateLimited { reset_at }) if retries < MAX_RATE_LIMIT_RETRIES => {
                    retries += 1;
                    tracing::warn!(url = %url, reset_at = %reset_at, retries, "Rate limited by GitHub");
                    self.budget.mark_exhausted(reset_at);
                }
                other => return other,
            }
        }
    }

    /// Follow `page` until a short page signals the end of the listing
    async fn paginate<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, SourceError> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let mut params = query.to_vec();
            params.push(("per_page", PER_PAGE.to_string()));
            params.push(("page", page.to_string()));

            let batch: Vec<T> = self.get_json(path, &params).await?;
            let len = batch.len();
            items.extend(batch);

            if len < PER_PAGE {
                return Ok(items);
            }
            page += 1;
        }
    }
}

/// Classify a response, deserializing the body on success
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SourceError> {
    let status = response.status();

    if status.is_success() {
        return response
            .json()
            .await
            .map_err(|e| SourceError::Deserialization(e.to_string()));
    }

    let rate_limit = extract_rate_limit(response.headers());
    match status.as_u16() {
        401 => Err(SourceError::Unauthorized),
        403 | 429 if status.as_u16() == 429 || rate_limit.is_some_and(|r| r.remaining == 0) => {
            let reset_at = rate_limit
                .map(|r| r.reset_at)
                .unwrap_or_else(|| Utc::now() + chrono::Duration::seconds(DEFAULT_RETRY_AFTER_SECS));
            Err(SourceError::RateLimited { reset_at })
        }
        404 => Err(SourceError::NotFound(response.url().path().to_string())),
        code => {
            let message = response.text().await.unwrap_or_default();
            Err(SourceError::Api {
                status: code,
                message,
            })
        }
    }
}

/// Read `x-ratelimit-remaining` / `x-ratelimit-reset` from response headers
fn extract_rate_limit(headers: &HeaderMap) -> Option<RateLimitStatus> {
    let remaining = headers
        .get("x-ratelimit-remaining")?
        .to_str()
        .ok()?
        .parse::<u32>()
        .ok()?;
    let reset = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;
    let reset_at = DateTime::from_timestamp(reset, 0)?;

    Some(RateLimitStatus {
        remaining,
        reset_at,
    })
}

#[derive(Deserialize)]
struct RateLimitResponse {
    resources: RateLimitResources,
}

#[derive(Deserialize)]
struct RateLimitResources {
    core: RateLimitResource,
}

#[derive(Deserialize)]
struct RateLimitResource {
    remaining: u32,
    reset: i64,
}

#[async_trait]
impl SourceApi for GitHubClient {
    fn organization(&self) -> &str {
        &self.org
    }

    async fn list_repositories(&self) -> Result<Vec<SourceRepo>, SourceError> {
        let path = format!("/orgs/{}/repos", self.org);
        self.paginate(&path, &[("type", "all".to_string())]).await
    }

    async fn list_commits(
        &self,
        repo: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<SourceCommit>, SourceError> {
        let query = [("since", since.to_rfc3339()), ("until", until.to_rfc3339())];
        match self.paginate(&self.repo_path(repo, "/commits"), &query).await {
            // An empty repository answers 409 Conflict
            Err(SourceError::Api { status: 409, .. }) => Ok(Vec::new()),
            other => other,
        }
    }

    async fn list_pull_requests(&self, repo: &str) -> Result<Vec<SourcePullRequest>, SourceError> {
        self.paginate(&self.repo_path(repo, "/pulls"), &[("state", "all".to_string())])
            .await
    }

    async fn list_issues(
        &self,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<SourceIssue>, SourceError> {
        let query = [("state", "all".to_string()), ("since", since.to_rfc3339())];
        self.paginate(&self.repo_path(repo, "/issues"), &query).await
    }

    async fn list_issue_events(
        &self,
        repo: &str,
        issue_number: u64,
    ) -> Result<Vec<SourceIssueEvent>, SourceError> {
        let path = self.repo_path(repo, &format!("/issues/{}/events", issue_number));
        self.paginate(&path, &[]).await
    }

    async fn list_branches(&self, repo: &str) -> Result<Vec<SourceBranch>, SourceError> {
        self.paginate(&self.repo_path(repo, "/branches"), &[]).await
    }

    async fn sample_branch_commit(
        &self,
        repo: &str,
        branch: &str,
    ) -> Result<Option<SourceCommit>, SourceError> {
        let query = [("sha", branch.to_string()), ("per_page", "1".to_string())];
        let commits: Vec<SourceCommit> = self
            .get_json(&self.repo_path(repo, "/commits"), &query)
            .await?;
        Ok(commits.into_iter().next())
    }

    async fn list_reviews(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceReview>, SourceError> {
        let path = self.repo_path(repo, &format!("/pulls/{}/reviews", pr_number));
        self.paginate(&path, &[]).await
    }

    async fn list_issue_comments(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceComment>, SourceError> {
        let path = self.repo_path(repo, &format!("/issues/{}/comments", pr_number));
        self.paginate(&path, &[]).await
    }

    async fn list_review_comments(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<SourceComment>, SourceError> {
        let path = self.repo_path(repo, &format!("/pulls/{}/comments", pr_number));
        self.paginate(&path, &[]).await
    }

    /// Bypasses the budget wait so the quota can be checked while exhausted
    async fn rate_limit(&self) -> Result<RateLimitStatus, SourceError> {
        let response = self.http.get(self.api_url("/rate_limit")).send().await?;
        let body: RateLimitResponse = handle_response(response).await?;
        let reset_at = DateTime::from_timestamp(body.resources.core.reset, 0)
            .ok_or_else(|| SourceError::Deserialization("invalid rate limit reset".to_string()))?;

        Ok(RateLimitStatus {
            remaining: body.resources.core.remaining,
            reset_at,
        })
    }
}
