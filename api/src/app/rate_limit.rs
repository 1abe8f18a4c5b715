//! Rate-limit budget
//!
//! Shared view of the remaining request quota. Every caller that is about
//! to issue requests goes through [`RateLimitBudget::await_capacity`], which
//! sleeps until the quota resets when it is exhausted, or fails when the
//! reset is further away than the tolerated maximum.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::domain::ports::{RateLimitStatus, SourceApi};
use crate::error::SourceError;

/// Grace period added on top of the advertised reset time
const RESET_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct BudgetState {
    remaining: Option<u32>,
    reset_at: Option<DateTime<Utc>>,
    last_refresh: Option<Instant>,
}

#[derive(Debug)]
pub struct RateLimitBudget {
    state: Mutex<BudgetState>,
    check_interval: Duration,
    max_wait: Duration,
}

impl RateLimitBudget {
    pub fn new(check_interval: Duration, max_wait: Duration) -> Self {
        Self {
            state: Mutex::new(BudgetState::default()),
            check_interval,
            max_wait,
        }
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }

    pub fn remaining(&self) -> Option<u32> {
        self.lock().remaining
    }

    /// Record quota information seen on a response
    pub fn observe(&self, status: RateLimitStatus) {
        let mut state = self.lock();
        state.remaining = Some(status.remaining);
        state.reset_at = Some(status.reset_at);
    }

    /// Record that the platform rejected a request for quota reasons
    pub fn mark_exhausted(&self, reset_at: DateTime<Utc>) {
        self.observe(RateLimitStatus {
            remaining: 0,
            reset_at,
        });
    }

    /// Time left until capacity is available again, if the quota is exhausted
    pub fn wait_time(&self, now: DateTime<Utc>) -> Option<Duration> {
        let state = self.lock();
        match (state.remaining, state.reset_at) {
            (Some(0), Some(reset_at)) if reset_at > now => {
                (reset_at - now).to_std().ok().map(|d| d + RESET_GRACE)
            }
            _ => None,
        }
    }

    /// Sleep until the quota resets, or fail if that is too far away
    pub async fn await_capacity(&self) -> Result<(), SourceError> {
        let Some(wait) = self.wait_time(Utc::now()) else {
            return Ok(());
        };

        if wait > self.max_wait {
            return Err(SourceError::RateLimitExceeded {
                wait_secs: wait.as_secs(),
                max_wait_secs: self.max_wait.as_secs(),
            });
        }

        tracing::warn!(wait_secs = wait.as_secs(), "Rate limit exhausted, waiting for reset");
        tokio::time::sleep(wait).await;

        // Quota is unknown again until the next response or refresh
        let mut state = self.lock();
        state.remaining = None;
        state.reset_at = None;
        Ok(())
    }

    pub fn needs_refresh(&self) -> bool {
        match self.lock().last_refresh {
            Some(at) => at.elapsed() >= self.check_interval,
            None => true,
        }
    }

    /// Query the source for its current quota, at most once per check interval
    pub async fn refresh<S: SourceApi + ?Sized>(&self, source: &S) {
        if !self.needs_refresh() {
            return;
        }

        match source.rate_limit().await {
            Ok(status) => {
                tracing::debug!(
                    remaining = status.remaining,
                    reset_at = %status.reset_at,
                    "Rate limit refreshed"
                );
                self.observe(status);
            }
            Err(e) => tracing::warn!("Failed to check rate limit: {}", e),
        }

        self.lock().last_refresh = Some(Instant::now());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BudgetState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
