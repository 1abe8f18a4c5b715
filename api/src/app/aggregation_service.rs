//! Aggregation service
//!
//! Drives one aggregation run: validates the window, lists the
//! organization's repositories, collects them in sequential batches of
//! concurrent work, merges everything into one accumulator and ranks it.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use futures::future::join_all;

use crate::config::Config;
use crate::domain::entities::{AggregationWindow, Report};
use crate::domain::ports::SourceApi;
use crate::error::AggregationError;

use super::accumulator::Accumulator;
use super::branch_estimator::BranchEstimatorSettings;
use super::collector::{CollectorSettings, RepositoryCollector};
use super::rate_limit::RateLimitBudget;
use super::ScoreWeights;

#[derive(Debug, Clone, Copy)]
pub struct AggregationSettings {
    /// Repositories collected concurrently within one batch
    pub repo_width: usize,
    pub collector: CollectorSettings,
    pub weights: ScoreWeights,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            repo_width: 30,
            collector: CollectorSettings::default(),
            weights: ScoreWeights::default(),
        }
    }
}

impl AggregationSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            repo_width: config.max_concurrent_repos,
            collector: CollectorSettings {
                request_width: config.max_concurrent_requests,
                count_comment_reviews: config.count_comment_reviews,
                branches: BranchEstimatorSettings {
                    sample_limit: config.branch_sample_limit,
                    batch_size: config.branch_batch_size,
                    batch_delay: config.branch_batch_delay,
                },
            },
            weights: config.weights,
        }
    }
}

pub struct AggregationService<S: SourceApi + ?Sized> {
    source: Arc<S>,
    collector: RepositoryCollector<S>,
    budget: Arc<RateLimitBudget>,
    settings: AggregationSettings,
}

impl<S: SourceApi + ?Sized> AggregationService<S> {
    pub fn new(source: Arc<S>, budget: Arc<RateLimitBudget>, settings: AggregationSettings) -> Self {
        Self {
            collector: RepositoryCollector::new(Arc::clone(&source), settings.collector),
            source,
            budget,
            settings,
        }
    }

    pub fn organization(&self) -> &str {
        self.source.organization()
    }

    /// Validate `start`/`end` (`YYYY-MM-DD`) and run the aggregation
    pub async fn run(&self, start: &str, end: &str) -> Result<Report, AggregationError> {
        let window = AggregationWindow::parse(start, end)?;
        self.run_window(window).await
    }

    pub async fn run_window(&self, window: AggregationWindow) -> Result<Report, AggregationError> {
        let started = Instant::now();
        let org = self.source.organization().to_string();
        tracing::info!(org = %org, start = %window.start(), end = %window.end(), "Starting aggregation");

        self.checkpoint().await?;
        let repos = self.source.list_repositories().await?;
        if repos.is_empty() {
            return Err(AggregationError::NoRepositories(org));
        }

        let names: Vec<String> = repos.into_iter().map(|r| r.name).collect();
        let width = self.settings.repo_width.max(1);
        let total_batches = names.len().div_ceil(width);
        tracing::info!(repos = names.len(), batches = total_batches, "Repositories listed");

        let accumulator = Mutex::new(Accumulator::new());
        for (index, batch) in names.chunks(width).enumerate() {
            self.checkpoint().await?;
            tracing::debug!(batch = index + 1, total = total_batches, size = batch.len(), "Processing batch");

            join_all(
                batch
                    .iter()
                    .map(|repo| self.process_repository(repo, &window, &accumulator)),
            )
            .await;
        }

        let accumulator = accumulator.into_inner().unwrap_or_else(PoisonError::into_inner);
        let report = accumulator.into_report(window, &self.settings.weights);

        tracing::info!(
            developers = report.developers.len(),
            elapsed_ms = elapsed_ms(started.elapsed()),
            "Aggregation complete"
        );
        Ok(report)
    }

    /// Collect and merge one repository; failures leave the accumulator untouched
    async fn process_repository(
        &self,
        repo: &str,
        window: &AggregationWindow,
        accumulator: &Mutex<Accumulator>,
    ) {
        match self.collector.collect(repo, window).await {
            Ok(collected) => {
                let found = collected.record_count();
                let merged = accumulator
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .merge(repo, collected);
                tracing::debug!(repo = %repo, found, merged, "Repository collected");
            }
            Err(e) => {
                tracing::error!(repo = %repo, "Failed to collect repository: {}", e);
            }
        }
    }

    /// Refresh the quota if due and wait for capacity before issuing a batch
    async fn checkpoint(&self) -> Result<(), AggregationError> {
        self.budget.refresh(self.source.as_ref()).await;
        self.budget.await_capacity().await?;
        Ok(())
    }
}

fn elapsed_ms(elapsed: Duration) -> u64 {
    elapsed.as_millis().try_into().unwrap_or(u64::MAX)
}
