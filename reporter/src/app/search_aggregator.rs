//! Search aggregator
//!
//! Runs one issue search to completion: walks every result page, waits out
//! rate limits, and returns a single URL-ordered result set.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::entities::{IssueRecord, SearchQuery, SortKey};
use crate::domain::ports::{Clock, IssueSearchClient, SearchPage, FIRST_PAGE};
use crate::error::{AppError, DomainError, TrackerError};

/// Retry policy for rate-limited search requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Requests allowed for one page, the first one included
    pub max_attempts: u32,
    /// Shortest wait between two attempts
    pub base_delay: Duration,
    /// Wait used when the reset time is unknown or already passed
    pub fallback_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_delay: Duration::from_secs(1),
            fallback_delay: Duration::from_secs(60),
        }
    }
}

impl BackoffPolicy {
    /// How long to wait after a rate-limit response carrying `reset`
    pub fn wait_for(&self, reset: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
        match reset.and_then(|reset| (reset - now).to_std().ok()) {
            Some(until_reset) => until_reset.max(self.base_delay),
            None => self.fallback_delay,
        }
    }
}

pub struct SearchAggregator<S: IssueSearchClient, C: Clock> {
    client: Arc<S>,
    clock: Arc<C>,
    policy: BackoffPolicy,
}

impl<S: IssueSearchClient, C: Clock> SearchAggregator<S, C> {
    pub fn new(client: Arc<S>, clock: Arc<C>, policy: BackoffPolicy) -> Self {
        Self {
            client,
            clock,
            policy,
        }
    }

    /// Fetch every page of `query` and return the hits sorted by URL
    ///
    /// Records that shifted between pages while paging are returned once.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<IssueRecord>, AppError> {
        let text = query.text();
        tracing::debug!(query = %text, sort = %query.sort(), "Starting issue search");

        let mut records = Vec::new();
        let mut page = FIRST_PAGE;
        loop {
            let result = self.fetch_page(&text, query.sort(), page).await?;
            tracing::debug!(page, items = result.items.len(), "Fetched search page");
            records.extend(result.items);

            match result.next_page {
                Some(next) if next > page => page = next,
                Some(next) => {
                    return Err(DomainError::InvariantViolation(format!(
                        "search paging went from page {} back to page {}",
                        page, next
                    ))
                    .into())
                }
                None => break,
            }
        }

        records.sort_by(|a, b| a.url.cmp(&b.url));
        records.dedup_by(|a, b| a.url == b.url);

        tracing::info!(query = %text, results = records.len(), "Issue search complete");
        Ok(records)
    }

    async fn fetch_page(
        &self,
        text: &str,
        sort: SortKey,
        page: u32,
    ) -> Result<SearchPage, AppError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.client.search(text, sort, page).await {
                Ok(result) => return Ok(result),
                Err(TrackerError::RateLimited { reset }) => {
                    if attempts >= self.policy.max_attempts {
                        tracing::error!(page, attempts, "Search rate limit not lifted, giving up");
                        return Err(AppError::RateLimitExhausted {
                            attempts,
                            source: TrackerError::RateLimited { reset },
                        });
                    }
                    let wait = self.policy.wait_for(reset, self.clock.now());
                    tracing::warn!(
                        page,
                        attempt = attempts,
                        wait_secs = wait.as_secs(),
                        "Search rate limited, waiting for reset"
                    );
                    self.clock.sleep(wait).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
