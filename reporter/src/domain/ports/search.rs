//! Issue search client port trait
//!
//! Defines the interface for the remote issue search endpoint (GitHub).

use async_trait::async_trait;

use crate::domain::entities::{IssueRecord, SortKey};
use crate::error::TrackerError;

/// First page number of a search
pub const FIRST_PAGE: u32 = 1;

/// One page of search results
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub items: Vec<IssueRecord>,
    /// `None` when this is the last page
    pub next_page: Option<u32>,
}

/// Port trait for issue search operations
#[async_trait]
pub trait IssueSearchClient: Send + Sync {
    /// Fetch a single page of results for `query`, sorted by `sort`.
    ///
    /// A rate-limited request fails with `TrackerError::RateLimited`.
    async fn search(
        &self,
        query: &str,
        sort: SortKey,
        page: u32,
    ) -> Result<SearchPage, TrackerError>;
}
