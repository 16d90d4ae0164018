//! GitHub issue search client

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, ACCEPT, LINK};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::adapters::http::{build_client, handle_response, rate_limit_reset};
use crate::domain::entities::{IssueRecord, IssueState, SortKey};
use crate::domain::ports::{IssueSearchClient, SearchPage};
use crate::error::TrackerError;

/// Results requested per page (the API maximum)
pub const PER_PAGE: u32 = 100;

pub struct GitHubSearchClient {
    http: Client,
    api_url: String,
    token: String,
}

impl GitHubSearchClient {
    pub fn new(api_url: String, token: String, timeout: Duration) -> Result<Self, TrackerError> {
        Ok(Self {
            http: build_client(timeout)?,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    html_url: String,
    title: String,
    user: Option<Login>,
    state: String,
    #[serde(default)]
    assignees: Vec<Login>,
    pull_request: Option<PullRequestRef>,
}

#[derive(Deserialize)]
struct Login {
    login: String,
}

#[derive(Deserialize)]
struct PullRequestRef {
    merged_at: Option<String>,
}

impl From<SearchItem> for IssueRecord {
    fn from(item: SearchItem) -> Self {
        let merged = item
            .pull_request
            .as_ref()
            .map_or(false, |pr| pr.merged_at.is_some());
        let state = if merged {
            IssueState::Merged
        } else if item.state == "closed" {
            IssueState::Closed
        } else {
            IssueState::Open
        };

        IssueRecord {
            url: item.html_url,
            title: item.title,
            author: item.user.map(|u| u.login).unwrap_or_default(),
            state,
            assignees: item.assignees.into_iter().map(|a| a.login).collect(),
            is_pull_request: item.pull_request.is_some(),
        }
    }
}

/// GitHub answers an exhausted quota with 429, or with 403 plus rate headers
fn is_rate_limited(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    status == StatusCode::FORBIDDEN
        && (headers.contains_key("retry-after")
            || headers
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map_or(false, |v| v.trim() == "0"))
}

/// Page number of the `rel="next"` entry of a `Link` header
fn next_page(headers: &HeaderMap) -> Option<u32> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.split(';').any(|p| p.trim() == r#"rel="next""#) {
            return None;
        }
        let target = target.trim().trim_start_matches('<').trim_end_matches('>');
        let url = reqwest::Url::parse(target).ok()?;
        let page = url
            .query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse().ok());
        page
    })
}

#[async_trait]
impl IssueSearchClient for GitHubSearchClient {
    async fn search(
        &self,
        query: &str,
        sort: SortKey,
        page: u32,
    ) -> Result<SearchPage, TrackerError> {
        tracing::debug!(query, page, "GitHub search request");

        let page_param = page.to_string();
        let per_page = PER_PAGE.to_string();
        let response = self
            .http
            .get(format!("{}/search/issues", self.api_url))
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .query(&[
                ("q", query),
                ("sort", sort.as_str()),
                ("order", "asc"),
                ("page", page_param.as_str()),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let headers = response.headers().clone();
        if is_rate_limited(response.status(), &headers) {
            return Err(TrackerError::RateLimited {
                reset: rate_limit_reset(&headers, Utc::now()),
            });
        }

        let body: SearchResponse = handle_response(response).await?;
        Ok(SearchPage {
            items: body.items.into_iter().map(IssueRecord::from).collect(),
            next_page: next_page(&headers),
        })
    }
}
