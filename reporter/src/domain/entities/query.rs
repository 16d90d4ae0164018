//! Search query entities
//!
//! `DateRange` renders the range predicates understood by the GitHub search
//! syntax; `SearchQuery` assembles the full query text from a repository
//! scope and a set of `key:value` filters.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::DomainError;

/// Timestamp layout used inside search predicates
pub const SEARCH_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A date range predicate for a search qualifier such as `created:`
///
/// GitHub treats `a..b` as inclusive on both ends and `<b` as exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Between {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Since(DateTime<Utc>),
    Before(DateTime<Utc>),
}

impl DateRange {
    /// Build a range from optional bounds. At least one bound is mandatory.
    pub fn new(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Self, DomainError> {
        match (start, end) {
            (Some(start), Some(end)) => Ok(DateRange::Between { start, end }),
            (Some(start), None) => Ok(DateRange::Since(start)),
            (None, Some(end)) => Ok(DateRange::Before(end)),
            (None, None) => Err(DomainError::Validation(
                "a date range needs a start or an end bound".to_string(),
            )),
        }
    }
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.format(SEARCH_TIMESTAMP_FORMAT).to_string()
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp '{}': {}", s, e))
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateRange::Between { start, end } => {
                write!(f, "{}..{}", format_ts(start), format_ts(end))
            }
            DateRange::Since(start) => write!(f, ">={}", format_ts(start)),
            DateRange::Before(end) => write!(f, "<{}", format_ts(end)),
        }
    }
}

impl std::str::FromStr for DateRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(start) = s.strip_prefix(">=") {
            return Ok(DateRange::Since(parse_ts(start)?));
        }
        if let Some(end) = s.strip_prefix('<') {
            return Ok(DateRange::Before(parse_ts(end)?));
        }
        match s.split_once("..") {
            Some((start, end)) => Ok(DateRange::Between {
                start: parse_ts(start)?,
                end: parse_ts(end)?,
            }),
            None => Err(format!("Unknown range predicate: {}", s)),
        }
    }
}

/// Sort key accepted by the search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Created,
    Updated,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Created => "created",
            SortKey::Updated => "updated",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable issue search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    repos: Vec<String>,
    sort: SortKey,
    filters: BTreeMap<String, String>,
}

impl SearchQuery {
    pub fn new(repos: &[String], sort: SortKey) -> Self {
        Self {
            repos: repos.to_vec(),
            sort,
            filters: BTreeMap::new(),
        }
    }

    /// Add (or replace) a `key:value` qualifier
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    /// Full query text: repository scope clause followed by every qualifier
    pub fn text(&self) -> String {
        self.repos
            .iter()
            .map(|repo| format!("repo:{}", repo))
            .chain(self.filters.iter().map(|(k, v)| format!("{}:{}", k, v)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Issues opened in the range
    pub fn created_issues(repos: &[String], range: &DateRange) -> Self {
        Self::new(repos, SortKey::Created)
            .filter("is", "issue")
            .filter("created", range.to_string())
    }

    /// Pull requests opened in the range
    pub fn created_pull_requests(repos: &[String], range: &DateRange) -> Self {
        Self::new(repos, SortKey::Created)
            .filter("is", "pr")
            .filter("created", range.to_string())
    }

    /// Pull requests merged in the range
    pub fn merged_pull_requests(repos: &[String], range: &DateRange) -> Self {
        Self::new(repos, SortKey::Updated)
            .filter("is", "pr")
            .filter("merged", range.to_string())
    }

    /// Pull requests `user` commented on without authoring, updated in the range
    pub fn reviewed_pull_requests(repos: &[String], user: &str, range: &DateRange) -> Self {
        Self::new(repos, SortKey::Updated)
            .filter("is", "pr")
            .filter("commenter", user)
            .filter("-author", user)
            .filter("updated", range.to_string())
    }
}
