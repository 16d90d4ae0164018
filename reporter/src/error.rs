//! Unified error types for work-reporter
//!
//! This module defines error types for each layer:
//! - `DomainError`: Core business rule violations
//! - `TrackerError`: GitHub / Jira API client errors
//! - `NotifyError`: Chat notification errors
//! - `ConfigError`: Environment configuration errors
//! - `AppError`: Application layer errors (what services return to the command layer)

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// The caller built an impossible request (programming or configuration defect)
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote tracker is in a shape the workflow cannot operate on
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// Tracker API client errors (GitHub search, Jira agile)
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The remote rate limit was exceeded; `reset` is when the bucket refills, if known
    #[error("Rate limited (reset at {reset:?})")]
    RateLimited { reset: Option<DateTime<Utc>> },

    #[error("Unauthorized - check tracker credentials")]
    Unauthorized,

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Chat notification errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Message rejected: {0}")]
    Rejected(String),
}

/// Configuration errors, raised once at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Application layer errors - returned by services
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// A single search page stayed rate limited for every allowed attempt
    #[error("Rate limit still exceeded after {attempts} attempts")]
    RateLimitExhausted {
        attempts: u32,
        #[source]
        source: TrackerError,
    },

    /// A batch move failed after `moved` issues had already been reassigned
    #[error("Moved {moved} of {total} issues before a batch failed")]
    PartialMove {
        moved: usize,
        total: usize,
        #[source]
        source: TrackerError,
    },
}
