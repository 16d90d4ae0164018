//! Clock port trait
//!
//! Time is a dependency: the search backoff reads the current time and
//! sleeps through it, so tests substitute a virtual clock.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    async fn sleep(&self, duration: Duration);
}
