//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod clock;
pub mod github;
pub mod http;
pub mod jira;
pub mod slack;

pub use clock::SystemClock;
pub use github::GitHubSearchClient;
pub use jira::JiraAgileClient;
pub use slack::{NoopNotifier, SlackNotifier};
