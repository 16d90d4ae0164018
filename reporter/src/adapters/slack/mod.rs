//! Slack adapter
//!
//! Notifications go to a Slack channel, or nowhere when none is configured.

pub mod client;

pub use client::{NoopNotifier, SlackNotifier};
