//! Jira adapter
//!
//! Implementation of the agile port (boards, sprints, issues) against Jira.

pub mod client;

pub use client::JiraAgileClient;
