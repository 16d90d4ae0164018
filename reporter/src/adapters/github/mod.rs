//! GitHub adapter
//!
//! Implementation of the issue search port against the GitHub REST API.

pub mod client;

pub use client::GitHubSearchClient;
