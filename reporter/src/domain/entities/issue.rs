//! Issue record domain entity
//!
//! Issues and pull requests live in GitHub (source of truth). This entity is
//! the domain's read-only view of one search hit.

use serde::{Deserialize, Serialize};

/// A GitHub issue or pull request returned by the search API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// HTML URL, unique per record; the sort and dedup key
    pub url: String,
    pub title: String,
    pub author: String,
    pub state: IssueState,
    pub assignees: Vec<String>,
    pub is_pull_request: bool,
}

impl IssueRecord {
    /// Repository slug (`owner/name`) derived from the URL
    pub fn repository(&self) -> Option<String> {
        repository_from_url(&self.url)
    }

    pub fn is_authored_by_any(&self, logins: &[String]) -> bool {
        logins.iter().any(|l| l.eq_ignore_ascii_case(&self.author))
    }
}

/// Extract `owner/name` from `https://<host>/<owner>/<name>/...`
pub fn repository_from_url(url: &str) -> Option<String> {
    let re = regex::Regex::new(r"^https?://[^/]+/([^/]+/[^/]+)(?:/|$)").ok()?;
    re.captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Issue / pull request state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
    Merged,
}

impl std::fmt::Display for IssueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueState::Open => write!(f, "open"),
            IssueState::Closed => write!(f, "closed"),
            IssueState::Merged => write!(f, "merged"),
        }
    }
}

impl std::str::FromStr for IssueState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(IssueState::Open),
            "closed" => Ok(IssueState::Closed),
            "merged" => Ok(IssueState::Merged),
            _ => Err(format!("Unknown issue state: {}", s)),
        }
    }
}
