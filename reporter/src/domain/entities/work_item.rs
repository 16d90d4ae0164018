//! Work item domain entity
//!
//! A Jira issue as seen by the rotation and report workflows.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

/// An issue in the agile tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    /// Numeric id as a string; the move endpoint accepts ids or keys
    pub id: String,
    pub key: String,
    pub summary: String,
    /// Workflow status name, e.g. "In Progress" or "Job Closed"
    pub status: String,
    pub assignee: Option<String>,
    /// Key of the epic this issue belongs to
    pub epic_link: Option<String>,
    /// Set on epics only
    pub epic_name: Option<String>,
    pub created: Option<DateTime<FixedOffset>>,
}

impl WorkItem {
    pub fn has_status(&self, status: &str) -> bool {
        self.status.eq_ignore_ascii_case(status)
    }
}
