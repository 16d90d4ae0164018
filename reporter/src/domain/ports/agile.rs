//! Agile tracker port trait
//!
//! Defines the interface for the Jira boards / sprints API.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::domain::entities::{Board, BoardId, BoardType, Sprint, SprintId, SprintState, WorkItem};
use crate::error::TrackerError;

/// Maximum number of issues the move endpoint accepts per request
pub const MAX_MOVE_BATCH: usize = 50;

/// Port trait for agile tracker operations
#[async_trait]
pub trait AgileClient: Send + Sync {
    // Boards and sprints

    /// List the boards of a project
    async fn list_boards(
        &self,
        project_key: &str,
        board_type: BoardType,
    ) -> Result<Vec<Board>, TrackerError>;

    /// List the sprints of a board, optionally restricted to one state
    async fn list_sprints(
        &self,
        board_id: BoardId,
        state: Option<SprintState>,
    ) -> Result<Vec<Sprint>, TrackerError>;

    /// Create a future sprint on a board
    async fn create_sprint(
        &self,
        board_id: BoardId,
        name: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Sprint, TrackerError>;

    /// Move a sprint to another lifecycle state
    async fn update_sprint_state(
        &self,
        sprint_id: SprintId,
        state: SprintState,
    ) -> Result<Sprint, TrackerError>;

    // Issues

    /// Every issue of a sprint, across all result pages
    async fn list_issues_in_sprint(&self, sprint_id: SprintId)
        -> Result<Vec<WorkItem>, TrackerError>;

    /// Reassign issues to a sprint; at most `MAX_MOVE_BATCH` ids per call
    async fn move_issues_to_sprint(
        &self,
        sprint_id: SprintId,
        issue_ids: &[String],
    ) -> Result<(), TrackerError>;

    /// Every issue matching a JQL query, across all result pages
    async fn search_issues(&self, jql: &str) -> Result<Vec<WorkItem>, TrackerError>;

    /// Fetch one issue by key
    async fn get_issue(&self, key: &str) -> Result<WorkItem, TrackerError>;
}
