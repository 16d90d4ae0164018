//! Sprint rotation service
//!
//! Closes the project's active sprint and carries its unfinished issues into
//! the following one-week sprint:
//!
//! 1. locate the project's scrum board and its active sprint
//! 2. find or create the successor sprint (named from its dates)
//! 3. activate the successor
//! 4. move every issue not in the terminal status, in batches
//! 5. close the old sprint
//!
//! Nothing is rolled back when a step fails. A rerun picks up where the
//! failed run stopped: the successor is found by name instead of created
//! again, and a board with both sprints active is recognised as an
//! interrupted rotation.

use std::sync::Arc;

use serde::Serialize;

use crate::app::batch_mover::BatchIssueMover;
use crate::domain::entities::{Board, BoardId, BoardType, Sprint, SprintState, WorkItem};
use crate::domain::ports::AgileClient;
use crate::error::{AppError, DomainError};

/// What a rotation did, for the notification that follows it
#[derive(Debug, Clone, Serialize)]
pub struct RotationOutcome {
    pub closed: Sprint,
    pub activated: Sprint,
    /// The successor sprint did not exist before this run
    pub created: bool,
    /// The board already had the successor active (an interrupted run)
    pub resumed: bool,
    pub moved: usize,
}

/// The active sprint, and its already-active successor when a previous run
/// stopped between activation and close
struct ActiveSprint {
    current: Sprint,
    successor: Option<Sprint>,
}

pub struct SprintRotator<A: AgileClient> {
    agile: Arc<A>,
    mover: BatchIssueMover<A>,
    closed_status: String,
}

impl<A: AgileClient> SprintRotator<A> {
    pub fn new(agile: Arc<A>, closed_status: impl Into<String>) -> Self {
        Self {
            mover: BatchIssueMover::new(agile.clone()),
            agile,
            closed_status: closed_status.into(),
        }
    }

    pub async fn rotate(&self, project_key: &str) -> Result<RotationOutcome, AppError> {
        let board = self.locate_board(project_key).await?;
        let active = self.locate_active_sprint(&board).await?;
        let current = active.current;

        let (next, created, resumed) = match active.successor {
            Some(successor) => (successor, false, true),
            None => {
                let (next, created) = self.compute_next_sprint(board.id, &current).await?;
                (next, created, false)
            }
        };

        let pending = self.pending_issues(&current).await?;
        tracing::info!(
            sprint = %current.name,
            pending = pending.len(),
            "Collected unfinished issues"
        );

        let activated = if next.state == SprintState::Active {
            next
        } else {
            let activated = self
                .agile
                .update_sprint_state(next.id, SprintState::Active)
                .await?;
            tracing::info!(sprint_id = %activated.id, sprint = %activated.name, "Activated next sprint");
            activated
        };

        let ids: Vec<String> = pending.into_iter().map(|issue| issue.id).collect();
        let moved = self.mover.move_issues(activated.id, &ids).await?;

        let closed = self
            .agile
            .update_sprint_state(current.id, SprintState::Closed)
            .await?;
        tracing::info!(sprint_id = %closed.id, sprint = %closed.name, "Closed sprint");

        Ok(RotationOutcome {
            closed,
            activated,
            created,
            resumed,
            moved,
        })
    }

    /// Find the sprint following `active`, creating it if it does not exist
    ///
    /// The successor starts when `active` ends and lasts one week. An existing
    /// future sprint carrying the successor's name is reused, so calling this
    /// twice creates at most one sprint.
    pub async fn compute_next_sprint(
        &self,
        board_id: BoardId,
        active: &Sprint,
    ) -> Result<(Sprint, bool), AppError> {
        let (start, end) = active.successor_window().ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "active sprint '{}' has no end date",
                active.name
            ))
        })?;
        let name = Sprint::name_for(&start, &end);

        let future = self
            .agile
            .list_sprints(board_id, Some(SprintState::Future))
            .await?;
        if let Some(existing) = future.into_iter().find(|sprint| sprint.name == name) {
            tracing::info!(sprint_id = %existing.id, sprint = %name, "Reusing existing next sprint");
            return Ok((existing, false));
        }

        let created = self.agile.create_sprint(board_id, &name, start, end).await?;
        tracing::info!(sprint_id = %created.id, sprint = %name, "Created next sprint");
        Ok((created, true))
    }

    async fn locate_board(&self, project_key: &str) -> Result<Board, AppError> {
        let boards = self.agile.list_boards(project_key, BoardType::Scrum).await?;
        let board = boards.into_iter().next().ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "project {} has no scrum board",
                project_key
            ))
        })?;
        tracing::debug!(board_id = %board.id, board = %board.name, "Located board");
        Ok(board)
    }

    async fn locate_active_sprint(&self, board: &Board) -> Result<ActiveSprint, AppError> {
        let mut active = self
            .agile
            .list_sprints(board.id, Some(SprintState::Active))
            .await?;
        active.sort_by_key(|sprint| sprint.start);

        match active.as_slice() {
            [] => Err(DomainError::InvariantViolation(format!(
                "board {} has no active sprint",
                board.id
            ))
            .into()),
            [current] => Ok(ActiveSprint {
                current: current.clone(),
                successor: None,
            }),
            [current, successor]
                if current.successor_name().as_deref() == Some(successor.name.as_str()) =>
            {
                tracing::warn!(
                    sprint = %current.name,
                    next = %successor.name,
                    "Both sprints active, resuming interrupted rotation"
                );
                Ok(ActiveSprint {
                    current: current.clone(),
                    successor: Some(successor.clone()),
                })
            }
            sprints => {
                let names: Vec<&str> = sprints.iter().map(|s| s.name.as_str()).collect();
                Err(DomainError::InvariantViolation(format!(
                    "board {} has {} active sprints: {}",
                    board.id,
                    sprints.len(),
                    names.join(", ")
                ))
                .into())
            }
        }
    }

    async fn pending_issues(&self, sprint: &Sprint) -> Result<Vec<WorkItem>, AppError> {
        let issues = self.agile.list_issues_in_sprint(sprint.id).await?;
        Ok(issues
            .into_iter()
            .filter(|issue| !issue.has_status(&self.closed_status))
            .collect())
    }
}
