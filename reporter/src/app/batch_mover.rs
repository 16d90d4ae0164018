//! Batch issue mover
//!
//! The agile API accepts a bounded number of issues per move request, so
//! larger moves are split into consecutive batches sent in order.

use std::sync::Arc;

use crate::domain::entities::SprintId;
use crate::domain::ports::{AgileClient, MAX_MOVE_BATCH};
use crate::error::AppError;

pub struct BatchIssueMover<A: AgileClient> {
    agile: Arc<A>,
}

impl<A: AgileClient> BatchIssueMover<A> {
    pub fn new(agile: Arc<A>) -> Self {
        Self { agile }
    }

    /// Move `issue_ids` into `sprint_id`, returning how many were moved
    ///
    /// A failing batch stops the move. Earlier batches stay where they were
    /// moved; the error reports how far the move got.
    pub async fn move_issues(
        &self,
        sprint_id: SprintId,
        issue_ids: &[String],
    ) -> Result<usize, AppError> {
        let total = issue_ids.len();
        let mut moved = 0;

        for (index, batch) in issue_ids.chunks(MAX_MOVE_BATCH).enumerate() {
            if let Err(source) = self.agile.move_issues_to_sprint(sprint_id, batch).await {
                tracing::error!(
                    sprint_id = %sprint_id,
                    batch = index + 1,
                    moved,
                    total,
                    error = %source,
                    "Issue batch move failed"
                );
                return Err(AppError::PartialMove {
                    moved,
                    total,
                    source,
                });
            }
            moved += batch.len();
            tracing::info!(
                sprint_id = %sprint_id,
                batch = index + 1,
                moved,
                total,
                "Moved issue batch"
            );
        }

        Ok(moved)
    }
}
