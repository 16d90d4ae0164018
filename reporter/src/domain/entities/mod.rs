//! Domain entities
//!
//! Pure domain models representing core business concepts.
//! All of them are built fresh from tracker responses on every run.

pub mod issue;
pub mod query;
pub mod sprint;
pub mod work_item;

pub use issue::{IssueRecord, IssueState};
pub use query::{DateRange, SearchQuery, SortKey};
pub use sprint::{Board, BoardId, BoardType, Sprint, SprintId, SprintState};
pub use work_item::WorkItem;
