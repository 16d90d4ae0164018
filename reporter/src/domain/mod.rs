//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: Domain models (issue records, queries, sprints, work items)
//! - `ports`: Trait definitions for the trackers, the clock and the notifier

pub mod entities;
pub mod ports;
