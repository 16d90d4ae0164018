//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities and the tracker ports.

pub mod batch_mover;
pub mod search_aggregator;
pub mod sprint_rotator;
pub mod weekly_report_service;

pub use search_aggregator::{BackoffPolicy, SearchAggregator};
pub use sprint_rotator::{RotationOutcome, SprintRotator};
pub use weekly_report_service::{
    MemberReviews, OnCallSection, ProjectSection, ReportScope, WeeklyReport, WeeklyReportService,
};
