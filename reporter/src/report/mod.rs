//! Report module
//!
//! Markdown and chat rendering of search results, weekly reports and
//! sprint rotations.

pub mod renderer;

pub use renderer::{
    render_issue_list, render_report_summary, render_rotation_summary, render_weekly_report,
};
