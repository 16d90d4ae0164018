//! Report renderer
//!
//! Renders search results and weekly reports to Markdown.

use crate::app::{MemberReviews, OnCallSection, ProjectSection, RotationOutcome, WeeklyReport};
use crate::domain::entities::sprint::DAY_FORMAT;
use crate::domain::entities::{IssueRecord, IssueState, WorkItem};

/// Render the weekly report to markdown format
pub fn render_weekly_report(report: &WeeklyReport) -> String {
    let mut buf = String::new();
    let range = sprint_range_label(report);

    buf.push_str(&format!("# Weekly Report: {}\n\n", report.sprint.name));

    if let Some(oncall) = &report.oncall {
        buf.push_str(&render_oncall(oncall, &created_window_label(report)));
    }

    buf.push_str("## New Issues\n\n");
    buf.push_str(&format!("> New GitHub issues (created: {})\n\n", range));
    buf.push_str(&render_issue_list(&report.new_issues, &report.team));
    buf.push('\n');

    buf.push_str("## Merged PRs\n\n");
    buf.push_str(&format!("> Merged GitHub PRs (merged: {})\n\n", range));
    buf.push_str(&render_issue_list(&report.merged_pull_requests, &report.team));
    buf.push('\n');

    if !report.reviews.is_empty() {
        buf.push_str("## Reviews\n\n");
        for reviews in &report.reviews {
            buf.push_str(&render_member_reviews(reviews, &report.team));
        }
    }

    buf.push_str("## Projects\n\n");
    if report.projects.is_empty() {
        buf.push_str("_None_\n");
    } else {
        buf.push_str("| Name | Purpose | Issues | Manager | Start Date |\n");
        buf.push_str("|---|---|---|---|---|\n");
        for project in &report.projects {
            buf.push_str(&render_project_row(project));
        }
    }

    buf
}

/// Render a flat list of search hits, one bullet per record
pub fn render_issue_list(records: &[IssueRecord], team: &[String]) -> String {
    if records.is_empty() {
        return "_None_\n".to_string();
    }

    let mut buf = String::new();
    for record in records {
        buf.push_str(&format!("- {}\n", render_issue(record, team)));
    }
    buf
}

/// Short chat message announcing a finished report
pub fn render_report_summary(report: &WeeklyReport) -> String {
    format!(
        "Weekly report for sprint {} is ready: {} new issues, {} merged PRs, {} projects",
        report.sprint.name,
        report.new_issues.len(),
        report.merged_pull_requests.len(),
        report.projects.len()
    )
}

/// Chat message announcing a sprint rotation
pub fn render_rotation_summary(outcome: &RotationOutcome) -> String {
    let mut message = format!(
        "Sprint {} is closed, sprint {} is active",
        outcome.closed.name, outcome.activated.name
    );
    if outcome.moved > 0 {
        message.push_str(&format!(" ({} unfinished issues carried over)", outcome.moved));
    }
    message
}

fn render_issue(record: &IssueRecord, team: &[String]) -> String {
    let repository = record.repository().unwrap_or_else(|| "unknown".to_string());
    let mut line = format!(
        "[{}] [{}]({}) by @{}",
        repository,
        escape(&record.title),
        record.url,
        record.author
    );

    if !record.assignees.is_empty() {
        line.push_str(", assigned to");
        for assignee in &record.assignees {
            line.push_str(&format!(" @{}", assignee));
        }
    }

    match record.state {
        IssueState::Closed => line.push_str(" (closed)"),
        IssueState::Merged => line.push_str(" (merged)"),
        IssueState::Open => {}
    }

    if !record.is_authored_by_any(team) {
        line.push_str(" `Community`");
    }

    line
}

fn render_member_reviews(reviews: &MemberReviews, team: &[String]) -> String {
    format!(
        "### @{}\n\n{}\n",
        reviews.member,
        render_issue_list(&reviews.pull_requests, team)
    )
}

fn render_oncall(oncall: &OnCallSection, window: &str) -> String {
    let mut buf = String::from("## OnCall\n\n");

    buf.push_str("### New OnCall\n\n");
    buf.push_str(&format!(
        "> Newly created {} tickets ({})\n\n",
        oncall.project, window
    ));
    buf.push_str(&render_work_item_list(&oncall.new_issues));
    buf.push('\n');

    buf.push_str("### Highest Priority\n\n");
    buf.push_str("> Unresolved highest priority tickets (priority = Highest AND resolution = Unresolved)\n\n");
    buf.push_str(&render_work_item_list(&oncall.highest_priority));
    buf.push('\n');

    buf
}

fn render_work_item_list(items: &[WorkItem]) -> String {
    if items.is_empty() {
        return "_None_\n".to_string();
    }

    let mut buf = String::new();
    for item in items {
        buf.push_str(&format!(
            "- {} {} ({}), assigned to {}\n",
            item.key,
            escape(&item.summary),
            item.status,
            item.assignee.as_deref().unwrap_or("nobody")
        ));
    }
    buf
}

fn render_project_row(project: &ProjectSection) -> String {
    let epic = &project.epic;
    let name = epic.epic_name.as_deref().unwrap_or(&epic.key);
    let created = epic
        .created
        .map(|ts| ts.format(DAY_FORMAT).to_string())
        .unwrap_or_default();
    let issues: Vec<String> = project
        .issues
        .iter()
        .map(|issue| format!("{} ({})", issue.key, escape_cell(&issue.status)))
        .collect();

    format!(
        "| {} ({}) | {} | {} | {} | {} |\n",
        escape_cell(name),
        epic.key,
        escape_cell(&epic.summary),
        issues.join("<br>"),
        epic.assignee.as_deref().unwrap_or("-"),
        created
    )
}

fn sprint_range_label(report: &WeeklyReport) -> String {
    match (report.sprint.start, report.sprint.end) {
        (Some(start), Some(end)) => format!(
            "{}..{}",
            start.format(DAY_FORMAT),
            end.format(DAY_FORMAT)
        ),
        _ => report.sprint.name.clone(),
    }
}

/// Sprint window in the board's own days, end exclusive
fn created_window_label(report: &WeeklyReport) -> String {
    match (report.sprint.start, report.sprint.end) {
        (Some(start), Some(end)) => format!(
            "created >= {} AND created < {}",
            start.format(DAY_FORMAT),
            end.format(DAY_FORMAT)
        ),
        _ => report.sprint.name.clone(),
    }
}

/// Keep titles from closing the link text early
fn escape(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
