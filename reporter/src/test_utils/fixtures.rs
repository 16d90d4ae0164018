//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::{DateTime, FixedOffset, Utc};

use crate::domain::entities::{
    Board, BoardId, BoardType, IssueRecord, IssueState, Sprint, SprintId, SprintState, WorkItem,
};

/// Parse an RFC 3339 timestamp, keeping its offset
pub fn at(ts: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(ts).unwrap()
}

/// Parse an RFC 3339 timestamp as UTC
pub fn utc(ts: &str) -> DateTime<Utc> {
    at(ts).with_timezone(&Utc)
}

/// Create an open issue with the given URL
pub fn test_issue(url: &str) -> IssueRecord {
    IssueRecord {
        url: url.to_string(),
        title: format!("Issue at {}", url),
        author: "alice".to_string(),
        state: IssueState::Open,
        assignees: vec![],
        is_pull_request: false,
    }
}

/// Create issue `number` in `pingcap/tikv`
pub fn test_issue_numbered(number: u32) -> IssueRecord {
    test_issue(&format!("https://github.com/pingcap/tikv/issues/{:04}", number))
}

/// Create a pull request with the given author and state
pub fn test_pull_request(number: u32, author: &str, state: IssueState) -> IssueRecord {
    IssueRecord {
        url: format!("https://github.com/pingcap/tikv/pull/{}", number),
        title: format!("PR {}", number),
        author: author.to_string(),
        state,
        assignees: vec![],
        is_pull_request: true,
    }
}

pub fn test_board(id: i64) -> Board {
    Board {
        id: BoardId(id),
        name: format!("Board {}", id),
        board_type: BoardType::Scrum,
    }
}

/// Create a sprint spanning `[start, end)`, named from its dates
pub fn test_sprint(id: i64, start: &str, end: &str, state: SprintState) -> Sprint {
    let (start, end) = (at(start), at(end));
    Sprint {
        id: SprintId(id),
        name: Sprint::name_for(&start, &end),
        start: Some(start),
        end: Some(end),
        state,
    }
}

/// Create a work item with the given id and status
pub fn test_work_item(id: u32, status: &str) -> WorkItem {
    WorkItem {
        id: id.to_string(),
        key: format!("TIKV-{}", id),
        summary: format!("Work item {}", id),
        status: status.to_string(),
        assignee: Some("bob".to_string()),
        epic_link: None,
        epic_name: None,
        created: None,
    }
}

/// Create an epic with a name
pub fn test_epic(id: u32, name: &str) -> WorkItem {
    WorkItem {
        epic_name: Some(name.to_string()),
        summary: format!("{} summary", name),
        created: Some(at("2024-05-01T09:00:00+08:00")),
        ..test_work_item(id, "In Progress")
    }
}

/// Create a work item linked to `epic_key`
pub fn test_work_item_in_epic(id: u32, epic_key: &str) -> WorkItem {
    WorkItem {
        epic_link: Some(epic_key.to_string()),
        ..test_work_item(id, "In Progress")
    }
}
