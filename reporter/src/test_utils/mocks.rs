//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and record calls so tests can verify ordering.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::domain::entities::{
    Board, BoardId, BoardType, IssueRecord, SortKey, Sprint, SprintId, SprintState, WorkItem,
};
use crate::domain::ports::{AgileClient, Clock, IssueSearchClient, Notifier, SearchPage};
use crate::error::{NotifyError, TrackerError};

// ============================================================================
// Mock Search Client
// ============================================================================

/// A search request as the client received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub sort: SortKey,
    pub page: u32,
}

/// A search client serving pre-built pages, with scripted rate limiting
#[derive(Default)]
pub struct MockSearchClient {
    pages: Arc<RwLock<HashMap<u32, SearchPage>>>,
    /// Page -> queued rate-limit responses (reset times) served before the page
    rate_limits: Arc<RwLock<HashMap<u32, VecDeque<Option<DateTime<Utc>>>>>>,
    /// Page -> HTTP status of a hard failure
    failures: Arc<RwLock<HashMap<u32, u16>>>,
    requests: Arc<RwLock<Vec<SearchRequest>>>,
}

impl MockSearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `pages` as pages 1..=N, each linking to the next
    pub fn with_pages(self, pages: Vec<Vec<IssueRecord>>) -> Self {
        {
            let total = pages.len() as u32;
            let mut stored = self.pages.write().unwrap();
            for (index, items) in pages.into_iter().enumerate() {
                let number = index as u32 + 1;
                stored.insert(
                    number,
                    SearchPage {
                        items,
                        next_page: (number < total).then_some(number + 1),
                    },
                );
            }
        }
        self
    }

    /// Answer `page` with `times` rate-limit responses before serving it
    pub fn with_rate_limit(self, page: u32, reset: Option<DateTime<Utc>>, times: usize) -> Self {
        {
            let mut rate_limits = self.rate_limits.write().unwrap();
            let queue = rate_limits.entry(page).or_default();
            for _ in 0..times {
                queue.push_back(reset);
            }
        }
        self
    }

    /// Fail `page` with an API error
    pub fn with_failure(self, page: u32, status: u16) -> Self {
        self.failures.write().unwrap().insert(page, status);
        self
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.requests.read().unwrap().clone()
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requests().iter().map(|r| r.page).collect()
    }
}

#[async_trait]
impl IssueSearchClient for MockSearchClient {
    async fn search(
        &self,
        query: &str,
        sort: SortKey,
        page: u32,
    ) -> Result<SearchPage, TrackerError> {
        self.requests.write().unwrap().push(SearchRequest {
            query: query.to_string(),
            sort,
            page,
        });

        if let Some(reset) = self
            .rate_limits
            .write()
            .unwrap()
            .get_mut(&page)
            .and_then(|queue| queue.pop_front())
        {
            return Err(TrackerError::RateLimited { reset });
        }

        if let Some(status) = self.failures.read().unwrap().get(&page) {
            return Err(TrackerError::Api {
                status: *status,
                message: "Mock failure".to_string(),
            });
        }

        Ok(self
            .pages
            .read()
            .unwrap()
            .get(&page)
            .cloned()
            .unwrap_or_default())
    }
}

// ============================================================================
// Mock Clock
// ============================================================================

/// A virtual clock: sleeping advances `now` instantly and is recorded
pub struct MockClock {
    now: Arc<RwLock<DateTime<Utc>>>,
    sleeps: Arc<RwLock<Vec<Duration>>>,
}

impl MockClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
            sleeps: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.read().unwrap().clone()
    }
}

#[async_trait]
impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.write().unwrap().push(duration);
        let mut now = self.now.write().unwrap();
        *now += chrono::Duration::from_std(duration).unwrap();
    }
}

// ============================================================================
// Mock Agile Client
// ============================================================================

/// One call received by the mock agile client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgileCall {
    ListBoards(String),
    ListSprints(BoardId, Option<SprintState>),
    CreateSprint(String),
    UpdateSprintState(SprintId, SprintState),
    ListIssues(SprintId),
    MoveIssues(SprintId, Vec<String>),
    SearchIssues(String),
    GetIssue(String),
}

/// An in-memory agile board that records every call in a journal
#[derive(Default)]
pub struct MockAgileClient {
    boards: Arc<RwLock<Vec<Board>>>,
    sprints: Arc<RwLock<Vec<Sprint>>>,
    sprint_issues: Arc<RwLock<HashMap<SprintId, Vec<WorkItem>>>>,
    search_results: Arc<RwLock<Vec<WorkItem>>>,
    jql_results: Arc<RwLock<HashMap<String, Vec<WorkItem>>>>,
    issues_by_key: Arc<RwLock<HashMap<String, WorkItem>>>,
    calls: Arc<RwLock<Vec<AgileCall>>>,
    /// Number of move calls that succeed before moves start failing
    fail_moves_after: Arc<RwLock<Option<usize>>>,
    /// Transitions into this state fail
    failing_state: Arc<RwLock<Option<SprintState>>>,
    next_sprint_id: Arc<RwLock<i64>>,
}

impl MockAgileClient {
    pub fn new() -> Self {
        Self {
            next_sprint_id: Arc::new(RwLock::new(100)),
            ..Self::default()
        }
    }

    pub fn with_board(self, board: Board) -> Self {
        self.boards.write().unwrap().push(board);
        self
    }

    pub fn with_sprint(self, sprint: Sprint) -> Self {
        self.sprints.write().unwrap().push(sprint);
        self
    }

    pub fn with_sprint_issues(self, sprint_id: SprintId, issues: Vec<WorkItem>) -> Self {
        self.sprint_issues
            .write()
            .unwrap()
            .entry(sprint_id)
            .or_default()
            .extend(issues);
        self
    }

    /// Issues returned by every JQL search without its own results
    pub fn with_search_results(self, issues: Vec<WorkItem>) -> Self {
        self.search_results.write().unwrap().extend(issues);
        self
    }

    /// Issues returned for exactly this JQL
    pub fn with_jql_results(self, jql: &str, issues: Vec<WorkItem>) -> Self {
        self.jql_results
            .write()
            .unwrap()
            .insert(jql.to_string(), issues);
        self
    }

    /// An issue reachable through `get_issue`
    pub fn with_issue(self, issue: WorkItem) -> Self {
        self.issues_by_key
            .write()
            .unwrap()
            .insert(issue.key.clone(), issue);
        self
    }

    /// Let `successful` move calls through, then fail every later one
    pub fn with_failing_moves_after(self, successful: usize) -> Self {
        *self.fail_moves_after.write().unwrap() = Some(successful);
        self
    }

    /// Fail every transition into `state`
    pub fn with_failing_transition(self, state: SprintState) -> Self {
        *self.failing_state.write().unwrap() = Some(state);
        self
    }

    pub fn clear_failures(&self) {
        *self.fail_moves_after.write().unwrap() = None;
        *self.failing_state.write().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<AgileCall> {
        self.calls.read().unwrap().clone()
    }

    /// Position of the first call matching `predicate` in the journal
    pub fn position(&self, predicate: impl Fn(&AgileCall) -> bool) -> Option<usize> {
        self.calls.read().unwrap().iter().position(predicate)
    }

    pub fn move_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AgileCall::MoveIssues(_, ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub fn sprint(&self, id: SprintId) -> Option<Sprint> {
        self.sprints
            .read()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    pub fn sprints(&self) -> Vec<Sprint> {
        self.sprints.read().unwrap().clone()
    }

    pub fn issue_ids_in(&self, sprint_id: SprintId) -> Vec<String> {
        self.sprint_issues
            .read()
            .unwrap()
            .get(&sprint_id)
            .map(|issues| issues.iter().map(|i| i.id.clone()).collect())
            .unwrap_or_default()
    }

    fn record(&self, call: AgileCall) {
        self.calls.write().unwrap().push(call);
    }

    fn not_found(what: String) -> TrackerError {
        TrackerError::Api {
            status: 404,
            message: what,
        }
    }
}

#[async_trait]
impl AgileClient for MockAgileClient {
    async fn list_boards(
        &self,
        project_key: &str,
        board_type: BoardType,
    ) -> Result<Vec<Board>, TrackerError> {
        self.record(AgileCall::ListBoards(project_key.to_string()));
        Ok(self
            .boards
            .read()
            .unwrap()
            .iter()
            .filter(|b| b.board_type == board_type)
            .cloned()
            .collect())
    }

    async fn list_sprints(
        &self,
        board_id: BoardId,
        state: Option<SprintState>,
    ) -> Result<Vec<Sprint>, TrackerError> {
        self.record(AgileCall::ListSprints(board_id, state));
        Ok(self
            .sprints
            .read()
            .unwrap()
            .iter()
            .filter(|s| state.map_or(true, |wanted| s.state == wanted))
            .cloned()
            .collect())
    }

    async fn create_sprint(
        &self,
        _board_id: BoardId,
        name: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Sprint, TrackerError> {
        self.record(AgileCall::CreateSprint(name.to_string()));

        let id = {
            let mut next = self.next_sprint_id.write().unwrap();
            *next += 1;
            SprintId(*next)
        };
        let sprint = Sprint {
            id,
            name: name.to_string(),
            start: Some(start),
            end: Some(end),
            state: SprintState::Future,
        };
        self.sprints.write().unwrap().push(sprint.clone());
        Ok(sprint)
    }

    async fn update_sprint_state(
        &self,
        sprint_id: SprintId,
        state: SprintState,
    ) -> Result<Sprint, TrackerError> {
        self.record(AgileCall::UpdateSprintState(sprint_id, state));

        if *self.failing_state.read().unwrap() == Some(state) {
            return Err(TrackerError::Api {
                status: 400,
                message: format!("Mock failure moving sprint {} to {}", sprint_id, state),
            });
        }

        let mut sprints = self.sprints.write().unwrap();
        let sprint = sprints
            .iter_mut()
            .find(|s| s.id == sprint_id)
            .ok_or_else(|| Self::not_found(format!("Sprint {} not found", sprint_id)))?;
        sprint.state = state;
        Ok(sprint.clone())
    }

    async fn list_issues_in_sprint(
        &self,
        sprint_id: SprintId,
    ) -> Result<Vec<WorkItem>, TrackerError> {
        self.record(AgileCall::ListIssues(sprint_id));
        Ok(self
            .sprint_issues
            .read()
            .unwrap()
            .get(&sprint_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn move_issues_to_sprint(
        &self,
        sprint_id: SprintId,
        issue_ids: &[String],
    ) -> Result<(), TrackerError> {
        let previous_moves = self.move_calls().len();
        self.record(AgileCall::MoveIssues(sprint_id, issue_ids.to_vec()));

        if let Some(successful) = *self.fail_moves_after.read().unwrap() {
            if previous_moves >= successful {
                return Err(TrackerError::Api {
                    status: 500,
                    message: "Mock move failure".to_string(),
                });
            }
        }

        let mut sprint_issues = self.sprint_issues.write().unwrap();
        let mut moving = Vec::new();
        for issues in sprint_issues.values_mut() {
            let (taken, kept): (Vec<_>, Vec<_>) = issues
                .drain(..)
                .partition(|issue| issue_ids.contains(&issue.id));
            *issues = kept;
            moving.extend(taken);
        }
        sprint_issues.entry(sprint_id).or_default().extend(moving);
        Ok(())
    }

    async fn search_issues(&self, jql: &str) -> Result<Vec<WorkItem>, TrackerError> {
        self.record(AgileCall::SearchIssues(jql.to_string()));
        if let Some(issues) = self.jql_results.read().unwrap().get(jql) {
            return Ok(issues.clone());
        }
        Ok(self.search_results.read().unwrap().clone())
    }

    async fn get_issue(&self, key: &str) -> Result<WorkItem, TrackerError> {
        self.record(AgileCall::GetIssue(key.to_string()));
        self.issues_by_key
            .read()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("Issue {} not found", key)))
    }
}

// ============================================================================
// Recording Notifier
// ============================================================================

/// A notifier that keeps every message
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Arc<RwLock<Vec<String>>>,
    pub should_fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Vec::new())),
            should_fail: true,
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.read().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        if self.should_fail {
            return Err(NotifyError::Rejected("channel_not_found".to_string()));
        }
        self.messages.write().unwrap().push(message.to_string());
        Ok(())
    }
}
