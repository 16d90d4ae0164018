//! Weekly report service
//!
//! Collects what happened during the last finished sprint: GitHub issues
//! opened, pull requests merged, pull requests each team member reviewed,
//! on-call tickets, and the epics the sprint's issues belong to.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::app::search_aggregator::SearchAggregator;
use crate::domain::entities::sprint::DAY_FORMAT;
use crate::domain::entities::{
    BoardType, DateRange, IssueRecord, SearchQuery, Sprint, SprintState, WorkItem,
};
use crate::domain::ports::{AgileClient, Clock, IssueSearchClient};
use crate::error::{AppError, DomainError};

/// Pull requests one team member commented on
#[derive(Debug, Clone, Serialize)]
pub struct MemberReviews {
    pub member: String,
    pub pull_requests: Vec<IssueRecord>,
}

/// An epic and the sprint's issues linked to it
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSection {
    pub epic: WorkItem,
    pub issues: Vec<WorkItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OnCallSection {
    pub project: String,
    /// Tickets created during the sprint
    pub new_issues: Vec<WorkItem>,
    /// Unresolved tickets of the highest priority, whenever they were opened
    pub highest_priority: Vec<WorkItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub sprint: Sprint,
    pub team: Vec<String>,
    pub new_issues: Vec<IssueRecord>,
    pub merged_pull_requests: Vec<IssueRecord>,
    pub reviews: Vec<MemberReviews>,
    /// Absent when no on-call project is configured
    pub oncall: Option<OnCallSection>,
    /// Epics with work in the sprint, ordered by key
    pub projects: Vec<ProjectSection>,
}

/// Which repositories and people a report covers
#[derive(Debug, Clone, Default)]
pub struct ReportScope {
    pub repos: Vec<String>,
    pub team: Vec<String>,
    pub oncall_project: Option<String>,
}

pub struct WeeklyReportService<S: IssueSearchClient, C: Clock, A: AgileClient> {
    search: SearchAggregator<S, C>,
    agile: Arc<A>,
    clock: Arc<C>,
    scope: ReportScope,
}

impl<S: IssueSearchClient, C: Clock, A: AgileClient> WeeklyReportService<S, C, A> {
    pub fn new(
        search: SearchAggregator<S, C>,
        agile: Arc<A>,
        clock: Arc<C>,
        scope: ReportScope,
    ) -> Self {
        Self {
            search,
            agile,
            clock,
            scope,
        }
    }

    pub async fn build(&self, project_key: &str) -> Result<WeeklyReport, AppError> {
        let sprint = self.last_passed_sprint(project_key).await?;
        let range = sprint_range(&sprint)?;
        tracing::info!(sprint = %sprint.name, range = %range, "Building weekly report");

        let repos = &self.scope.repos;
        let new_issues = self
            .search
            .search(&SearchQuery::created_issues(repos, &range))
            .await?;
        let merged_pull_requests = self
            .search
            .search(&SearchQuery::merged_pull_requests(repos, &range))
            .await?;

        let mut reviews = Vec::with_capacity(self.scope.team.len());
        for member in &self.scope.team {
            let pull_requests = self
                .search
                .search(&SearchQuery::reviewed_pull_requests(repos, member, &range))
                .await?;
            reviews.push(MemberReviews {
                member: member.clone(),
                pull_requests,
            });
        }

        let oncall = match &self.scope.oncall_project {
            Some(oncall_project) => Some(self.oncall_section(oncall_project, &sprint).await?),
            None => None,
        };
        let projects = self.sprint_projects(project_key, &sprint).await?;

        Ok(WeeklyReport {
            sprint,
            team: self.scope.team.clone(),
            new_issues,
            merged_pull_requests,
            reviews,
            oncall,
            projects,
        })
    }

    /// The most recently ended sprint that is not in the future
    async fn last_passed_sprint(&self, project_key: &str) -> Result<Sprint, AppError> {
        let board = self
            .agile
            .list_boards(project_key, BoardType::Scrum)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                DomainError::InvariantViolation(format!(
                    "project {} has no scrum board",
                    project_key
                ))
            })?;

        let now = self.clock.now();
        let sprints = self.agile.list_sprints(board.id, None).await?;
        sprints
            .into_iter()
            .filter(|sprint| sprint.state != SprintState::Future)
            .filter(|sprint| sprint.end.map_or(false, |end| end <= now))
            .max_by_key(|sprint| sprint.end)
            .ok_or_else(|| {
                DomainError::NotFound(format!("no finished sprint on board {}", board.id)).into()
            })
    }

    /// On-call tickets opened in the sprint window, plus the unresolved highest ones
    async fn oncall_section(
        &self,
        oncall_project: &str,
        sprint: &Sprint,
    ) -> Result<OnCallSection, AppError> {
        let (start, end) = match (sprint.start, sprint.end) {
            (Some(start), Some(end)) => (start, end),
            _ => return Err(missing_dates(sprint)),
        };

        let created = format!(
            "project = {} AND created >= {} AND created < {}",
            oncall_project,
            start.format(DAY_FORMAT),
            end.format(DAY_FORMAT)
        );
        let new_issues = self.agile.search_issues(&created).await?;

        let highest = format!(
            "project = {} AND priority = Highest AND resolution = Unresolved",
            oncall_project
        );
        let highest_priority = self.agile.search_issues(&highest).await?;
        tracing::debug!(
            project = %oncall_project,
            new = new_issues.len(),
            highest = highest_priority.len(),
            "Collected on-call tickets"
        );

        Ok(OnCallSection {
            project: oncall_project.to_string(),
            new_issues,
            highest_priority,
        })
    }

    async fn sprint_projects(
        &self,
        project_key: &str,
        sprint: &Sprint,
    ) -> Result<Vec<ProjectSection>, AppError> {
        let jql = format!(
            r#"project = {} AND "Epic Link" is not EMPTY AND Sprint = {}"#,
            project_key, sprint.id
        );
        let mut by_epic: BTreeMap<String, Vec<WorkItem>> = BTreeMap::new();
        for issue in self.agile.search_issues(&jql).await? {
            if let Some(epic_key) = issue.epic_link.clone() {
                by_epic.entry(epic_key).or_default().push(issue);
            }
        }
        tracing::debug!(sprint = %sprint.name, epics = by_epic.len(), "Found sprint epics");

        let mut projects = Vec::with_capacity(by_epic.len());
        for (key, issues) in by_epic {
            let epic = self.agile.get_issue(&key).await?;
            projects.push(ProjectSection { epic, issues });
        }
        Ok(projects)
    }
}

fn sprint_range(sprint: &Sprint) -> Result<DateRange, AppError> {
    match (sprint.start, sprint.end) {
        (Some(start), Some(end)) => Ok(DateRange::Between {
            start: start.with_timezone(&Utc),
            end: end.with_timezone(&Utc),
        }),
        _ => Err(missing_dates(sprint)),
    }
}

fn missing_dates(sprint: &Sprint) -> AppError {
    DomainError::InvariantViolation(format!(
        "sprint '{}' is missing its start or end date",
        sprint.name
    ))
    .into()
}
