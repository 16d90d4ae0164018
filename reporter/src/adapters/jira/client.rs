//! Jira agile API client implementation

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use urlencoding::encode;

use crate::adapters::http::{build_client, handle_empty_response, handle_response};
use crate::config::EpicFieldMapping;
use crate::domain::entities::{
    Board, BoardId, BoardType, Sprint, SprintId, SprintState, WorkItem,
};
use crate::domain::ports::AgileClient;
use crate::error::TrackerError;

const AGILE_API: &str = "rest/agile/1.0";
const CORE_API: &str = "rest/api/2";

/// Implementation of the agile port against Jira Server / Data Center
pub struct JiraAgileClient {
    http: Client,
    endpoint: String,
    user: String,
    password: String,
    fields: EpicFieldMapping,
}

impl JiraAgileClient {
    pub fn new(
        endpoint: String,
        user: String,
        password: String,
        fields: EpicFieldMapping,
        timeout: Duration,
    ) -> Result<Self, TrackerError> {
        Ok(Self {
            http: build_client(timeout)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            user,
            password,
            fields,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.http
            .get(self.url(path))
            .basic_auth(&self.user, Some(&self.password))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.http
            .post(self.url(path))
            .basic_auth(&self.user, Some(&self.password))
    }

    /// Fields requested for issues; the epic fields are custom
    fn issue_fields(&self) -> String {
        format!(
            "summary,status,assignee,created,{},{}",
            self.fields.epic_link, self.fields.epic_name
        )
    }

    /// Collect every page of an agile listing (`values` + `isLast`)
    async fn get_all_values<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, TrackerError> {
        let mut values = Vec::new();
        loop {
            let page: ValuesPage<T> = handle_response(
                self.get(path)
                    .query(params)
                    .query(&[("startAt", values.len())])
                    .send()
                    .await?,
            )
            .await?;

            let fetched = page.values.len();
            values.extend(page.values);
            if page.is_last || fetched == 0 {
                return Ok(values);
            }
        }
    }

    /// Collect every page of an issue listing (`issues` + `total`)
    async fn get_all_issues(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<WorkItem>, TrackerError> {
        let fields = self.issue_fields();
        let mut issues = Vec::new();
        loop {
            let page: IssuesPage = handle_response(
                self.get(path)
                    .query(params)
                    .query(&[("fields", fields.as_str())])
                    .query(&[("startAt", issues.len())])
                    .send()
                    .await?,
            )
            .await?;

            let fetched = page.issues.len();
            for raw in page.issues {
                issues.push(self.work_item(raw));
            }
            if fetched == 0 || page.total.map_or(false, |total| issues.len() >= total) {
                return Ok(issues);
            }
        }
    }

    fn work_item(&self, raw: JiraIssue) -> WorkItem {
        let text = |value: Option<&Value>| value.and_then(Value::as_str).map(String::from);
        let fields = &raw.fields;

        WorkItem {
            summary: text(fields.get("summary")).unwrap_or_default(),
            status: text(fields.get("status").and_then(|s| s.get("name"))).unwrap_or_default(),
            assignee: fields.get("assignee").and_then(|a| {
                text(a.get("name")).or_else(|| text(a.get("displayName")))
            }),
            epic_link: text(fields.get(&self.fields.epic_link)),
            epic_name: text(fields.get(&self.fields.epic_name)),
            created: fields
                .get("created")
                .and_then(Value::as_str)
                .and_then(parse_jira_time),
            id: raw.id,
            key: raw.key,
        }
    }
}

/// Jira timestamps come as RFC 3339 or with a colon-less offset (`+0800`)
fn parse_jira_time(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

fn format_jira_time(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Deserialize)]
struct ValuesPage<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
    #[serde(default, rename = "isLast")]
    is_last: bool,
}

#[derive(Deserialize)]
struct IssuesPage {
    #[serde(default)]
    issues: Vec<JiraIssue>,
    total: Option<usize>,
}

#[derive(Deserialize)]
struct JiraIssue {
    id: String,
    key: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct JiraBoard {
    id: i64,
    name: String,
    #[serde(rename = "type")]
    board_type: String,
}

#[derive(Deserialize)]
struct JiraSprint {
    id: i64,
    name: String,
    state: String,
    #[serde(rename = "startDate")]
    start_date: Option<String>,
    #[serde(rename = "endDate")]
    end_date: Option<String>,
}

impl TryFrom<JiraSprint> for Sprint {
    type Error = TrackerError;

    fn try_from(raw: JiraSprint) -> Result<Self, Self::Error> {
        Ok(Sprint {
            id: SprintId(raw.id),
            state: raw.state.parse().map_err(TrackerError::Deserialization)?,
            start: raw.start_date.as_deref().and_then(parse_jira_time),
            end: raw.end_date.as_deref().and_then(parse_jira_time),
            name: raw.name,
        })
    }
}

#[derive(Serialize)]
struct CreateSprintRequest<'a> {
    name: &'a str,
    #[serde(rename = "startDate")]
    start_date: String,
    #[serde(rename = "endDate")]
    end_date: String,
    #[serde(rename = "originBoardId")]
    origin_board_id: i64,
}

#[derive(Serialize)]
struct UpdateSprintStateRequest {
    state: &'static str,
}

#[derive(Serialize)]
struct MoveIssuesRequest<'a> {
    issues: &'a [String],
}

#[async_trait]
impl AgileClient for JiraAgileClient {
    async fn list_boards(
        &self,
        project_key: &str,
        board_type: BoardType,
    ) -> Result<Vec<Board>, TrackerError> {
        tracing::debug!(project = project_key, "Listing Jira boards");
        let params = [
            ("projectKeyOrId", project_key.to_string()),
            ("type", board_type.as_str().to_string()),
        ];
        let boards: Vec<JiraBoard> = self
            .get_all_values(&format!("{}/board", AGILE_API), &params)
            .await?;

        Ok(boards
            .into_iter()
            .filter_map(|b| {
                let board_type = match b.board_type.as_str() {
                    "scrum" => BoardType::Scrum,
                    "kanban" => BoardType::Kanban,
                    _ => return None,
                };
                Some(Board {
                    id: BoardId(b.id),
                    name: b.name,
                    board_type,
                })
            })
            .collect())
    }

    async fn list_sprints(
        &self,
        board_id: BoardId,
        state: Option<SprintState>,
    ) -> Result<Vec<Sprint>, TrackerError> {
        tracing::debug!(board_id = %board_id, state = ?state, "Listing Jira sprints");
        let params: Vec<(&str, String)> = state
            .map(|s| ("state", s.as_str().to_string()))
            .into_iter()
            .collect();
        let sprints: Vec<JiraSprint> = self
            .get_all_values(&format!("{}/board/{}/sprint", AGILE_API, board_id), &params)
            .await?;

        sprints.into_iter().map(Sprint::try_from).collect()
    }

    async fn create_sprint(
        &self,
        board_id: BoardId,
        name: &str,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Sprint, TrackerError> {
        tracing::debug!(board_id = %board_id, sprint = name, "Creating Jira sprint");
        let request = CreateSprintRequest {
            name,
            start_date: format_jira_time(&start),
            end_date: format_jira_time(&end),
            origin_board_id: board_id.0,
        };
        let sprint: JiraSprint = handle_response(
            self.post(&format!("{}/sprint", AGILE_API))
                .json(&request)
                .send()
                .await?,
        )
        .await?;

        sprint.try_into()
    }

    async fn update_sprint_state(
        &self,
        sprint_id: SprintId,
        state: SprintState,
    ) -> Result<Sprint, TrackerError> {
        tracing::debug!(sprint_id = %sprint_id, state = %state, "Updating Jira sprint state");
        let sprint: JiraSprint = handle_response(
            self.post(&format!("{}/sprint/{}", AGILE_API, sprint_id))
                .json(&UpdateSprintStateRequest {
                    state: state.as_str(),
                })
                .send()
                .await?,
        )
        .await?;

        sprint.try_into()
    }

    async fn list_issues_in_sprint(
        &self,
        sprint_id: SprintId,
    ) -> Result<Vec<WorkItem>, TrackerError> {
        tracing::debug!(sprint_id = %sprint_id, "Listing Jira sprint issues");
        self.get_all_issues(&format!("{}/sprint/{}/issue", AGILE_API, sprint_id), &[])
            .await
    }

    async fn move_issues_to_sprint(
        &self,
        sprint_id: SprintId,
        issue_ids: &[String],
    ) -> Result<(), TrackerError> {
        tracing::debug!(sprint_id = %sprint_id, count = issue_ids.len(), "Moving Jira issues");
        let response = self
            .post(&format!("{}/sprint/{}/issue", AGILE_API, sprint_id))
            .json(&MoveIssuesRequest { issues: issue_ids })
            .send()
            .await?;

        handle_empty_response(response).await
    }

    async fn search_issues(&self, jql: &str) -> Result<Vec<WorkItem>, TrackerError> {
        tracing::debug!(jql, "Searching Jira issues");
        self.get_all_issues(
            &format!("{}/search", CORE_API),
            &[("jql", jql.to_string())],
        )
        .await
    }

    async fn get_issue(&self, key: &str) -> Result<WorkItem, TrackerError> {
        tracing::debug!(key, "Fetching Jira issue");
        let raw: JiraIssue = handle_response(
            self.get(&format!("{}/issue/{}", CORE_API, encode(key)))
                .query(&[("fields", self.issue_fields())])
                .send()
                .await?,
        )
        .await?;

        Ok(self.work_item(raw))
    }
}
