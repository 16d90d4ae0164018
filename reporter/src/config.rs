use std::env;
use std::time::Duration;

use crate::app::BackoffPolicy;
use crate::error::ConfigError;

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
const DEFAULT_CLOSED_STATUS: &str = "Job Closed";
const DEFAULT_EPIC_LINK_FIELD: &str = "customfield_10100";
const DEFAULT_EPIC_NAME_FIELD: &str = "customfield_10102";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub api_url: String,
    /// `owner/name` slugs every search is scoped to
    pub repos: Vec<String>,
}

/// Names of the Jira custom fields holding an issue's epic key and an epic's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpicFieldMapping {
    pub epic_link: String,
    pub epic_name: String,
}

impl EpicFieldMapping {
    pub fn new(epic_link: &str, epic_name: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            epic_link: validate_custom_field("JIRA_EPIC_LINK_FIELD", epic_link)?,
            epic_name: validate_custom_field("JIRA_EPIC_NAME_FIELD", epic_name)?,
        })
    }
}

impl Default for EpicFieldMapping {
    fn default() -> Self {
        Self {
            epic_link: DEFAULT_EPIC_LINK_FIELD.to_string(),
            epic_name: DEFAULT_EPIC_NAME_FIELD.to_string(),
        }
    }
}

fn validate_custom_field(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    match value.strip_prefix("customfield_") {
        Some(id) if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) => {
            Ok(value.to_string())
        }
        _ => Err(ConfigError::Invalid {
            name,
            message: format!("'{}' is not a custom field key like customfield_10100", value),
        }),
    }
}

#[derive(Debug, Clone)]
pub struct JiraConfig {
    pub endpoint: String,
    pub user: String,
    pub password: String,
    pub project: String,
    /// Issues in this status stay behind when a sprint rotates
    pub closed_status: String,
    pub epic_fields: EpicFieldMapping,
    /// Project collecting on-call tickets; the report skips its section when unset
    pub oncall_project: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub token: String,
    pub channel: String,
    /// Display name for posted messages
    pub user: Option<String>,
    pub api_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    github: Option<GitHubConfig>,
    jira: Option<JiraConfig>,
    /// Absent when no channel is configured; notifications are then skipped
    pub slack: Option<SlackConfig>,
    /// GitHub logins of the team; everyone else is the community
    pub team: Vec<String>,
    pub backoff: BackoffPolicy,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let github = match var("GITHUB_TOKEN") {
            Some(token) => {
                let repos = split_list(&required("GITHUB_REPOS")?);
                if repos.is_empty() {
                    return Err(ConfigError::Invalid {
                        name: "GITHUB_REPOS",
                        message: "no owner/name repository listed".to_string(),
                    });
                }
                Some(GitHubConfig {
                    token,
                    api_url: var("GITHUB_API_URL")
                        .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
                    repos,
                })
            }
            None => None,
        };

        let jira = match var("JIRA_ENDPOINT") {
            Some(endpoint) => Some(JiraConfig {
                endpoint,
                user: required("JIRA_USER")?,
                password: required("JIRA_PASSWORD")?,
                project: required("JIRA_PROJECT")?,
                closed_status: var("JIRA_CLOSED_STATUS")
                    .unwrap_or_else(|| DEFAULT_CLOSED_STATUS.to_string()),
                epic_fields: EpicFieldMapping::new(
                    &var("JIRA_EPIC_LINK_FIELD")
                        .unwrap_or_else(|| DEFAULT_EPIC_LINK_FIELD.to_string()),
                    &var("JIRA_EPIC_NAME_FIELD")
                        .unwrap_or_else(|| DEFAULT_EPIC_NAME_FIELD.to_string()),
                )?,
                oncall_project: var("JIRA_ONCALL_PROJECT"),
            }),
            None => None,
        };

        let slack = match var("SLACK_CHANNEL") {
            Some(channel) => Some(SlackConfig {
                token: required("SLACK_TOKEN")?,
                channel,
                user: var("SLACK_USER"),
                api_url: var("SLACK_API_URL")
                    .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string()),
            }),
            None => None,
        };

        let defaults = BackoffPolicy::default();
        let backoff = BackoffPolicy {
            max_attempts: parse_number(
                "SEARCH_MAX_ATTEMPTS",
                var("SEARCH_MAX_ATTEMPTS"),
                defaults.max_attempts,
            )?,
            fallback_delay: Duration::from_secs(parse_number(
                "SEARCH_FALLBACK_DELAY_SECS",
                var("SEARCH_FALLBACK_DELAY_SECS"),
                defaults.fallback_delay.as_secs(),
            )?),
            ..defaults
        };
        if backoff.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "SEARCH_MAX_ATTEMPTS",
                message: "must be at least 1".to_string(),
            });
        }

        let http_timeout = Duration::from_secs(parse_number(
            "HTTP_TIMEOUT_SECS",
            var("HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);

        Ok(Self {
            github,
            jira,
            slack,
            team: var("TEAM_MEMBERS")
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            backoff,
            http_timeout,
        })
    }

    pub fn github(&self) -> Result<&GitHubConfig, ConfigError> {
        self.github
            .as_ref()
            .ok_or(ConfigError::Missing("GITHUB_TOKEN"))
    }

    pub fn jira(&self) -> Result<&JiraConfig, ConfigError> {
        self.jira.as_ref().ok_or(ConfigError::Missing("JIRA_ENDPOINT"))
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

fn parse_number<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            message: format!("'{}': {}", raw, e),
        }),
        None => Ok(default),
    }
}
