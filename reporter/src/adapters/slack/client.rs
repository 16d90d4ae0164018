//! Slack notifier

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::ports::Notifier;
use crate::error::NotifyError;

/// Posts messages to one Slack channel through `chat.postMessage`
pub struct SlackNotifier {
    http: Client,
    api_url: String,
    token: String,
    channel: String,
    username: Option<String>,
}

impl SlackNotifier {
    pub fn new(
        api_url: String,
        token: String,
        channel: &str,
        username: Option<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            channel: channel_name(channel),
            username,
        })
    }
}

/// Channels are addressed by name with a leading `#`
fn channel_name(channel: &str) -> String {
    if channel.starts_with('#') {
        channel.to_string()
    } else {
        format!("#{}", channel)
    }
}

#[derive(Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    error: Option<String>,
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        tracing::debug!(channel = %self.channel, "Posting Slack message");

        let response = self
            .http
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.token)
            .json(&PostMessageRequest {
                channel: &self.channel,
                text: message,
                username: self.username.as_deref(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(format!("HTTP {}", status.as_u16())));
        }

        let body: PostMessageResponse = response.json().await?;
        if body.ok {
            Ok(())
        } else {
            Err(NotifyError::Rejected(
                body.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

/// Notifier used when no channel is configured
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        tracing::info!(message, "No Slack channel configured, skipping notification");
        Ok(())
    }
}
