//! Shared HTTP plumbing for the tracker clients

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde::Deserialize;

use crate::error::TrackerError;

pub const USER_AGENT: &str = concat!("work-reporter/", env!("CARGO_PKG_VERSION"));

pub fn build_client(timeout: Duration) -> Result<Client, TrackerError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// When a rate-limited client may try again, from the response headers
///
/// `X-RateLimit-Reset` carries epoch seconds; `Retry-After` carries a delay.
pub fn rate_limit_reset(headers: &HeaderMap, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
    };

    if let Some(epoch) = header("x-ratelimit-reset") {
        return DateTime::from_timestamp(epoch, 0);
    }
    header("retry-after").map(|secs| now + chrono::Duration::seconds(secs))
}

pub async fn handle_response<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, TrackerError> {
    let status = response.status();

    if status.is_success() {
        response
            .json()
            .await
            .map_err(|e| TrackerError::Deserialization(e.to_string()))
    } else {
        Err(error_for(response).await)
    }
}

pub async fn handle_empty_response(response: reqwest::Response) -> Result<(), TrackerError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(error_for(response).await)
    }
}

async fn error_for(response: reqwest::Response) -> TrackerError {
    let status = response.status().as_u16();
    match status {
        401 => TrackerError::Unauthorized,
        429 => TrackerError::RateLimited {
            reset: rate_limit_reset(response.headers(), Utc::now()),
        },
        _ => {
            let message = response.text().await.unwrap_or_default();
            TrackerError::Api { status, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn reset_from_epoch_header() {
        let now = Utc::now();
        let reset = rate_limit_reset(&headers(&[("x-ratelimit-reset", "1718020800")]), now);
        assert_eq!(reset, DateTime::from_timestamp(1_718_020_800, 0));
    }

    #[test]
    fn reset_from_retry_after() {
        let now = Utc::now();
        let reset = rate_limit_reset(&headers(&[("retry-after", "30")]), now);
        assert_eq!(reset, Some(now + chrono::Duration::seconds(30)));
    }

    #[test]
    fn no_reset_without_headers() {
        assert_eq!(rate_limit_reset(&HeaderMap::new(), Utc::now()), None);
        assert_eq!(
            rate_limit_reset(&headers(&[("retry-after", "soon")]), Utc::now()),
            None
        );
    }
}
