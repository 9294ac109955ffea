// ABOUTME: Shared HTTP plumbing for tools - client construction, send/decode
// ABOUTME: helpers, and classification of upstream failures (rate limit vs other).

use reqwest::header::HeaderMap;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::GatewayConfig;
use crate::error::{ConfigError, ToolError};

/// Build a client with the configured timeout and user agent.
pub fn build_client(config: &GatewayConfig) -> Result<reqwest::Client, ConfigError> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(client)
}

/// Send a request, mapping transport failures.
pub async fn send(service: &'static str, request: RequestBuilder) -> Result<Response, ToolError> {
    request.send().await.map_err(|e| transport_error(service, e))
}

/// Read a successful response body as JSON.
pub async fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: Response,
) -> Result<T, ToolError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(service, e))?;
    serde_json::from_slice(&bytes).map_err(|e| ToolError::MalformedResponse {
        service,
        reason: e.to_string(),
    })
}

/// Send a GET-style request and decode its JSON body.
///
/// A 404 becomes `ToolError::NotFound` with the given message; any other
/// non-success status is classified by [`classify_failure`].
pub async fn fetch_json<T: DeserializeOwned>(
    service: &'static str,
    request: RequestBuilder,
    not_found: impl FnOnce() -> String,
    rate_limit_advice: &str,
) -> Result<T, ToolError> {
    let response = send(service, request).await?;
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(ToolError::NotFound(not_found()));
    }
    if !status.is_success() {
        return Err(reject(service, response, rate_limit_advice).await);
    }
    read_json(service, response).await
}

/// Consume a non-success response and turn it into an error.
///
/// `rate_limit_advice` supplies the hint appended to rate-limit messages when
/// the upstream gives no retry information.
pub async fn reject(
    service: &'static str,
    response: Response,
    rate_limit_advice: &str,
) -> ToolError {
    let status = response.status();
    let headers = response.headers().clone();
    let body = body_or_empty(service, response.text().await);
    let err = classify_failure(service, status, &headers, &body, rate_limit_advice);
    tracing::warn!(service, status = status.as_u16(), "upstream rejected request: {err}");
    err
}

/// An unreadable error body is classified from status and headers alone.
fn body_or_empty(service: &'static str, body: Result<String, reqwest::Error>) -> String {
    body.unwrap_or_else(|e| {
        tracing::debug!(service, "could not read error body: {e}");
        String::new()
    })
}

/// Decide what a non-success upstream answer means.
pub fn classify_failure(
    service: &'static str,
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    rate_limit_advice: &str,
) -> ToolError {
    let message = upstream_message(body);

    if is_rate_limited(status, headers, message.as_deref()) {
        let retry_after = retry_after_secs(headers);
        let advice = match (retry_after, header_u64(headers, "x-ratelimit-reset")) {
            (Some(secs), _) => format!("Retry after {secs} seconds."),
            (None, Some(reset)) if !rate_limit_advice.is_empty() => {
                format!("{rate_limit_advice} Limit resets at unix time {reset}.")
            }
            (None, Some(reset)) => format!("Limit resets at unix time {reset}."),
            (None, None) if !rate_limit_advice.is_empty() => rate_limit_advice.to_string(),
            (None, None) => "Try again later.".to_string(),
        };
        return ToolError::RateLimited {
            service,
            advice,
            retry_after,
        };
    }

    let message = message
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string());
    ToolError::Upstream {
        service,
        status: status.as_u16(),
        message,
    }
}

/// Rate limiting shows up as 429, or as 403 with quota headers or a quota message.
pub fn is_rate_limited(status: StatusCode, headers: &HeaderMap, message: Option<&str>) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    if status != StatusCode::FORBIDDEN {
        return false;
    }
    if header_u64(headers, "x-ratelimit-remaining") == Some(0) {
        return true;
    }
    if headers.contains_key(reqwest::header::RETRY_AFTER) {
        return true;
    }
    message.is_some_and(|m| m.to_ascii_lowercase().contains("rate limit"))
}

fn transport_error(service: &'static str, err: reqwest::Error) -> ToolError {
    if err.is_timeout() {
        tracing::warn!(service, "request timed out");
        ToolError::Timeout { service }
    } else {
        ToolError::Transport {
            service,
            source: err,
        }
    }
}

fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    header_u64(headers, reqwest::header::RETRY_AFTER.as_str())
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Pull a human-readable message out of an error body.
///
/// GitHub uses `message`, weather.gov uses `detail` / `title`.
fn upstream_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return ["message", "detail", "title", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string);
    }
    let mut text: String = trimmed.chars().take(200).collect();
    if trimmed.chars().count() > 200 {
        text.push_str("...");
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderName, HeaderValue};

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(HeaderName::from_static(k), HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_429_is_rate_limited() {
        let err = classify_failure(
            "weather.gov API",
            StatusCode::TOO_MANY_REQUESTS,
            &headers(&[("retry-after", "30")]),
            "",
            "",
        );
        assert!(err.is_rate_limited());
        assert_eq!(
            err.to_string(),
            "weather.gov API rate limit exceeded. Retry after 30 seconds."
        );
        assert_eq!(err.details()["retry_after"], 30);
    }

    #[test]
    fn test_403_with_exhausted_quota_is_rate_limited() {
        let err = classify_failure(
            "GitHub API",
            StatusCode::FORBIDDEN,
            &headers(&[("x-ratelimit-remaining", "0"), ("x-ratelimit-reset", "1700000000")]),
            r#"{"message": "API rate limit exceeded for 1.2.3.4."}"#,
            "Set GITHUB_TOKEN to increase limits.",
        );
        assert!(err.is_rate_limited());
        let msg = err.to_string();
        assert!(msg.starts_with("GitHub API rate limit exceeded."));
        assert!(msg.contains("GITHUB_TOKEN"));
        assert!(msg.contains("1700000000"));
    }

    #[test]
    fn test_403_with_quota_message_only_is_rate_limited() {
        let err = classify_failure(
            "GitHub API",
            StatusCode::FORBIDDEN,
            &HeaderMap::new(),
            r#"{"message": "You have exceeded a secondary rate limit."}"#,
            "",
        );
        assert!(err.is_rate_limited());
        assert!(err.to_string().ends_with("Try again later."));
    }

    #[test]
    fn test_plain_403_is_generic() {
        let err = classify_failure(
            "GitHub API",
            StatusCode::FORBIDDEN,
            &headers(&[("x-ratelimit-remaining", "4999")]),
            r#"{"message": "Resource not accessible by integration"}"#,
            "Set GITHUB_TOKEN to increase limits.",
        );
        assert!(!err.is_rate_limited());
        assert_eq!(
            err.to_string(),
            "GitHub API error: 403 (Resource not accessible by integration)"
        );
    }

    #[test]
    fn test_500_without_body_uses_reason() {
        let err = classify_failure(
            "email webhook",
            StatusCode::INTERNAL_SERVER_ERROR,
            &HeaderMap::new(),
            "",
            "",
        );
        assert_eq!(err.to_string(), "email webhook error: 500 (Internal Server Error)");
        assert_eq!(err.kind(), "upstream");
    }

    #[tokio::test]
    async fn test_unreadable_error_body_falls_back_to_status() {
        // Nothing listens on port 9 locally.
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .unwrap_err();
        let body = body_or_empty("email webhook", Err(err));
        assert!(body.is_empty());

        let err = classify_failure(
            "email webhook",
            StatusCode::BAD_GATEWAY,
            &HeaderMap::new(),
            &body,
            "",
        );
        assert_eq!(err.to_string(), "email webhook error: 502 (Bad Gateway)");
    }

    #[test]
    fn test_plain_text_body_is_truncated() {
        let body = "x".repeat(500);
        let err = classify_failure(
            "email webhook",
            StatusCode::BAD_REQUEST,
            &HeaderMap::new(),
            &body,
            "",
        );
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.len() < 300);
    }
}
