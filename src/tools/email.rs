// ABOUTME: SendEmailTool - sends an email by POSTing to a configured webhook.
// ABOUTME: Validates recipient, subject, and body before any network I/O.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::GatewayConfig;
use crate::error::{ConfigError, ToolError};
use crate::http;
use crate::tool::{Tool, ToolResult, parse_params};

const SERVICE: &str = "email webhook";
pub const MAX_SUBJECT_CHARS: usize = 500;
pub const MAX_BODY_CHARS: usize = 50_000;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

/// JSON body posted to the webhook.
#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    to_email: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Tool for sending email through a webhook.
pub struct SendEmailTool {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl SendEmailTool {
    /// Create the tool from the gateway configuration.
    ///
    /// A missing webhook URL is not an error here; calls report it instead.
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_client(
            http::build_client(config)?,
            config.email_webhook_url.clone(),
        ))
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: reqwest::Client, webhook_url: Option<String>) -> Self {
        Self {
            client,
            webhook_url,
        }
    }
}

/// Check recipient, subject, and body against the webhook's limits.
pub fn validate_email(to_email: &str, subject: &str, body: &str) -> Result<(), ToolError> {
    if !EMAIL_RE.is_match(to_email.trim()) {
        return Err(ToolError::InvalidParams(format!(
            "Invalid email format: {to_email:?}"
        )));
    }
    check_text("subject", subject, MAX_SUBJECT_CHARS)?;
    check_text("body", body, MAX_BODY_CHARS)
}

fn check_text(field: &str, value: &str, max: usize) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidParams(format!(
            "Email {field} cannot be empty"
        )));
    }
    let len = value.chars().count();
    if len > max {
        return Err(ToolError::InvalidParams(format!(
            "Email {field} exceeds maximum length of {max} characters (got {len})"
        )));
    }
    Ok(())
}

#[async_trait]
impl Tool for SendEmailTool {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send an email by triggering a webhook (e.g. a Power Automate flow). Requires POWER_AUTOMATE_WEBHOOK_URL to be configured."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "to_email": {
                    "type": "string",
                    "description": "Recipient's email address"
                },
                "subject": {
                    "type": "string",
                    "description": "Email subject (max 500 characters)",
                    "maxLength": MAX_SUBJECT_CHARS
                },
                "body": {
                    "type": "string",
                    "description": "Email body content (max 50,000 characters)",
                    "maxLength": MAX_BODY_CHARS
                }
            },
            "required": ["to_email", "subject", "body"]
        })
    }

    async fn invoke(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            to_email: String,
            subject: String,
            body: String,
        }

        let webhook_url = self.webhook_url.as_deref().ok_or_else(|| {
            ToolError::NotConfigured(
                "Email webhook URL not configured. Set POWER_AUTOMATE_WEBHOOK_URL to enable sending email."
                    .to_string(),
            )
        })?;

        let params: Params = parse_params(params)?;
        validate_email(&params.to_email, &params.subject, &params.body)?;
        let to_email = params.to_email.trim();

        tracing::debug!(to = to_email, "posting email to webhook");
        let request = self.client.post(webhook_url).json(&EmailPayload {
            to_email,
            subject: &params.subject,
            body: &params.body,
        });
        let response = http::send(SERVICE, request).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(http::reject(SERVICE, response, "").await);
        }

        Ok(ToolResult::success(json!({
            "message": "Email sent successfully",
            "to_email": to_email,
            "subject": params.subject,
            "status_code": status.as_u16(),
        }))
        .with_detail("webhook_status", status.as_u16()))
    }
}
