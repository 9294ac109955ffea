// ABOUTME: Defines the ToolResult envelope - the uniform success/error
// ABOUTME: contract every tool returns, with auxiliary details.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ToolError;

/// Payload half of the envelope: exactly one of result or error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Failure(String),
}

/// Result of a tool execution.
///
/// Serializes as `{"success": bool, "result"?: .., "error"?: .., "details": {..}}`
/// where `result` is present iff `success` and `error` iff not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Envelope", try_from = "Envelope")]
pub struct ToolResult {
    pub outcome: Outcome,
    pub details: Map<String, Value>,
}

impl ToolResult {
    /// Create a successful result carrying a payload.
    pub fn success(result: impl Into<Value>) -> Self {
        Self {
            outcome: Outcome::Success(result.into()),
            details: Map::new(),
        }
    }

    /// Create a failure result.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failure(error.into()),
            details: Map::new(),
        }
    }

    /// Add a detail entry. Values that fail to serialize are skipped.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.details.insert(key.into(), v);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success(v) => Some(v),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(e) => Some(e),
        }
    }

    /// Render the envelope as a JSON value.
    pub fn to_value(&self) -> Value {
        Value::from(Envelope::from(self.clone()))
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        Self {
            outcome: Outcome::Failure(err.to_string()),
            details: err.details(),
        }
    }
}

/// Wire shape of the envelope.
#[derive(Serialize, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default)]
    details: Map<String, Value>,
}

impl From<ToolResult> for Envelope {
    fn from(r: ToolResult) -> Self {
        let (success, result, error) = match r.outcome {
            Outcome::Success(v) => (true, Some(v), None),
            Outcome::Failure(e) => (false, None, Some(e)),
        };
        Self {
            success,
            result,
            error,
            details: r.details,
        }
    }
}

impl From<Envelope> for Value {
    fn from(e: Envelope) -> Self {
        let mut obj = Map::new();
        obj.insert("success".into(), Value::Bool(e.success));
        if let Some(result) = e.result {
            obj.insert("result".into(), result);
        }
        if let Some(error) = e.error {
            obj.insert("error".into(), Value::String(error));
        }
        obj.insert("details".into(), Value::Object(e.details));
        Value::Object(obj)
    }
}

impl TryFrom<Envelope> for ToolResult {
    type Error = String;

    fn try_from(e: Envelope) -> Result<Self, Self::Error> {
        let outcome = match (e.success, e.result, e.error) {
            (true, Some(result), None) => Outcome::Success(result),
            (false, None, Some(error)) => Outcome::Failure(error),
            (true, _, _) => {
                return Err("successful envelope must carry `result` and no `error`".into());
            }
            (false, _, _) => {
                return Err("failed envelope must carry `error` and no `result`".into());
            }
        };
        Ok(Self {
            outcome,
            details: e.details,
        })
    }
}
