// ABOUTME: Parameter decoding helpers shared by tool implementations.
// ABOUTME: Maps serde and validation failures to ToolError::InvalidParams.

use serde::de::DeserializeOwned;

use crate::error::ToolError;

/// Decode tool parameters into a typed struct.
pub fn parse_params<P: DeserializeOwned>(params: serde_json::Value) -> Result<P, ToolError> {
    let params = if params.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

/// Trim a string parameter and reject it if empty.
pub fn require_non_empty(field: &str, value: &str) -> Result<String, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidParams(format!("`{field}` must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Reject counts outside `1..=max`.
pub fn require_range(field: &str, value: u32, max: u32) -> Result<u32, ToolError> {
    if value == 0 || value > max {
        return Err(ToolError::InvalidParams(format!(
            "`{field}` must be between 1 and {max}, got {value}"
        )));
    }
    Ok(value)
}
