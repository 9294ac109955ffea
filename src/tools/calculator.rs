// ABOUTME: CalculateTool - evaluates a math expression with meval.
// ABOUTME: Supports arithmetic, powers, and functions such as sqrt and sin.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::error::ToolError;
use crate::tool::{Tool, ToolResult, parse_params, require_non_empty};

pub const MAX_EXPRESSION_CHARS: usize = 1_000;

/// Largest magnitude at which every integer is exactly representable in f64.
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Tool for evaluating mathematical expressions.
pub struct CalculateTool;

/// Evaluate `expression`, rejecting anything that is not a finite number.
pub fn evaluate(expression: &str) -> Result<f64, ToolError> {
    let expression = require_non_empty("expression", expression)?;
    let len = expression.chars().count();
    if len > MAX_EXPRESSION_CHARS {
        return Err(ToolError::InvalidParams(format!(
            "Expression exceeds maximum length of {MAX_EXPRESSION_CHARS} characters (got {len})"
        )));
    }

    let value = meval::eval_str(&expression).map_err(|e| {
        ToolError::InvalidParams(format!("Could not evaluate {expression:?}: {e}"))
    })?;
    if !value.is_finite() {
        return Err(ToolError::InvalidParams(format!(
            "{expression:?} does not evaluate to a finite number"
        )));
    }
    Ok(value)
}

/// Whole results come back as JSON integers (`2 + 2` is `4`, not `4.0`).
fn to_json_number(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value.abs() < EXACT_INT_LIMIT {
        json!(value as i64)
    } else {
        json!(value)
    }
}

#[async_trait]
impl Tool for CalculateTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Perform mathematical calculations and evaluate expressions (e.g. '2 + 2', '10 * 5', 'sqrt(16)')."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Mathematical expression to evaluate",
                    "maxLength": MAX_EXPRESSION_CHARS
                }
            },
            "required": ["expression"]
        })
    }

    async fn invoke(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            expression: String,
        }

        let params: Params = parse_params(params)?;
        let value = evaluate(&params.expression)?;

        Ok(ToolResult::success(to_json_number(value))
            .with_detail("expression", params.expression.trim()))
    }
}
