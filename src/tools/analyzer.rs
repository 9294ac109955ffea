// ABOUTME: AnalyzeDataTool - descriptive statistics, trends, and patterns
// ABOUTME: over a list of numbers, reported as figures plus readable insights.

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ToolError;
use crate::tool::{Tool, ToolResult, parse_params};

pub const MAX_DATA_POINTS: usize = 100_000;

/// Which view of the data to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Statistical,
    Trends,
    Patterns,
}

impl FromStr for AnalysisKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "statistical" | "" => Ok(AnalysisKind::Statistical),
            "trends" => Ok(AnalysisKind::Trends),
            "patterns" => Ok(AnalysisKind::Patterns),
            other => Err(ToolError::InvalidParams(format!(
                "`analysis_type` must be 'statistical', 'trends' or 'patterns', got {other:?}"
            ))),
        }
    }
}

/// Summary figures for a non-empty sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl Statistics {
    /// Compute statistics. Returns `None` for an empty slice.
    pub fn from_data(data: &[f64]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        let count = data.len();
        let sum: f64 = data.iter().sum();
        let mean = sum / count as f64;
        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

        let mut sorted = data.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            count,
            sum,
            mean,
            median,
            min: sorted[0],
            max: sorted[count - 1],
            std_dev: variance.sqrt(),
        })
    }
}

/// Least-squares slope of the values against their index.
fn slope(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    if data.len() < 2 {
        return 0.0;
    }
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = data.iter().sum::<f64>() / n;
    let (num, den) = data
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, y)| {
            let dx = i as f64 - mean_x;
            (num + dx * (y - mean_y), den + dx * dx)
        });
    num / den
}

fn statistical_insights(stats: &Statistics) -> Vec<String> {
    vec![
        format!("Mean: {:.2}", stats.mean),
        format!("Median: {:.2}", stats.median),
        format!("Standard deviation: {:.2}", stats.std_dev),
        format!("Range: {} to {}", stats.min, stats.max),
    ]
}

fn trend_insights(data: &[f64]) -> Vec<String> {
    let slope = slope(data);
    let direction = if slope.abs() < 1e-9 {
        "flat"
    } else if slope > 0.0 {
        "increasing"
    } else {
        "decreasing"
    };
    let mut insights = vec![format!("Trend: {direction} (slope {slope:.2} per step)")];

    let (first, last) = (data[0], data[data.len() - 1]);
    let change = last - first;
    if first != 0.0 {
        insights.push(format!(
            "Change from first to last: {change:+.2} ({:+.1}%)",
            change / first.abs() * 100.0
        ));
    } else {
        insights.push(format!("Change from first to last: {change:+.2}"));
    }
    insights
}

fn pattern_insights(data: &[f64], stats: &Statistics) -> Vec<String> {
    let mut insights = Vec::new();

    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    let (mut best, mut best_run, mut run) = (sorted[0], 1, 1);
    for pair in sorted.windows(2) {
        run = if pair[0] == pair[1] { run + 1 } else { 1 };
        if run > best_run {
            best_run = run;
            best = pair[1];
        }
    }
    if best_run > 1 {
        insights.push(format!("Most frequent value: {best} ({best_run} times)"));
    } else {
        insights.push("All values are distinct".to_string());
    }

    let rising = data.windows(2).all(|w| w[0] < w[1]);
    let falling = data.windows(2).all(|w| w[0] > w[1]);
    insights.push(
        match (data.len() > 1, rising, falling) {
            (true, true, _) => "Values are strictly increasing",
            (true, _, true) => "Values are strictly decreasing",
            _ => "Values are not monotonic",
        }
        .to_string(),
    );

    if stats.std_dev > 0.0 {
        let outliers: Vec<f64> = data
            .iter()
            .copied()
            .filter(|x| ((x - stats.mean) / stats.std_dev).abs() > 2.0)
            .collect();
        if !outliers.is_empty() {
            insights.push(format!(
                "Outliers (more than 2 standard deviations from the mean): {outliers:?}"
            ));
        }
    }
    insights
}

/// Tool for numeric data analysis.
pub struct AnalyzeDataTool;

#[async_trait]
impl Tool for AnalyzeDataTool {
    fn name(&self) -> &str {
        "analyze_data"
    }

    fn description(&self) -> &str {
        "Analyze numerical data and provide statistical insights, trends, or patterns."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "data": {
                    "type": "array",
                    "items": {"type": "number"},
                    "description": "Array of numerical values to analyze"
                },
                "analysis_type": {
                    "type": "string",
                    "enum": ["statistical", "trends", "patterns"],
                    "description": "Type of analysis to perform",
                    "default": "statistical"
                }
            },
            "required": ["data"]
        })
    }

    async fn invoke(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            data: Vec<f64>,
            #[serde(default)]
            analysis_type: Option<String>,
        }

        let params: Params = parse_params(params)?;
        let kind: AnalysisKind = params.analysis_type.as_deref().unwrap_or("").parse()?;
        if params.data.len() > MAX_DATA_POINTS {
            return Err(ToolError::InvalidParams(format!(
                "Data exceeds maximum of {MAX_DATA_POINTS} values (got {})",
                params.data.len()
            )));
        }
        let stats = Statistics::from_data(&params.data)
            .ok_or_else(|| ToolError::InvalidParams("Data cannot be empty".into()))?;

        let insights = match kind {
            AnalysisKind::Statistical => statistical_insights(&stats),
            AnalysisKind::Trends => trend_insights(&params.data),
            AnalysisKind::Patterns => pattern_insights(&params.data, &stats),
        };

        Ok(ToolResult::success(json!({
            "analysis_type": kind,
            "statistics": stats,
            "insights": insights,
        }))
        .with_detail("count", stats.count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insights(result: &ToolResult) -> Vec<String> {
        serde_json::from_value(result.result().unwrap()["insights"].clone()).unwrap()
    }

    #[test]
    fn test_statistics() {
        let stats = Statistics::from_data(&[10.0, 20.0, 30.0, 40.0, 50.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.sum, 150.0);
        assert_eq!(stats.mean, 30.0);
        assert_eq!(stats.median, 30.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 50.0);
        assert!((stats.std_dev - 200f64.sqrt()).abs() < 1e-9);

        let even = Statistics::from_data(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(even.median, 2.5);
        assert!(Statistics::from_data(&[]).is_none());
    }

    #[tokio::test]
    async fn test_analyze_numeric_data() {
        let result = AnalyzeDataTool
            .execute(json!({"data": [10, 20, 30, 40, 50], "analysis_type": "statistical"}))
            .await;

        assert!(result.is_success());
        let insights = insights(&result);
        assert!(insights.iter().any(|i| i.contains("Mean")));
        assert!(insights.contains(&"Mean: 30.00".to_string()));
        assert_eq!(result.result().unwrap()["statistics"]["median"], 30.0);
        assert_eq!(result.details["count"], 5);
    }

    #[tokio::test]
    async fn test_analyze_empty_data() {
        let result = AnalyzeDataTool
            .execute(json!({"data": [], "analysis_type": "statistical"}))
            .await;

        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("Data cannot be empty"));
        assert_eq!(result.details["kind"], "invalid_params");
    }

    #[tokio::test]
    async fn test_analyze_trends() {
        let result = AnalyzeDataTool
            .execute(json!({"data": [50, 40, 30, 20, 10], "analysis_type": "trends"}))
            .await;

        let insights = insights(&result);
        assert_eq!(insights[0], "Trend: decreasing (slope -10.00 per step)");
        assert_eq!(insights[1], "Change from first to last: -40.00 (-80.0%)");
    }

    #[tokio::test]
    async fn test_analyze_patterns() {
        let data = json!([1, 2, 2, 2, 1, 2, 1, 2, 1, 2, 1, 30]);
        let result = AnalyzeDataTool
            .execute(json!({"data": data, "analysis_type": "patterns"}))
            .await;

        let insights = insights(&result);
        assert_eq!(insights[0], "Most frequent value: 2 (6 times)");
        assert_eq!(insights[1], "Values are not monotonic");
        assert!(insights[2].contains("[30.0]"));
    }

    #[tokio::test]
    async fn test_analyze_rejects_bad_input() {
        let unknown = AnalyzeDataTool
            .execute(json!({"data": [1], "analysis_type": "magic"}))
            .await;
        assert!(unknown.error().unwrap().contains("analysis_type"));

        let strings = AnalyzeDataTool.execute(json!({"data": ["a", "b"]})).await;
        assert_eq!(strings.details["kind"], "invalid_params");
    }
}
