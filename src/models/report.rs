// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Summary and report rows written by the report workflow.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Daily summary row (`daily_summary`), including generated text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub summary_id: i64,
    pub summary_date: NaiveDate,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub total_actions: Option<i64>,
    #[serde(default)]
    pub total_minutes: Option<i64>,
    #[serde(deserialize_with = "crate::time_utils::deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Weekly report row (`weekly_report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub user_id: i64,
    pub week_start: NaiveDate,
    /// `category -> minutes`
    #[serde(default)]
    pub project_time: Option<Value>,
}

impl WeeklyReport {
    /// Project minutes by category, `None` when the report carries none.
    ///
    /// Non-numeric values count as zero.
    pub fn project_minutes(&self) -> Option<BTreeMap<String, i64>> {
        let Some(Value::Object(map)) = &self.project_time else {
            return None;
        };
        Some(
            map.iter()
                .map(|(category, minutes)| (category.clone(), minutes_value(minutes)))
                .collect(),
        )
    }
}

fn minutes_value(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<f64>().map(|f| f.round() as i64).unwrap_or(0),
        _ => 0,
    }
}

/// Active tool offered as a filter option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ToolOption {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub tool_id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_minutes_parses_mixed_values() {
        let report: WeeklyReport = serde_json::from_value(serde_json::json!({
            "user_id": 1,
            "week_start": "2024-06-10",
            "project_time": { "Apollo": 120, "Gemini": "30", "Broken": "x", "Float": 12.6 }
        }))
        .unwrap();

        let minutes = report.project_minutes().unwrap();
        assert_eq!(minutes["Apollo"], 120);
        assert_eq!(minutes["Gemini"], 30);
        assert_eq!(minutes["Broken"], 0);
        assert_eq!(minutes["Float"], 13);
    }

    #[test]
    fn test_project_minutes_none_when_missing() {
        let report: WeeklyReport = serde_json::from_value(serde_json::json!({
            "user_id": 1,
            "week_start": "2024-06-10",
            "project_time": null
        }))
        .unwrap();

        assert!(report.project_minutes().is_none());
    }
}
