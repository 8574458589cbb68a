// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Activity log model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An embedded foreign-key row.
///
/// The REST layer returns a to-one join either as an object or as a
/// one-element array depending on how the relationship was detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Join<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> Join<T> {
    pub fn first(&self) -> Option<&T> {
        match self {
            Join::One(item) => Some(item),
            Join::Many(items) => items.first(),
        }
    }
}

/// Tool referenced by an activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolRef {
    #[serde(default)]
    pub tool_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Action template referenced by an activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateRef {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub action_type: Option<String>,
}

/// Stored activity log row (`activity_log`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub log_id: i64,
    /// Owner (`user_account.user_id`)
    pub user_id: i64,
    /// When the action happened
    #[serde(deserialize_with = "crate::time_utils::deserialize_timestamp")]
    pub event_time: DateTime<Utc>,
    /// Duration in minutes; missing for instantaneous events
    #[serde(default)]
    pub minutes: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Free-form JSON (`showInReport`, `project`, `manual`, ...)
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub tool: Option<Join<ToolRef>>,
    #[serde(default)]
    pub template: Option<Join<TemplateRef>>,
}

impl ActivityLog {
    pub fn tool(&self) -> Option<&ToolRef> {
        self.tool.as_ref().and_then(Join::first)
    }

    pub fn template(&self) -> Option<&TemplateRef> {
        self.template.as_ref().and_then(Join::first)
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.tool().and_then(|t| t.name.as_deref())
    }

    pub fn template_name(&self) -> Option<&str> {
        self.template().and_then(|t| t.display_name.as_deref())
    }

    /// Minutes with a missing value counted as zero.
    pub fn minutes_or_zero(&self) -> i64 {
        self.minutes.unwrap_or(0)
    }

    /// Whether the entry should appear in reports. Defaults to `true`.
    pub fn show_in_report(&self) -> bool {
        !matches!(
            self.metadata.as_ref().and_then(|m| m.get("showInReport")),
            Some(Value::Bool(false))
        )
    }

    /// `metadata.project`, if it is a non-empty string.
    pub fn project(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("project"))
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
    }

    /// Existing metadata with `showInReport` overwritten.
    pub fn metadata_with_show_in_report(&self, show_in_report: bool) -> Value {
        let mut metadata = match &self.metadata {
            Some(Value::Object(map)) => map.clone(),
            _ => serde_json::Map::new(),
        };
        metadata.insert("showInReport".to_string(), Value::Bool(show_in_report));
        Value::Object(metadata)
    }
}

/// Insert payload for a manually logged action.
#[derive(Debug, Clone, Serialize)]
pub struct NewActivityLog {
    pub user_id: i64,
    pub tool_id: Option<i64>,
    pub template_id: Option<i64>,
    pub event_time: String,
    pub minutes: i64,
    pub title: String,
    pub metadata: Value,
    pub status: String,
}
