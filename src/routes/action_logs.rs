// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Action log routes: listing, report visibility, manual entries and stats.

use crate::db::{ActivityFilter, ActivityPageQuery, SortField};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::stats::activity_dates;
use crate::models::NewActivityLog;
use crate::routes::personal::resolve_week;
use crate::routes::{current_user, json_body, query_params};
use crate::services::dashboard::{
    self, ActionLogListResponse, ActionLogStats, ManualEntryResponse, MessageResponse,
};
use crate::time_utils::{format_utc_rfc3339, parse_timestamp};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use validator::{Validate, ValidationError};

/// Action log routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/dashboard/action-logs",
            get(list_action_logs).patch(update_show_in_report),
        )
        .route("/api/dashboard/action-logs/manual", post(create_manual_entry))
        .route("/api/dashboard/action-logs/stats", get(get_stats))
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ActionLogsQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    page: u32,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    page_size: u32,
    /// Case-insensitive title substring
    #[validate(length(max = 200))]
    search: Option<String>,
    /// Tool id or "all"
    tool: Option<String>,
    /// Status or "all"
    status: Option<String>,
    #[serde(default)]
    sort_by: SortField,
    #[serde(default)]
    sort_order: SortOrder,
}

fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    10
}

/// `None` for an absent or "all" filter value.
fn specific(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

impl ActionLogsQuery {
    fn into_page_query(self) -> Result<ActivityPageQuery> {
        self.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let tool_id = specific(self.tool.as_deref())
            .map(|raw| {
                raw.parse::<i64>().map_err(|_| {
                    AppError::BadRequest("Invalid 'tool' parameter: must be an id or 'all'".to_string())
                })
            })
            .transpose()?;

        Ok(ActivityPageQuery {
            page: self.page,
            page_size: self.page_size,
            tool_id,
            status: specific(self.status.as_deref()).map(String::from),
            search: self.search,
            sort_by: self.sort_by,
            ascending: matches!(self.sort_order, SortOrder::Asc),
        })
    }
}

async fn list_action_logs(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    params: std::result::Result<Query<ActionLogsQuery>, QueryRejection>,
) -> Result<Json<ActionLogListResponse>> {
    let page = query_params(params)?.into_page_query()?;

    let user = current_user(&state, &auth).await?;
    let tz = user.time_zone(state.config.default_timezone);

    let (rows, total) = state.db.list_activity_page(user.user_id, &page).await?;

    // The filter dropdown is cosmetic; an empty list is better than a failed page.
    let tools = state.db.list_active_tools().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to fetch tools for filters");
        Vec::new()
    });

    Ok(Json(dashboard::action_log_page(
        &rows,
        total,
        page.page,
        page.page_size,
        tools,
        tz,
    )))
}

// ─── Show In Report ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateShowInReportRequest {
    log_id: i64,
    show_in_report: bool,
}

async fn update_show_in_report(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    payload: std::result::Result<Json<UpdateShowInReportRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>> {
    let body = json_body(payload)?;
    if body.log_id <= 0 {
        return Err(AppError::BadRequest("Invalid request".to_string()));
    }

    let user = current_user(&state, &auth).await?;

    let activity = state
        .db
        .get_user_activity(user.user_id, body.log_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))?;

    let metadata = activity.metadata_with_show_in_report(body.show_in_report);
    state
        .db
        .update_activity_metadata(user.user_id, body.log_id, &metadata)
        .await?;

    tracing::info!(
        user_id = user.user_id,
        log_id = body.log_id,
        show_in_report = body.show_in_report,
        "Updated report visibility"
    );

    Ok(Json(MessageResponse {
        message: "Activity updated successfully".to_string(),
    }))
}

// ─── Manual Entry ────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct ManualEntryRequest {
    #[validate(length(max = 500), custom(function = "validate_not_blank"))]
    title: String,
    tool_id: Option<i64>,
    #[validate(custom(function = "validate_event_time"))]
    event_time: String,
    /// At most one day
    #[validate(range(min = 1, max = 1440))]
    minutes: i64,
}

fn validate_not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn validate_event_time(value: &str) -> std::result::Result<(), ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("rfc3339"))
}

impl ManualEntryRequest {
    fn into_new_activity(self, user_id: i64) -> Result<NewActivityLog> {
        self.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let event_time: DateTime<Utc> = parse_timestamp(&self.event_time)
            .ok_or_else(|| AppError::BadRequest("Invalid eventTime".to_string()))?;

        Ok(NewActivityLog {
            user_id,
            tool_id: self.tool_id,
            template_id: None,
            event_time: format_utc_rfc3339(event_time),
            minutes: self.minutes,
            title: self.title.trim().to_string(),
            metadata: serde_json::json!({ "manual": true, "showInReport": true }),
            status: "completed".to_string(),
        })
    }
}

async fn create_manual_entry(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    payload: std::result::Result<Json<ManualEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ManualEntryResponse>)> {
    let request = json_body(payload)?;
    // Validate before touching the database.
    let mut entry = request.into_new_activity(0)?;

    let user = current_user(&state, &auth).await?;
    entry.user_id = user.user_id;

    let activity = state.db.insert_activity(&entry).await?;

    Ok((
        StatusCode::CREATED,
        Json(ManualEntryResponse {
            message: "Action log created successfully".to_string(),
            activity,
        }),
    ))
}

// ─── Stats ───────────────────────────────────────────────────

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ActionLogStats>> {
    let user = current_user(&state, &auth).await?;
    let tz = user.time_zone(state.config.default_timezone);
    let now = Utc::now();
    let window = resolve_week(now, tz, 0)?;

    let week = ActivityFilter::for_user(user.user_id).within(window.range());

    // Each figure degrades to its empty value on its own, so one failing
    // query does not blank the whole panel.
    let total = state.db.count_activities(&week).await.unwrap_or_else(|e| {
        tracing::warn!(user_id = user.user_id, error = %e, "Failed to count weekly actions");
        0
    });

    let tool_filter = ActivityFilter {
        require_tool: true,
        ..week
    };
    let tool_events = state
        .db
        .get_activities(&tool_filter)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(user_id = user.user_id, error = %e, "Failed to fetch tool usage");
            Vec::new()
        });

    let history = state
        .db
        .get_activities(&ActivityFilter::for_user(user.user_id))
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(user_id = user.user_id, error = %e, "Failed to fetch streak history");
            Vec::new()
        });

    Ok(Json(dashboard::action_log_stats(
        total,
        &tool_events,
        activity_dates(&history, tz),
        &window,
        now,
    )))
}
