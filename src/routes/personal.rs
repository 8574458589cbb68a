// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Personal dashboard routes.

use crate::db::ActivityFilter;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::routes::{current_user, query_params};
use crate::services::dashboard::{
    self, AiSummaryResponse, ProjectTimeAllocationResponse, TodayActionsResponse,
    UsefulActionsResponse, WeeklyOverviewResponse, TODAY_ACTIONS_LIMIT,
};
use crate::time_utils::{day_window, week_window, WeekWindow};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::sync::Arc;

/// Personal dashboard routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/dashboard/personal/weekly-overview",
            get(get_weekly_overview),
        )
        .route(
            "/api/dashboard/personal/useful-actions",
            get(get_useful_actions),
        )
        .route(
            "/api/dashboard/personal/project-time-allocation",
            get(get_project_time_allocation),
        )
        .route(
            "/api/dashboard/personal/today-actions",
            get(get_today_actions),
        )
        .route("/api/dashboard/personal/ai-summary", get(get_ai_summary))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WeekOffsetQuery {
    #[serde(default)]
    pub week_offset: i32,
}

const WEEK_OUT_OF_RANGE: &str = "Requested week is out of range";

/// Resolve the week `offset` weeks from `now`, rejecting offsets the calendar cannot hold.
pub(crate) fn resolve_week(now: DateTime<Utc>, tz: Tz, offset: i32) -> Result<WeekWindow> {
    week_window(now, tz, offset)
        .ok_or_else(|| AppError::BadRequest(WEEK_OUT_OF_RANGE.to_string()))
}

/// The week before `window`.
pub(crate) fn previous_week(window: &WeekWindow) -> Result<WeekWindow> {
    window
        .shifted(-1)
        .ok_or_else(|| AppError::BadRequest(WEEK_OUT_OF_RANGE.to_string()))
}

// ─── Weekly Overview ─────────────────────────────────────────

async fn get_weekly_overview(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    params: std::result::Result<Query<WeekOffsetQuery>, QueryRejection>,
) -> Result<Json<WeeklyOverviewResponse>> {
    let params = query_params(params)?;
    let user = current_user(&state, &auth).await?;
    let tz = user.time_zone(state.config.default_timezone);
    let window = resolve_week(Utc::now(), tz, params.week_offset)?;

    let events = state
        .db
        .get_activities(&ActivityFilter::for_user(user.user_id).within(window.range()))
        .await?;

    tracing::debug!(
        user_id = user.user_id,
        week_offset = params.week_offset,
        events = events.len(),
        "Weekly overview"
    );

    Ok(Json(dashboard::weekly_overview(&events, &window)))
}

// ─── Useful Actions ──────────────────────────────────────────

async fn get_useful_actions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UsefulActionsResponse>> {
    let user = current_user(&state, &auth).await?;
    let tz = user.time_zone(state.config.default_timezone);
    let window = resolve_week(Utc::now(), tz, 0)?;

    let current = state
        .db
        .count_activities(&ActivityFilter::for_user(user.user_id).within(window.range()))
        .await?;

    // The comparison week is best effort; without it the trend reads as a fresh start.
    let previous = match window.shifted(-1) {
        Some(previous_window) => state
            .db
            .count_activities(
                &ActivityFilter::for_user(user.user_id).within(previous_window.range()),
            )
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(user_id = user.user_id, error = %e, "Failed to count last week's actions");
                0
            }),
        None => 0,
    };

    Ok(Json(dashboard::useful_actions(current, previous, &window)))
}

// ─── Project Time Allocation ─────────────────────────────────

async fn get_project_time_allocation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ProjectTimeAllocationResponse>> {
    let user = current_user(&state, &auth).await?;
    let tz = user.time_zone(state.config.default_timezone);
    let window = resolve_week(Utc::now(), tz, 0)?;

    let events = state
        .db
        .get_activities(&ActivityFilter::for_user(user.user_id).within(window.range()))
        .await?;

    Ok(Json(dashboard::project_time_allocation(&events, &window)))
}

// ─── Today's Actions ─────────────────────────────────────────

async fn get_today_actions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<TodayActionsResponse>> {
    let user = current_user(&state, &auth).await?;
    let tz = user.time_zone(state.config.default_timezone);

    let filter = ActivityFilter {
        ascending: false,
        limit: Some(TODAY_ACTIONS_LIMIT),
        ..ActivityFilter::for_user(user.user_id).within(day_window(Utc::now(), tz))
    };
    let events = state.db.get_activities(&filter).await?;

    Ok(Json(dashboard::today_actions(&events, tz)))
}

// ─── AI Summary ──────────────────────────────────────────────

async fn get_ai_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<AiSummaryResponse>> {
    let user = current_user(&state, &auth).await?;
    let summary = state.db.get_latest_daily_summary(user.user_id).await?;

    Ok(Json(dashboard::ai_summary(summary, Utc::now())))
}
