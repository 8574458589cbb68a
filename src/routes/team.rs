// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Team dashboard routes (manager views).

use crate::db::ActivityFilter;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Team, UserAccount};
use crate::routes::{current_user, query_params};
use crate::routes::personal::{previous_week, resolve_week, WeekOffsetQuery};
use crate::services::team::{
    self, require_manager, require_same_team, require_team, NoTeamStatus,
    TeamAllocationResponse, TeamNameResponse, TeamUsefulActionsResponse,
    TeamWeeklyOverviewResponse, UserWeekLogRow,
};
use crate::time_utils::{full_day_range, parse_date, WeekPreset};
use crate::AppState;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

/// Team routes (require authentication; most require the team manager).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/dashboard/team/name", get(get_team_name))
        .route(
            "/api/dashboard/team/weekly-overview",
            get(get_team_weekly_overview),
        )
        .route(
            "/api/dashboard/team/useful-actions-week",
            get(get_team_useful_actions),
        )
        .route(
            "/api/dashboard/team/project-time-allocation",
            get(get_team_project_allocation),
        )
        .route("/api/dashboard/team/user-week-log", get(get_user_week_log))
}

/// Load the caller's team.
async fn load_team(state: &AppState, user: &UserAccount, no_team: NoTeamStatus) -> Result<Team> {
    let team_id = require_team(user, no_team)?;
    state
        .db
        .get_team(team_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Team not found".to_string()))
}

/// Load the caller's team and insist the caller manages it.
async fn managed_team(
    state: &AppState,
    auth: &AuthUser,
    no_team: NoTeamStatus,
) -> Result<(UserAccount, Team)> {
    let user = current_user(state, auth).await?;
    let team = load_team(state, &user, no_team).await?;

    if let Err(e) = require_manager(&team, &user) {
        tracing::warn!(
            user_id = user.user_id,
            team_id = team.team_id,
            "Non-manager requested a team view"
        );
        return Err(e);
    }
    Ok((user, team))
}

// ─── Team Name ───────────────────────────────────────────────

async fn get_team_name(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<TeamNameResponse>> {
    let user = current_user(&state, &auth).await?;
    let team = load_team(&state, &user, NoTeamStatus::NotFound).await?;

    Ok(Json(team::team_name(&team, &user)))
}

// ─── Weekly Overview ─────────────────────────────────────────

async fn get_team_weekly_overview(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    params: std::result::Result<Query<WeekOffsetQuery>, QueryRejection>,
) -> Result<Json<TeamWeeklyOverviewResponse>> {
    let params = query_params(params)?;
    let (user, team) = managed_team(&state, &auth, NoTeamStatus::NotFound).await?;

    let member_ids: Vec<i64> = state
        .db
        .get_team_members(team.team_id)
        .await?
        .iter()
        .map(|m| m.user_id)
        .collect();
    if member_ids.is_empty() {
        return Ok(Json(TeamWeeklyOverviewResponse::empty(&team.name)));
    }

    let tz = user.time_zone(state.config.default_timezone);
    let window = resolve_week(Utc::now(), tz, params.week_offset)?;
    let previous = previous_week(&window)?;

    let with_tool = |range| ActivityFilter {
        require_tool: true,
        ..ActivityFilter::for_users(&member_ids).within(range)
    };
    let current_filter = with_tool(window.range());
    let previous_filter = with_tool(previous.range());

    let (current_events, previous_events) = tokio::try_join!(
        state.db.get_activities(&current_filter),
        state.db.get_activities(&previous_filter),
    )?;

    tracing::debug!(
        team_id = team.team_id,
        members = member_ids.len(),
        current = current_events.len(),
        previous = previous_events.len(),
        "Team weekly overview"
    );

    Ok(Json(team::team_weekly_overview(
        &team.name,
        &window,
        &current_events,
        &previous,
        &previous_events,
    )))
}

// ─── Useful Actions ──────────────────────────────────────────

async fn get_team_useful_actions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<TeamUsefulActionsResponse>> {
    let (user, team) = managed_team(&state, &auth, NoTeamStatus::NotFound).await?;

    let member_ids: Vec<i64> = state
        .db
        .get_team_members(team.team_id)
        .await?
        .iter()
        .map(|m| m.user_id)
        .collect();
    if member_ids.is_empty() {
        return Ok(Json(team::team_useful_actions(&team.name, 0, 0, None)));
    }

    let tz = user.time_zone(state.config.default_timezone);
    let window = resolve_week(Utc::now(), tz, 0)?;
    let previous = previous_week(&window)?;

    // This week counts everything from Monday on, with no upper bound.
    let this_week = ActivityFilter {
        from: Some(window.range().start),
        ..ActivityFilter::for_users(&member_ids)
    };
    let last_week = ActivityFilter::for_users(&member_ids).within(previous.range());

    let (current, last) = tokio::try_join!(
        state.db.count_activities(&this_week),
        state.db.count_activities(&last_week),
    )?;

    Ok(Json(team::team_useful_actions(
        &team.name,
        current,
        last,
        Some(&window),
    )))
}

// ─── Project Time Allocation ─────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllocationQuery {
    #[serde(default)]
    week_preset: WeekPreset,
}

async fn get_team_project_allocation(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    params: std::result::Result<Query<AllocationQuery>, QueryRejection>,
) -> Result<Json<TeamAllocationResponse>> {
    let params = query_params(params)?;
    let (user, team) = managed_team(&state, &auth, NoTeamStatus::Forbidden).await?;
    let preset = params.week_preset;

    let members = state.db.get_team_members(team.team_id).await?;
    if members.is_empty() {
        return Ok(Json(TeamAllocationResponse {
            team_name: team.name,
            week_preset: None,
            rows: Vec::new(),
        }));
    }
    let member_ids: Vec<i64> = members.iter().map(|m| m.user_id).collect();

    let tz = user.time_zone(state.config.default_timezone);
    let now = Utc::now();
    let current = resolve_week(now, tz, 0)?;
    let bounds = preset.date_bounds(&current);

    let reports = state.db.get_weekly_reports(&member_ids, bounds).await?;

    let fallback_ids = team::members_without_reports(&members, &reports);
    let fallback_events = if fallback_ids.is_empty() {
        Vec::new()
    } else {
        let filter = match bounds {
            Some((start, end)) => {
                ActivityFilter::for_users(&fallback_ids).within(full_day_range(tz, start, end))
            }
            None => ActivityFilter {
                to: Some(now),
                ..ActivityFilter::for_users(&fallback_ids)
            },
        };
        state.db.get_activities(&filter).await?
    };

    tracing::debug!(
        team_id = team.team_id,
        preset = preset.as_str(),
        reports = reports.len(),
        fallback_members = fallback_ids.len(),
        "Team project allocation"
    );

    Ok(Json(team::team_project_allocation(
        &team.name,
        preset,
        &members,
        &reports,
        &fallback_events,
    )))
}

// ─── User Week Log ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserWeekLogQuery {
    user_id: Option<i64>,
    week_start: Option<String>,
    week_end: Option<String>,
}

async fn get_user_week_log(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    params: std::result::Result<Query<UserWeekLogQuery>, QueryRejection>,
) -> Result<Json<Vec<UserWeekLogRow>>> {
    let params = query_params(params)?;
    let (Some(target_id), Some(week_start), Some(week_end)) =
        (params.user_id, params.week_start, params.week_end)
    else {
        return Err(AppError::BadRequest("Missing parameters".to_string()));
    };
    let start = parse_date(&week_start)
        .ok_or_else(|| AppError::BadRequest("Invalid 'weekStart' parameter".to_string()))?;
    let end = parse_date(&week_end)
        .ok_or_else(|| AppError::BadRequest("Invalid 'weekEnd' parameter".to_string()))?;
    if end < start {
        return Err(AppError::BadRequest(
            "'weekEnd' must not be before 'weekStart'".to_string(),
        ));
    }

    let user = current_user(&state, &auth).await?;
    let team_id = require_team(&user, NoTeamStatus::Forbidden)?;

    let (target, team) = tokio::try_join!(
        state.db.get_user(target_id),
        state.db.get_team(team_id),
    )?;

    require_same_team(target.as_ref(), team_id)?;
    match team {
        Some(team) => require_manager(&team, &user)?,
        None => {
            return Err(AppError::Forbidden(
                "Manager privileges required".to_string(),
            ))
        }
    }

    let tz = user.time_zone(state.config.default_timezone);
    let events = state
        .db
        .get_activities(
            &ActivityFilter::for_user(target_id).within(full_day_range(tz, start, end)),
        )
        .await?;

    Ok(Json(team::user_week_log(&events)))
}
