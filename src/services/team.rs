// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Team dashboard computations (manager views).

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::AppError;
use crate::models::stats::ToolDayRow;
use crate::models::{ActivityLog, Team, TeamMember, ToolWeekChart, UserAccount, WeeklyReport};
use crate::services::dashboard::percentage_change;
use crate::time_utils::{format_utc_rfc3339, WeekPreset, WeekWindow};

/// Where the caller's team membership is missing, as the views disagree on the status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoTeamStatus {
    NotFound,
    Forbidden,
}

/// Team id of the caller, or the error the calling view reports without one.
pub fn require_team(user: &UserAccount, status: NoTeamStatus) -> Result<i64, AppError> {
    user.team_id.ok_or_else(|| match status {
        NoTeamStatus::NotFound => AppError::NotFound("User is not part of any team".to_string()),
        NoTeamStatus::Forbidden => AppError::Forbidden("Not in a team".to_string()),
    })
}

/// Fail unless `user` manages `team`.
pub fn require_manager(team: &Team, user: &UserAccount) -> Result<(), AppError> {
    if team.is_managed_by(user.user_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Manager privileges required".to_string(),
        ))
    }
}

// ─── Team Name ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TeamNameResponse {
    pub team_name: String,
    pub is_manager: bool,
}

pub fn team_name(team: &Team, user: &UserAccount) -> TeamNameResponse {
    TeamNameResponse {
        team_name: team.name.clone(),
        is_manager: team.is_managed_by(user.user_id),
    }
}

// ─── Weekly Overview ─────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamWeeklyOverviewResponse {
    pub chart_data: Vec<ToolDayRow>,
    pub tools: Vec<String>,
    pub team_name: String,
    pub week_start: Option<String>,
    pub week_end: Option<String>,
}

impl TeamWeeklyOverviewResponse {
    /// Response for a team without active members.
    pub fn empty(team_name: &str) -> Self {
        Self {
            chart_data: Vec::new(),
            tools: Vec::new(),
            team_name: team_name.to_string(),
            week_start: None,
            week_end: None,
        }
    }
}

/// Per-tool daily counts for the selected week against the week before it.
pub fn team_weekly_overview(
    team_name: &str,
    window: &WeekWindow,
    current_events: &[ActivityLog],
    previous_window: &WeekWindow,
    previous_events: &[ActivityLog],
) -> TeamWeeklyOverviewResponse {
    let chart = ToolWeekChart::build(window, current_events, previous_window, previous_events);

    TeamWeeklyOverviewResponse {
        chart_data: chart.rows(),
        tools: chart.tools().to_vec(),
        team_name: team_name.to_string(),
        week_start: Some(window.start_rfc3339()),
        week_end: Some(window.end_rfc3339()),
    }
}

// ─── Useful Actions ──────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TeamUsefulActionsResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_actions: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub previous_week_actions: u64,
    /// Signed, unlike the personal view
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub percentage_change: i64,
    /// Monday of the current week as `YYYY-MM-DD`
    pub week_start: Option<String>,
    pub team_name: String,
}

/// Signed change; 100 when there is no baseline but some activity now.
pub fn team_percentage_change(current: u64, previous: u64) -> i64 {
    match percentage_change(current, previous) {
        Some(change) => change,
        None if current > 0 => 100,
        None => 0,
    }
}

/// `window` is `None` for a team without active members.
pub fn team_useful_actions(
    team_name: &str,
    current: u64,
    previous: u64,
    window: Option<&WeekWindow>,
) -> TeamUsefulActionsResponse {
    TeamUsefulActionsResponse {
        total_actions: current,
        previous_week_actions: previous,
        percentage_change: team_percentage_change(current, previous),
        week_start: window.map(|w| w.start_date().format("%Y-%m-%d").to_string()),
        team_name: team_name.to_string(),
    }
}

// ─── Project Time Allocation ─────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoryMinutes {
    pub category: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub minutes: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MemberAllocation {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub user_id: i64,
    pub user_name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_minutes: i64,
    pub allocations: Vec<CategoryMinutes>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAllocationResponse {
    pub team_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_preset: Option<WeekPreset>,
    pub rows: Vec<MemberAllocation>,
}

/// Members whose minutes must come from activity logs because none of their
/// reports in range carry `project_time`.
pub fn members_without_reports(members: &[TeamMember], reports: &[WeeklyReport]) -> Vec<i64> {
    let reported: HashSet<i64> = reports
        .iter()
        .filter(|r| r.project_minutes().is_some())
        .map(|r| r.user_id)
        .collect();

    members
        .iter()
        .map(|m| m.user_id)
        .filter(|id| !reported.contains(id))
        .collect()
}

/// Category for activity-derived minutes.
///
/// Template display name, else tool name, else `"Uncategorized"`.
pub fn fallback_category(activity: &ActivityLog) -> &str {
    activity
        .template_name()
        .filter(|n| !n.is_empty())
        .or_else(|| activity.tool_name().filter(|n| !n.is_empty()))
        .unwrap_or("Uncategorized")
}

/// Minutes per member and category.
///
/// Report `project_time` wins; `fallback_events` only fill in members that
/// have no report data.
pub fn team_project_allocation(
    team_name: &str,
    preset: WeekPreset,
    members: &[TeamMember],
    reports: &[WeeklyReport],
    fallback_events: &[ActivityLog],
) -> TeamAllocationResponse {
    let mut per_user: HashMap<i64, BTreeMap<String, i64>> = HashMap::new();

    for report in reports {
        let Some(minutes) = report.project_minutes() else {
            continue;
        };
        let totals = per_user.entry(report.user_id).or_default();
        for (category, value) in minutes {
            *totals.entry(category).or_insert(0) += value;
        }
    }

    let fallback_users: HashSet<i64> = members_without_reports(members, reports)
        .into_iter()
        .collect();
    for event in fallback_events
        .iter()
        .filter(|e| fallback_users.contains(&e.user_id))
    {
        *per_user
            .entry(event.user_id)
            .or_default()
            .entry(fallback_category(event).to_string())
            .or_insert(0) += event.minutes_or_zero();
    }

    let mut rows: Vec<MemberAllocation> = members
        .iter()
        .map(|member| {
            let mut allocations: Vec<CategoryMinutes> = per_user
                .remove(&member.user_id)
                .unwrap_or_default()
                .into_iter()
                .map(|(category, minutes)| CategoryMinutes { category, minutes })
                .collect();
            allocations.sort_by(|a, b| b.minutes.cmp(&a.minutes));

            let user_name = if member.name.is_empty() {
                "Unknown".to_string()
            } else {
                member.name.clone()
            };

            MemberAllocation {
                user_id: member.user_id,
                user_name,
                total_minutes: allocations.iter().map(|a| a.minutes).sum(),
                allocations,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes));

    TeamAllocationResponse {
        team_name: team_name.to_string(),
        week_preset: Some(preset),
        rows,
    }
}

// ─── User Week Log ───────────────────────────────────────────

/// One row of a member's week log (snake_case, as the log table expects).
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserWeekLogRow {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub log_id: i64,
    pub event_time: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub minutes: i64,
    pub title: Option<String>,
    pub tool_name: Option<String>,
}

/// Fail unless `target` sits in the caller's team.
pub fn require_same_team(target: Option<&UserAccount>, team_id: i64) -> Result<(), AppError> {
    match target {
        Some(user) if user.team_id == Some(team_id) => Ok(()),
        _ => Err(AppError::Forbidden("Access denied".to_string())),
    }
}

pub fn user_week_log(events: &[ActivityLog]) -> Vec<UserWeekLogRow> {
    events
        .iter()
        .map(|event| UserWeekLogRow {
            log_id: event.log_id,
            event_time: format_utc_rfc3339(event.event_time),
            minutes: event.minutes_or_zero(),
            title: event.title.clone(),
            tool_name: event.tool_name().map(String::from),
        })
        .collect()
}
