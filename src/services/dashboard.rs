// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Personal dashboard computations.
//!
//! Every function here works on rows that were already fetched plus an
//! explicit `now` and time zone, so the handlers stay thin and the numbers
//! can be checked without a database.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::stats::longest_streak;
use crate::models::{ActivityLog, DailySummary, ToolOption, WeekBuckets};
use crate::time_utils::{
    days_elapsed, format_clock_time, format_hours_minutes, format_short_date, format_utc_rfc3339,
    round_tenths, WeekWindow,
};

/// Colour classes assigned to projects in first-seen order.
pub const PROJECT_COLORS: [&str; 10] = [
    "bg-primary",
    "bg-green-500",
    "bg-blue-500",
    "bg-purple-500",
    "bg-orange-500",
    "bg-pink-500",
    "bg-yellow-500",
    "bg-indigo-500",
    "bg-red-500",
    "bg-teal-500",
];

/// Maximum number of rows returned by the today view.
pub const TODAY_ACTIONS_LIMIT: u64 = 10;

// ─── Weekly Overview ─────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeeklySummary {
    pub total_actions: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_minutes: i64,
    pub total_hours: f64,
    pub average_actions_per_day: f64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub average_minutes_per_day: i64,
    pub week_start: String,
    pub week_end: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyOverviewResponse {
    pub chart_data: WeekBuckets,
    pub summary: WeeklySummary,
}

/// Day buckets for `window` plus totals derived from them.
pub fn weekly_overview(events: &[ActivityLog], window: &WeekWindow) -> WeeklyOverviewResponse {
    let chart_data = WeekBuckets::from_events(events, window);

    let total_actions = chart_data.total_count();
    let total_minutes = chart_data.total_minutes();

    let summary = WeeklySummary {
        total_actions,
        total_minutes,
        total_hours: round_tenths(total_minutes as f64 / 60.0),
        average_actions_per_day: round_tenths(f64::from(total_actions) / 7.0),
        average_minutes_per_day: (total_minutes as f64 / 7.0).round() as i64,
        week_start: window.start_rfc3339(),
        week_end: window.end_rfc3339(),
    };

    WeeklyOverviewResponse {
        chart_data,
        summary,
    }
}

// ─── Useful Actions ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UsefulActionsResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_actions: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub last_week_actions: u64,
    /// Magnitude only; direction is carried by `trend`
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub percentage_change: i64,
    pub trend: Trend,
    pub week_start: String,
    pub week_end: String,
}

/// Signed week-over-week change in percent, `None` when there is no baseline.
pub fn percentage_change(current: u64, previous: u64) -> Option<i64> {
    if previous == 0 {
        return None;
    }
    let change = (current as f64 - previous as f64) / previous as f64 * 100.0;
    // Halves round toward positive infinity, so -87.5 becomes -87.
    Some((change + 0.5).floor() as i64)
}

/// This week's count compared against last week's.
pub fn useful_actions(current: u64, previous: u64, window: &WeekWindow) -> UsefulActionsResponse {
    let (change, trend) = match percentage_change(current, previous) {
        Some(change) if change > 0 => (change, Trend::Up),
        Some(change) if change < 0 => (change, Trend::Down),
        Some(change) => (change, Trend::Neutral),
        None if current > 0 => (0, Trend::Up),
        None => (0, Trend::Neutral),
    };

    UsefulActionsResponse {
        total_actions: current,
        last_week_actions: previous,
        percentage_change: change.abs(),
        trend,
        week_start: window.start_rfc3339(),
        week_end: window.end_rfc3339(),
    }
}

// ─── Project Time Allocation ─────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProjectAllocation {
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_minutes: i64,
    pub time: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub hours: i64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub minutes: i64,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAllocationSummary {
    pub total_projects: usize,
    pub total_minutes: i64,
    pub total_time: String,
    pub week_start: String,
    pub week_end: String,
}

#[derive(Debug, Serialize)]
pub struct ProjectTimeAllocationResponse {
    pub projects: Vec<ProjectAllocation>,
    pub summary: ProjectAllocationSummary,
}

/// Category an activity's minutes are booked under.
///
/// `metadata.project`, else a non-empty title, else `"Uncategorized"`.
pub fn project_category(activity: &ActivityLog) -> &str {
    activity
        .project()
        .or_else(|| activity.title.as_deref().filter(|t| !t.is_empty()))
        .unwrap_or("Uncategorized")
}

/// Minutes per project for the events in `window`, largest first.
pub fn project_time_allocation(
    events: &[ActivityLog],
    window: &WeekWindow,
) -> ProjectTimeAllocationResponse {
    // Insertion order decides colours, so keep a Vec rather than a map.
    let mut totals: Vec<(String, i64)> = Vec::new();
    for event in events.iter().filter(|e| window.contains(e.event_time)) {
        let category = project_category(event);
        match totals.iter_mut().find(|(name, _)| name == category) {
            Some((_, minutes)) => *minutes += event.minutes_or_zero(),
            None => totals.push((category.to_string(), event.minutes_or_zero())),
        }
    }

    let mut projects: Vec<ProjectAllocation> = totals
        .into_iter()
        .enumerate()
        .map(|(index, (name, total_minutes))| ProjectAllocation {
            name,
            total_minutes,
            time: format_hours_minutes(total_minutes),
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
            color: PROJECT_COLORS[index % PROJECT_COLORS.len()],
        })
        .collect();
    // Stable sort keeps first-seen order among equal totals.
    projects.sort_by(|a, b| b.total_minutes.cmp(&a.total_minutes));

    let total_minutes = projects.iter().map(|p| p.total_minutes).sum();
    let summary = ProjectAllocationSummary {
        total_projects: projects.len(),
        total_minutes,
        total_time: format_hours_minutes(total_minutes),
        week_start: window.start_rfc3339(),
        week_end: window.end_rfc3339(),
    };

    ProjectTimeAllocationResponse { projects, summary }
}

// ─── Today's Actions ─────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TodayAction {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub log_id: i64,
    pub title: String,
    pub time: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub minutes: i64,
    pub status: Option<String>,
    pub tool_name: Option<String>,
    pub tool_category: Option<String>,
    pub action_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodaySummary {
    pub total_actions: usize,
    pub total_minutes: i64,
    pub total_hours: i64,
    pub remaining_minutes: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayActionsResponse {
    pub has_actions: bool,
    pub actions: Vec<TodayAction>,
    pub summary: TodaySummary,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Format today's (already limited, newest first) events.
pub fn today_actions(events: &[ActivityLog], tz: Tz) -> TodayActionsResponse {
    let actions: Vec<TodayAction> = events
        .iter()
        .map(|event| {
            let tool = event.tool();
            let template = event.template();
            TodayAction {
                log_id: event.log_id,
                title: non_empty(event.title.as_deref())
                    .or_else(|| non_empty(event.template_name()))
                    .unwrap_or("Activity")
                    .to_string(),
                time: format_clock_time(event.event_time, tz),
                minutes: event.minutes_or_zero(),
                status: event.status.clone(),
                tool_name: tool.and_then(|t| non_empty(t.name.as_deref())).map(String::from),
                tool_category: tool
                    .and_then(|t| non_empty(t.category.as_deref()))
                    .map(String::from),
                action_type: template
                    .and_then(|t| non_empty(t.action_type.as_deref()))
                    .map(String::from),
            }
        })
        .collect();

    let total_minutes: i64 = actions.iter().map(|a| a.minutes).sum();
    TodayActionsResponse {
        has_actions: !actions.is_empty(),
        summary: TodaySummary {
            total_actions: actions.len(),
            total_minutes,
            total_hours: total_minutes / 60,
            remaining_minutes: total_minutes % 60,
        },
        actions,
    }
}

// ─── AI Summary ──────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AiSummary {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub summary_id: i64,
    pub summary_date: String,
    pub ai_summary: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub total_actions: Option<i64>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub total_minutes: Option<i64>,
    pub time_ago: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSummaryResponse {
    pub has_summary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<AiSummary>,
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{} {} ago", count, unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// Relative age of a summary: whole days, else whole hours, else "Today".
pub fn time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let hours = now.signed_duration_since(created_at).num_hours();
    let days = hours / 24;

    if days > 0 {
        plural(days, "day")
    } else if hours > 0 {
        plural(hours, "hour")
    } else {
        "Today".to_string()
    }
}

pub fn ai_summary(summary: Option<DailySummary>, now: DateTime<Utc>) -> AiSummaryResponse {
    let Some(summary) = summary else {
        return AiSummaryResponse {
            has_summary: false,
            summary: None,
        };
    };

    AiSummaryResponse {
        has_summary: true,
        summary: Some(AiSummary {
            summary_id: summary.summary_id,
            summary_date: format_short_date(summary.summary_date),
            time_ago: time_ago(summary.created_at, now),
            ai_summary: summary.ai_summary,
            total_actions: summary.total_actions,
            total_minutes: summary.total_minutes,
        }),
    }
}

// ─── Action Log Stats ────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActionLogStats {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_actions_this_week: u64,
    pub average_actions_per_day: f64,
    pub top_used_tool: String,
    pub longest_streak_days: u32,
}

/// Tool name with the most events; the first one seen wins ties.
pub fn top_used_tool(events: &[ActivityLog]) -> Option<String> {
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for name in events.iter().filter_map(|e| non_empty(e.tool_name())) {
        match counts.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }

    let mut best: Option<(&str, u32)> = None;
    for (name, count) in counts {
        if best.map_or(true, |(_, max)| count > max) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.to_string())
}

/// Headline numbers for the action log page.
///
/// `week_tool_events` are this week's events that have a tool attached;
/// `activity_days` are the local dates of all of the user's events.
pub fn action_log_stats(
    total_this_week: u64,
    week_tool_events: &[ActivityLog],
    activity_days: BTreeSet<NaiveDate>,
    window: &WeekWindow,
    now: DateTime<Utc>,
) -> ActionLogStats {
    let average_actions_per_day = if total_this_week == 0 {
        0.0
    } else {
        round_tenths(total_this_week as f64 / f64::from(days_elapsed(window, now)))
    };

    ActionLogStats {
        total_actions_this_week: total_this_week,
        average_actions_per_day,
        top_used_tool: top_used_tool(week_tool_events).unwrap_or_else(|| "N/A".to_string()),
        longest_streak_days: longest_streak(activity_days),
    }
}

// ─── Action Log Listing ──────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActionLogRow {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub log_id: i64,
    pub date: String,
    pub time: String,
    pub date_time: String,
    pub tool: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub tool_id: Option<i64>,
    pub tool_category: Option<String>,
    pub action_description: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub minutes: i64,
    pub status: Option<String>,
    pub show_in_report: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct ActionLogFilters {
    pub tools: Vec<ToolOption>,
}

#[derive(Debug, Serialize)]
pub struct ActionLogListResponse {
    pub activities: Vec<ActionLogRow>,
    pub pagination: Pagination,
    pub filters: ActionLogFilters,
}

pub fn action_log_row(activity: &ActivityLog, tz: Tz) -> ActionLogRow {
    let tool = activity.tool();
    let local = activity.event_time.with_timezone(&tz);

    ActionLogRow {
        log_id: activity.log_id,
        date: format_short_date(local.date_naive()),
        time: format_clock_time(activity.event_time, tz),
        date_time: format_utc_rfc3339(activity.event_time),
        tool: non_empty(activity.tool_name())
            .unwrap_or("Unknown")
            .to_string(),
        tool_id: tool.and_then(|t| t.tool_id),
        tool_category: tool
            .and_then(|t| non_empty(t.category.as_deref()))
            .map(String::from),
        action_description: non_empty(activity.title.as_deref())
            .or_else(|| non_empty(activity.template_name()))
            .unwrap_or("No description")
            .to_string(),
        minutes: activity.minutes_or_zero(),
        status: activity.status.clone(),
        show_in_report: activity.show_in_report(),
    }
}

/// Assemble one listing page.
pub fn action_log_page(
    rows: &[ActivityLog],
    total: u64,
    page: u32,
    page_size: u32,
    tools: Vec<ToolOption>,
    tz: Tz,
) -> ActionLogListResponse {
    let total_pages = if page_size == 0 {
        0
    } else {
        total.div_ceil(u64::from(page_size))
    };

    ActionLogListResponse {
        activities: rows.iter().map(|row| action_log_row(row, tz)).collect(),
        pagination: Pagination {
            page,
            page_size,
            total,
            total_pages,
        },
        filters: ActionLogFilters { tools },
    }
}

/// Plain confirmation body for write endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ManualEntryResponse {
    pub message: String,
    pub activity: ActivityLog,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::fixtures::{activity, with_tool};
    use crate::models::{Join, TemplateRef};
    use crate::time_utils::{parse_timestamp, week_window};

    fn utc(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    fn june_week() -> WeekWindow {
        week_window(utc("2024-06-12T12:00:00Z"), Tz::UTC, 0).unwrap()
    }

    fn titled(mut event: ActivityLog, title: &str) -> ActivityLog {
        event.title = Some(title.to_string());
        event
    }

    #[test]
    fn test_weekly_overview_summary_from_buckets() {
        let events = vec![
            activity(1, "2024-06-10T09:00:00Z", Some(30)),
            activity(2, "2024-06-10T14:00:00Z", Some(15)),
            activity(3, "2024-06-12T10:00:00Z", Some(60)),
        ];

        let overview = weekly_overview(&events, &june_week());
        let summary = &overview.summary;

        assert_eq!(summary.total_actions, 3);
        assert_eq!(summary.total_minutes, 105);
        assert_eq!(summary.total_hours, 1.8);
        assert_eq!(summary.average_actions_per_day, 0.4);
        assert_eq!(summary.average_minutes_per_day, 15);
        assert_eq!(summary.week_start, "2024-06-10T00:00:00.000Z");
        assert_eq!(summary.week_end, "2024-06-16T23:59:59.999Z");

        let json = serde_json::to_value(&overview).unwrap();
        assert_eq!(json["chartData"][0]["actions"], 2);
        assert_eq!(json["summary"]["averageActionsPerDay"], 0.4);
    }

    #[test]
    fn test_weekly_overview_empty_week() {
        let overview = weekly_overview(&[], &june_week());

        assert_eq!(overview.summary.total_actions, 0);
        assert_eq!(overview.summary.total_hours, 0.0);
        assert_eq!(overview.chart_data.days().len(), 7);
    }

    #[test]
    fn test_useful_actions_trend() {
        let window = june_week();

        let up = useful_actions(15, 10, &window);
        assert_eq!((up.percentage_change, up.trend), (50, Trend::Up));

        let down = useful_actions(5, 10, &window);
        assert_eq!((down.percentage_change, down.trend), (50, Trend::Down));

        let flat = useful_actions(10, 10, &window);
        assert_eq!((flat.percentage_change, flat.trend), (0, Trend::Neutral));

        let fresh = useful_actions(3, 0, &window);
        assert_eq!((fresh.percentage_change, fresh.trend), (0, Trend::Up));

        let half = useful_actions(1, 8, &window);
        assert_eq!((half.percentage_change, half.trend), (87, Trend::Down));

        let idle = useful_actions(0, 0, &window);
        assert_eq!((idle.percentage_change, idle.trend), (0, Trend::Neutral));

        let json = serde_json::to_value(&down).unwrap();
        assert_eq!(json["trend"], "down");
        assert_eq!(json["lastWeekActions"], 10);
    }

    #[test]
    fn test_percentage_change_rounds() {
        assert_eq!(percentage_change(1, 3), Some(-67));
        assert_eq!(percentage_change(2, 3), Some(-33));
        assert_eq!(percentage_change(1, 8), Some(-87));
        assert_eq!(percentage_change(9, 8), Some(13));
        assert_eq!(percentage_change(4, 0), None);
    }

    #[test]
    fn test_project_category_fallbacks() {
        let mut event = activity(1, "2024-06-10T09:00:00Z", Some(10));
        assert_eq!(project_category(&event), "Uncategorized");

        event.title = Some("Write docs".to_string());
        assert_eq!(project_category(&event), "Write docs");

        event.metadata = Some(serde_json::json!({ "project": "Apollo" }));
        assert_eq!(project_category(&event), "Apollo");
    }

    #[test]
    fn test_project_allocation_sorted_with_first_seen_colors() {
        let events = vec![
            titled(activity(1, "2024-06-10T09:00:00Z", Some(20)), "Small"),
            titled(activity(2, "2024-06-11T09:00:00Z", Some(90)), "Big"),
            titled(activity(3, "2024-06-12T09:00:00Z", Some(5)), "Small"),
            activity(4, "2024-06-13T09:00:00Z", None),
        ];

        let allocation = project_time_allocation(&events, &june_week());
        let names: Vec<_> = allocation.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Big", "Small", "Uncategorized"]);

        let big = &allocation.projects[0];
        assert_eq!(big.color, "bg-green-500");
        assert_eq!((big.hours, big.minutes), (1, 30));
        assert_eq!(big.time, "1h 30mins");
        assert_eq!(allocation.projects[1].color, "bg-primary");
        assert_eq!(allocation.projects[1].total_minutes, 25);

        assert_eq!(allocation.summary.total_projects, 3);
        assert_eq!(allocation.summary.total_minutes, 115);
        assert_eq!(allocation.summary.total_time, "1h 55mins");
    }

    #[test]
    fn test_project_colors_wrap_around() {
        let events: Vec<_> = (0..11)
            .map(|i| titled(activity(i, "2024-06-10T09:00:00Z", Some(100 - i)), &format!("P{i}")))
            .collect();

        let allocation = project_time_allocation(&events, &june_week());
        assert_eq!(allocation.projects[10].name, "P10");
        assert_eq!(allocation.projects[10].color, "bg-primary");
    }

    #[test]
    fn test_today_actions_formatting() {
        let mut first = with_tool(activity(1, "2024-06-12T21:05:00Z", None), "GitHub");
        first.template = Some(Join::Many(vec![TemplateRef {
            display_name: Some("Code review".to_string()),
            action_type: Some("review".to_string()),
        }]));
        let second = titled(activity(2, "2024-06-12T08:00:00Z", Some(75)), "Standup");

        let today = today_actions(&[first, second], Tz::UTC);

        assert!(today.has_actions);
        assert_eq!(today.actions[0].title, "Code review");
        assert_eq!(today.actions[0].time, "09:05 PM");
        assert_eq!(today.actions[0].minutes, 0);
        assert_eq!(today.actions[0].tool_name.as_deref(), Some("GitHub"));
        assert_eq!(today.actions[0].action_type.as_deref(), Some("review"));
        assert_eq!(today.actions[1].title, "Standup");
        assert_eq!(today.actions[1].tool_name, None);

        assert_eq!(today.summary.total_actions, 2);
        assert_eq!(today.summary.total_minutes, 75);
        assert_eq!(today.summary.total_hours, 1);
        assert_eq!(today.summary.remaining_minutes, 15);
    }

    #[test]
    fn test_today_actions_title_fallback_and_empty() {
        let bare = activity(1, "2024-06-12T09:00:00Z", Some(5));
        assert_eq!(today_actions(&[bare], Tz::UTC).actions[0].title, "Activity");

        let empty = today_actions(&[], Tz::UTC);
        assert!(!empty.has_actions);
        assert_eq!(empty.summary.total_actions, 0);
    }

    #[test]
    fn test_time_ago() {
        let now = utc("2024-06-12T12:00:00Z");

        assert_eq!(time_ago(utc("2024-06-10T11:00:00Z"), now), "2 days ago");
        assert_eq!(time_ago(utc("2024-06-11T11:00:00Z"), now), "1 day ago");
        assert_eq!(time_ago(utc("2024-06-12T09:30:00Z"), now), "2 hours ago");
        assert_eq!(time_ago(utc("2024-06-12T10:59:00Z"), now), "1 hour ago");
        assert_eq!(time_ago(utc("2024-06-12T11:30:00Z"), now), "Today");
    }

    #[test]
    fn test_ai_summary_shapes() {
        let now = utc("2024-06-12T12:00:00Z");

        let none = serde_json::to_value(ai_summary(None, now)).unwrap();
        assert_eq!(none, serde_json::json!({ "hasSummary": false }));

        let summary = DailySummary {
            summary_id: 9,
            summary_date: NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(),
            ai_summary: Some("Shipped the release.".to_string()),
            total_actions: Some(4),
            total_minutes: Some(180),
            created_at: utc("2024-06-11T18:00:00Z"),
        };
        let json = serde_json::to_value(ai_summary(Some(summary), now)).unwrap();
        assert_eq!(json["hasSummary"], true);
        assert_eq!(json["summary"]["summaryDate"], "Jun 11, 2024");
        assert_eq!(json["summary"]["timeAgo"], "18 hours ago");
        assert_eq!(json["summary"]["aiSummary"], "Shipped the release.");
    }

    #[test]
    fn test_top_used_tool_first_seen_wins_ties() {
        let events = vec![
            with_tool(activity(1, "2024-06-10T09:00:00Z", None), "Figma"),
            with_tool(activity(2, "2024-06-10T10:00:00Z", None), "GitHub"),
            with_tool(activity(3, "2024-06-11T10:00:00Z", None), "GitHub"),
            with_tool(activity(4, "2024-06-11T11:00:00Z", None), "Figma"),
        ];
        assert_eq!(top_used_tool(&events).as_deref(), Some("Figma"));
        assert_eq!(top_used_tool(&events[1..]).as_deref(), Some("GitHub"));
        assert_eq!(top_used_tool(&[]), None);
    }

    #[test]
    fn test_action_log_stats() {
        let window = june_week();
        let now = utc("2024-06-12T15:30:00Z");
        let tool_events = vec![with_tool(activity(1, "2024-06-10T09:00:00Z", None), "GitHub")];
        let days: BTreeSet<NaiveDate> = ["2024-06-10", "2024-06-11", "2024-06-12", "2024-06-14"]
            .iter()
            .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap())
            .collect();

        let stats = action_log_stats(7, &tool_events, days, &window, now);
        assert_eq!(stats.total_actions_this_week, 7);
        assert_eq!(stats.average_actions_per_day, 2.3);
        assert_eq!(stats.top_used_tool, "GitHub");
        assert_eq!(stats.longest_streak_days, 3);

        let idle = action_log_stats(0, &[], BTreeSet::new(), &window, now);
        assert_eq!(idle.average_actions_per_day, 0.0);
        assert_eq!(idle.top_used_tool, "N/A");
        assert_eq!(idle.longest_streak_days, 0);
    }

    #[test]
    fn test_action_log_row_fallbacks() {
        let mut event = activity(5, "2024-06-12T21:05:00Z", None);
        event.metadata = Some(serde_json::json!({ "showInReport": false }));

        let row = action_log_row(&event, Tz::UTC);
        assert_eq!(row.tool, "Unknown");
        assert_eq!(row.tool_id, None);
        assert_eq!(row.action_description, "No description");
        assert_eq!(row.date, "Jun 12, 2024");
        assert_eq!(row.time, "09:05 PM");
        assert_eq!(row.date_time, "2024-06-12T21:05:00.000Z");
        assert!(!row.show_in_report);

        let row = action_log_row(&with_tool(titled(event, "Deploy"), "GitHub"), Tz::UTC);
        assert_eq!(row.tool, "GitHub");
        assert_eq!(row.tool_id, Some(1));
        assert_eq!(row.action_description, "Deploy");
    }

    #[test]
    fn test_action_log_page_totals() {
        let rows = vec![activity(1, "2024-06-12T09:00:00Z", Some(5))];
        let page = action_log_page(&rows, 21, 3, 10, Vec::new(), Tz::UTC);

        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.activities.len(), 1);

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pagination"]["pageSize"], 10);
        assert_eq!(json["activities"][0]["logId"], 1);
        assert_eq!(json["filters"]["tools"], serde_json::json!([]));

        let empty = action_log_page(&[], 0, 1, 10, Vec::new(), Tz::UTC);
        assert_eq!(empty.pagination.total_pages, 0);
    }
}
