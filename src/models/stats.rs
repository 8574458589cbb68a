// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Weekly chart aggregates and streak counting.
//!
//! These are rebuilt from the fetched activity rows on every request; none
//! of them are persisted.

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::ActivityLog;
use crate::time_utils::{monday_index, WeekWindow, WEEKDAY_LABELS};

/// Per-day accumulator for the weekly chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DayBucket {
    pub day: &'static str,
    /// Number of logged actions
    #[serde(rename = "actions")]
    pub count: u32,
    /// Summed duration
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub minutes: i64,
}

/// Seven day buckets in Monday-first order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WeekBuckets {
    days: [DayBucket; 7],
}

impl Default for WeekBuckets {
    fn default() -> Self {
        Self {
            days: WEEKDAY_LABELS.map(|day| DayBucket {
                day,
                count: 0,
                minutes: 0,
            }),
        }
    }
}

impl WeekBuckets {
    /// Aggregate events into the day buckets of `window`.
    ///
    /// Events outside the window are not assigned to any bucket. A missing
    /// duration adds zero minutes but still counts as an action.
    pub fn from_events<'a>(
        events: impl IntoIterator<Item = &'a ActivityLog>,
        window: &WeekWindow,
    ) -> Self {
        let tz = window.timezone();
        let mut buckets = Self::default();

        for event in events {
            if !window.contains(event.event_time) {
                continue;
            }
            let index = monday_index(event.event_time.with_timezone(&tz).weekday());
            let bucket = &mut buckets.days[index];
            bucket.count += 1;
            bucket.minutes += event.minutes_or_zero();
        }

        buckets
    }

    pub fn days(&self) -> &[DayBucket; 7] {
        &self.days
    }

    pub fn total_count(&self) -> u32 {
        self.days.iter().map(|d| d.count).sum()
    }

    pub fn total_minutes(&self) -> i64 {
        self.days.iter().map(|d| d.minutes).sum()
    }
}

/// One chart row: the day label plus `<tool>_current` / `<tool>_last` counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDayRow {
    pub day: &'static str,
    #[serde(flatten)]
    pub counts: BTreeMap<String, u32>,
}

/// Per-tool daily counts for a week compared against another week.
#[derive(Debug, Clone, Default)]
pub struct ToolWeekChart {
    tools: Vec<String>,
    current: [BTreeMap<String, u32>; 7],
    previous: [BTreeMap<String, u32>; 7],
}

impl ToolWeekChart {
    /// Count tool usage per day for the selected week and its comparison week.
    ///
    /// Events without a tool name are skipped. Tools are listed in the order
    /// they are first seen, selected week first.
    pub fn build(
        current_window: &WeekWindow,
        current_events: &[ActivityLog],
        previous_window: &WeekWindow,
        previous_events: &[ActivityLog],
    ) -> Self {
        let mut chart = Self::default();
        chart.tally(current_window, current_events, true);
        chart.tally(previous_window, previous_events, false);
        chart
    }

    fn tally(&mut self, window: &WeekWindow, events: &[ActivityLog], is_current: bool) {
        let tz = window.timezone();
        for event in events {
            let Some(tool) = event.tool_name().filter(|t| !t.is_empty()) else {
                continue;
            };
            if !window.contains(event.event_time) {
                continue;
            }
            if !self.tools.iter().any(|t| t == tool) {
                self.tools.push(tool.to_string());
            }

            let index = monday_index(event.event_time.with_timezone(&tz).weekday());
            let days = if is_current {
                &mut self.current
            } else {
                &mut self.previous
            };
            *days[index].entry(tool.to_string()).or_insert(0) += 1;
        }
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    /// Zero-filled chart rows, Monday first.
    pub fn rows(&self) -> Vec<ToolDayRow> {
        WEEKDAY_LABELS
            .iter()
            .enumerate()
            .map(|(index, &day)| {
                let mut counts = BTreeMap::new();
                for tool in &self.tools {
                    let current = self.current[index].get(tool).copied().unwrap_or(0);
                    let previous = self.previous[index].get(tool).copied().unwrap_or(0);
                    counts.insert(format!("{tool}_current"), current);
                    counts.insert(format!("{tool}_last"), previous);
                }
                ToolDayRow { day, counts }
            })
            .collect()
    }
}

/// Distinct local calendar dates with at least one event.
pub fn activity_dates<'a>(
    events: impl IntoIterator<Item = &'a ActivityLog>,
    tz: Tz,
) -> BTreeSet<NaiveDate> {
    events
        .into_iter()
        .map(|event| event.event_time.with_timezone(&tz).date_naive())
        .collect()
}

/// Longest run of consecutive calendar days.
///
/// Input may be in any order and may contain duplicates.
pub fn longest_streak(dates: impl IntoIterator<Item = NaiveDate>) -> u32 {
    let sorted: BTreeSet<NaiveDate> = dates.into_iter().collect();

    let mut longest = 0;
    let mut current = 0;
    let mut last: Option<NaiveDate> = None;

    for date in sorted {
        current = match last {
            Some(prev) if (date - prev).num_days() == 1 => current + 1,
            Some(_) => {
                longest = longest.max(current);
                1
            }
            None => 1,
        };
        last = Some(date);
    }

    longest.max(current)
}
