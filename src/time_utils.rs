// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Shared helpers for date/time windows and formatting.
//!
//! All dashboard windows are computed in a dashboard time zone (the user's
//! own zone when known) and converted to UTC only at the query boundary.

use chrono::{
    DateTime, Datelike, Days, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    SecondsFormat, TimeDelta, TimeZone, Utc, Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};

/// Day labels in Monday-first order.
pub const WEEKDAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Format a UTC timestamp as RFC3339 with millisecond precision and a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Map a weekday to its Monday-first index (Mon = 0 .. Sun = 6).
pub fn monday_index(weekday: Weekday) -> usize {
    let dow = weekday.num_days_from_sunday() as usize;
    if dow == 0 {
        6
    } else {
        dow - 1
    }
}

/// Last representable millisecond of a day.
fn end_of_day() -> NaiveTime {
    // NaiveTime subtraction wraps around midnight.
    NaiveTime::MIN - TimeDelta::milliseconds(1)
}

/// Resolve a local wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) take the earliest instant. Times inside a
/// DST gap are shifted forward by the size of the gap.
fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let offset_before = tz
                .offset_from_utc_datetime(&(naive - TimeDelta::days(1)))
                .fix()
                .local_minus_utc();
            let utc = naive - TimeDelta::seconds(i64::from(offset_before));
            tz.from_utc_datetime(&utc)
        }
    }
}

/// Local midnight at the start of `date`.
pub fn local_start_of_day(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    resolve_local(tz, date.and_time(NaiveTime::MIN))
}

/// Local 23:59:59.999 at the end of `date`.
pub fn local_end_of_day(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    resolve_local(tz, date.and_time(end_of_day()))
}

/// Inclusive UTC instant range used for store queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// A Monday 00:00 .. Sunday 23:59:59.999 window in a dashboard time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl WeekWindow {
    /// Build the window whose Monday is `monday`.
    ///
    /// Returns `None` only when the week falls outside the representable
    /// calendar range.
    pub fn starting(tz: Tz, monday: NaiveDate) -> Option<Self> {
        let sunday = monday.checked_add_days(Days::new(6))?;
        Some(Self {
            start: local_start_of_day(&tz, monday),
            end: local_end_of_day(&tz, sunday),
        })
    }

    /// Time zone the window was computed in.
    pub fn timezone(&self) -> Tz {
        self.start.timezone()
    }

    /// The Monday this window starts on.
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// The Sunday this window ends on.
    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// The same window moved by whole weeks (negative = earlier).
    pub fn shifted(&self, weeks: i32) -> Option<Self> {
        let days = TimeDelta::try_days(i64::from(weeks) * 7)?;
        let monday = self.start_date().checked_add_signed(days)?;
        Self::starting(self.timezone(), monday)
    }

    /// Inclusive bounds check.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.range().contains(instant)
    }

    pub fn range(&self) -> TimeRange {
        TimeRange {
            start: self.start.with_timezone(&Utc),
            end: self.end.with_timezone(&Utc),
        }
    }

    /// Window start formatted as RFC3339 UTC.
    pub fn start_rfc3339(&self) -> String {
        format_utc_rfc3339(self.start.with_timezone(&Utc))
    }

    /// Window end formatted as RFC3339 UTC.
    pub fn end_rfc3339(&self) -> String {
        format_utc_rfc3339(self.end.with_timezone(&Utc))
    }
}

/// Compute the week window `week_offset` weeks away from the week containing `now`.
///
/// `week_offset` is 0 for the current week, negative for past weeks and
/// positive for future weeks. Returns `None` only when the target week is
/// outside the representable calendar range.
pub fn week_window(now: DateTime<Utc>, tz: Tz, week_offset: i32) -> Option<WeekWindow> {
    let today = now.with_timezone(&tz).date_naive();
    let days_to_monday = TimeDelta::days(monday_index(today.weekday()) as i64);
    let offset = TimeDelta::try_days(i64::from(week_offset) * 7)?;

    let monday = today
        .checked_sub_signed(days_to_monday)?
        .checked_add_signed(offset)?;

    WeekWindow::starting(tz, monday)
}

/// Today's local 00:00 .. 23:59:59.999 as a UTC range.
pub fn day_window(now: DateTime<Utc>, tz: Tz) -> TimeRange {
    let today = now.with_timezone(&tz).date_naive();
    TimeRange {
        start: local_start_of_day(&tz, today).with_timezone(&Utc),
        end: local_end_of_day(&tz, today).with_timezone(&Utc),
    }
}

/// Normalise two dates to an inclusive full-day range.
pub fn full_day_range(tz: Tz, start: NaiveDate, end: NaiveDate) -> TimeRange {
    TimeRange {
        start: local_start_of_day(&tz, start).with_timezone(&Utc),
        end: local_end_of_day(&tz, end).with_timezone(&Utc),
    }
}

/// Whole days elapsed since the window start, rounded up, at least 1.
pub fn days_elapsed(window: &WeekWindow, now: DateTime<Utc>) -> u32 {
    let elapsed_ms = now
        .signed_duration_since(window.start.with_timezone(&Utc))
        .num_milliseconds();
    let day_ms = TimeDelta::days(1).num_milliseconds();
    let days = (elapsed_ms + day_ms - 1).div_euclid(day_ms);
    days.clamp(1, i64::from(u32::MAX)) as u32
}

/// Named ranges used by the team allocation view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekPreset {
    #[default]
    This,
    Last,
    Last4,
    All,
}

impl WeekPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekPreset::This => "this",
            WeekPreset::Last => "last",
            WeekPreset::Last4 => "last4",
            WeekPreset::All => "all",
        }
    }

    /// Inclusive date bounds relative to the current week, `None` for `All`.
    pub fn date_bounds(&self, current: &WeekWindow) -> Option<(NaiveDate, NaiveDate)> {
        let monday = current.start_date();
        let offset = |days: i64| monday.checked_add_signed(TimeDelta::days(days));

        match self {
            WeekPreset::This => Some((monday, offset(6)?)),
            WeekPreset::Last => Some((offset(-7)?, offset(-1)?)),
            WeekPreset::Last4 => Some((offset(-28)?, offset(6)?)),
            WeekPreset::All => None,
        }
    }
}

/// Parse a store timestamp, accepting RFC3339 or an offset-less value (read as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parse a `YYYY-MM-DD` date, or the date part of a full timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|dt| dt.date_naive()))
}

/// Serde adapter for timestamp columns that may lack an offset.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// Parse an IANA time zone name.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Format a date like `Jun 12, 2024`.
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Format a local time like `09:05 AM`.
pub fn format_clock_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%I:%M %p").to_string()
}

/// Format minutes like `3h 5mins`.
pub fn format_hours_minutes(total_minutes: i64) -> String {
    format!("{}h {}mins", total_minutes / 60, total_minutes % 60)
}

/// Round to one decimal place.
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn utc(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn test_week_window_midweek() {
        let now = utc("2024-06-12T15:30:00Z");
        let window = week_window(now, Tz::UTC, 0).unwrap();

        assert_eq!(window.start_rfc3339(), "2024-06-10T00:00:00.000Z");
        assert_eq!(window.end_rfc3339(), "2024-06-16T23:59:59.999Z");
    }

    #[test]
    fn test_week_window_sunday_belongs_to_previous_monday() {
        let now = utc("2024-06-16T23:00:00Z");
        let window = week_window(now, Tz::UTC, 0).unwrap();

        assert_eq!(window.start_date(), NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(window.end_date(), NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
    }

    #[test]
    fn test_week_window_offsets() {
        let now = utc("2024-06-12T08:00:00Z");

        let past = week_window(now, Tz::UTC, -1).unwrap();
        assert_eq!(past.start_rfc3339(), "2024-06-03T00:00:00.000Z");

        let future = week_window(now, Tz::UTC, 2).unwrap();
        assert_eq!(future.start_rfc3339(), "2024-06-24T00:00:00.000Z");
        assert_eq!(future.end_rfc3339(), "2024-06-30T23:59:59.999Z");
    }

    #[test]
    fn test_week_window_shape_holds_for_many_offsets() {
        let now = utc("2024-03-06T12:00:00Z");
        let zones = [Tz::UTC, chrono_tz::America::New_York, chrono_tz::Asia::Kolkata];

        for tz in zones {
            for offset in -60..=60 {
                let window = week_window(now, tz, offset).unwrap();

                assert_eq!(window.start.weekday(), Weekday::Mon);
                assert_eq!(window.start.time(), NaiveTime::MIN);
                assert_eq!(window.end.weekday(), Weekday::Sun);

                let wall_clock = window.end.naive_local() - window.start.naive_local();
                assert_eq!(
                    wall_clock,
                    TimeDelta::days(6) + TimeDelta::hours(23)
                        + TimeDelta::minutes(59)
                        + TimeDelta::seconds(59)
                        + TimeDelta::milliseconds(999)
                );
            }
        }
    }

    #[test]
    fn test_week_window_uses_local_date() {
        // Monday 02:00 UTC is still Sunday evening in New York.
        let now = utc("2024-06-10T02:00:00Z");
        let window = week_window(now, chrono_tz::America::New_York, 0).unwrap();

        assert_eq!(window.start_date(), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(window.start_rfc3339(), "2024-06-03T04:00:00.000Z");
    }

    #[test]
    fn test_week_window_across_dst_change() {
        // US DST starts Sunday 2024-03-10.
        let now = utc("2024-03-06T12:00:00Z");
        let window = week_window(now, chrono_tz::America::New_York, 0).unwrap();

        assert_eq!(window.start_rfc3339(), "2024-03-04T05:00:00.000Z");
        assert_eq!(window.end_rfc3339(), "2024-03-11T03:59:59.999Z");
    }

    #[test]
    fn test_missing_local_midnight_moves_forward() {
        // Cuba springs forward at midnight: 2024-03-10 00:00 never happens.
        let tz = chrono_tz::America::Havana;
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();

        let start = local_start_of_day(&tz, date);
        assert_eq!(start.time(), NaiveTime::from_hms_opt(1, 0, 0).unwrap());
        assert_eq!(start.date_naive(), date);
        assert_eq!(
            format_utc_rfc3339(start.with_timezone(&Utc)),
            "2024-03-10T05:00:00.000Z"
        );

        let range = day_window(utc("2024-03-10T12:00:00Z"), tz);
        assert_eq!(range.start, start.with_timezone(&Utc));
    }

    #[test]
    fn test_ambiguous_local_time_takes_earliest() {
        // US DST ends Sunday 2024-11-03; 01:30 happens twice in New York.
        let tz = chrono_tz::America::New_York;
        let naive = NaiveDate::from_ymd_opt(2024, 11, 3)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();

        let resolved = resolve_local(&tz, naive);
        assert_eq!(
            format_utc_rfc3339(resolved.with_timezone(&Utc)),
            "2024-11-03T05:30:00.000Z"
        );
    }

    #[test]
    fn test_week_window_rejects_unrepresentable_offset() {
        let now = utc("2024-06-12T08:00:00Z");
        assert!(week_window(now, Tz::UTC, i32::MAX).is_none());
    }

    #[test]
    fn test_shifted_matches_offset() {
        let now = utc("2024-06-12T08:00:00Z");
        let current = week_window(now, Tz::UTC, 0).unwrap();

        assert_eq!(current.shifted(-1), week_window(now, Tz::UTC, -1));
        assert_eq!(current.shifted(3), week_window(now, Tz::UTC, 3));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = week_window(utc("2024-06-12T08:00:00Z"), Tz::UTC, 0).unwrap();

        assert!(window.contains(utc("2024-06-10T00:00:00Z")));
        assert!(window.contains(utc("2024-06-16T23:59:59.999Z")));
        assert!(!window.contains(utc("2024-06-17T00:00:00Z")));
        assert!(!window.contains(utc("2024-06-09T23:59:59.999Z")));
    }

    #[test]
    fn test_day_window() {
        let range = day_window(utc("2024-06-12T15:30:00Z"), Tz::UTC);
        assert_eq!(format_utc_rfc3339(range.start), "2024-06-12T00:00:00.000Z");
        assert_eq!(format_utc_rfc3339(range.end), "2024-06-12T23:59:59.999Z");
    }

    #[test]
    fn test_days_elapsed() {
        let now = utc("2024-06-12T15:30:00Z");
        let window = week_window(now, Tz::UTC, 0).unwrap();
        assert_eq!(days_elapsed(&window, now), 3);

        let monday_midnight = utc("2024-06-10T00:00:00Z");
        assert_eq!(days_elapsed(&window, monday_midnight), 1);
    }

    #[test]
    fn test_week_preset_bounds() {
        let window = week_window(utc("2024-06-12T08:00:00Z"), Tz::UTC, 0).unwrap();
        let d = |day| NaiveDate::from_ymd_opt(2024, 6, day).unwrap();

        assert_eq!(WeekPreset::This.date_bounds(&window), Some((d(10), d(16))));
        assert_eq!(WeekPreset::Last.date_bounds(&window), Some((d(3), d(9))));
        assert_eq!(
            WeekPreset::Last4.date_bounds(&window),
            Some((NaiveDate::from_ymd_opt(2024, 5, 13).unwrap(), d(16)))
        );
        assert_eq!(WeekPreset::All.date_bounds(&window), None);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        assert_eq!(
            parse_timestamp("2024-06-12T10:00:00+02:00").unwrap().hour(),
            8
        );
        assert_eq!(parse_timestamp("2024-06-12T10:00:00.123").unwrap().hour(), 10);
        assert_eq!(parse_timestamp("2024-06-12 10:00:00").unwrap().hour(), 10);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(format_hours_minutes(185), "3h 5mins");
        assert_eq!(format_hours_minutes(0), "0h 0mins");
        assert_eq!(
            format_short_date(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()),
            "Jun 2, 2024"
        );
        assert_eq!(
            format_clock_time(utc("2024-06-12T21:05:00Z"), Tz::UTC),
            "09:05 PM"
        );
        assert_eq!(round_tenths(2.345), 2.3);
    }
}
