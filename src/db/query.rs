// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! PostgREST query-string builder.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt::Display;

use crate::time_utils::format_utc_rfc3339;

/// Filter, ordering and paging parameters for one table request.
#[derive(Debug, Clone)]
pub struct Query {
    table: &'static str,
    params: Vec<(String, String)>,
}

impl Query {
    pub fn table(table: &'static str) -> Self {
        Self {
            table,
            params: Vec::new(),
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.table
    }

    fn param(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }

    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns.to_string())
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("eq.{}", value))
    }

    pub fn in_list(self, column: &str, values: &[i64]) -> Self {
        let joined = values
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.param(column, format!("in.({})", joined))
    }

    pub fn gte_time(self, column: &str, instant: DateTime<Utc>) -> Self {
        self.param(column, format!("gte.{}", format_utc_rfc3339(instant)))
    }

    pub fn lte_time(self, column: &str, instant: DateTime<Utc>) -> Self {
        self.param(column, format!("lte.{}", format_utc_rfc3339(instant)))
    }

    pub fn gte_date(self, column: &str, date: NaiveDate) -> Self {
        self.param(column, format!("gte.{}", date.format("%Y-%m-%d")))
    }

    pub fn lte_date(self, column: &str, date: NaiveDate) -> Self {
        self.param(column, format!("lte.{}", date.format("%Y-%m-%d")))
    }

    pub fn is_null(self, column: &str) -> Self {
        self.param(column, "is.null".to_string())
    }

    pub fn not_null(self, column: &str) -> Self {
        self.param(column, "not.is.null".to_string())
    }

    /// Case-insensitive substring match.
    ///
    /// Wildcard and grouping characters in `needle` are dropped so user input
    /// cannot widen the pattern.
    pub fn ilike_contains(self, column: &str, needle: &str) -> Self {
        let cleaned: String = needle
            .chars()
            .filter(|c| !matches!(c, '*' | '%' | '(' | ')' | ','))
            .collect();
        self.param(column, format!("ilike.*{}*", cleaned))
    }

    pub fn order(self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.param("order", format!("{}.{}", column, direction))
    }

    pub fn limit(self, limit: u64) -> Self {
        self.param("limit", limit.to_string())
    }

    pub fn offset(self, offset: u64) -> Self {
        self.param("offset", offset.to_string())
    }

    /// Encoded query string (without the leading `?`).
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Parse the total from a `Content-Range` header (`0-9/42` or `*/42`).
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_encoding() {
        let start = DateTime::parse_from_rfc3339("2024-06-10T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let qs = Query::table("activity_log")
            .select("log_id,tool:tool_id(name)")
            .in_list("user_id", &[1, 2, 3])
            .gte_time("event_time", start)
            .is_null("deleted_at")
            .order("event_time", true)
            .to_query_string();

        assert_eq!(
            qs,
            "select=log_id%2Ctool%3Atool_id%28name%29\
             &user_id=in.%281%2C2%2C3%29\
             &event_time=gte.2024-06-10T00%3A00%3A00.000Z\
             &deleted_at=is.null\
             &order=event_time.asc"
        );
    }

    #[test]
    fn test_ilike_strips_wildcards() {
        let qs = Query::table("activity_log")
            .ilike_contains("title", "50%*(x),y")
            .to_query_string();
        assert_eq!(qs, "title=ilike.%2A50xy%2A");
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }
}
