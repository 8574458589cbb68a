// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Supabase REST client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users and teams (account lookup, membership)
//! - Activity logs (range reads, counts, paging, manual entries)
//! - Daily summaries and weekly reports written by the report workflow

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_RANGE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::db::query::{parse_content_range_total, Query};
use crate::db::{columns, tables};
use crate::error::AppError;
use crate::models::{
    ActivityLog, DailySummary, NewActivityLog, Team, TeamMember, ToolOption, UserAccount,
    WeeklyReport,
};
use crate::time_utils::TimeRange;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Range read over activity logs.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub user_ids: Vec<i64>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Only rows with a tool attached
    pub require_tool: bool,
    pub ascending: bool,
    pub limit: Option<u64>,
}

impl ActivityFilter {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_ids: vec![user_id],
            ascending: true,
            ..Self::default()
        }
    }

    pub fn for_users(user_ids: &[i64]) -> Self {
        Self {
            user_ids: user_ids.to_vec(),
            ascending: true,
            ..Self::default()
        }
    }

    pub fn within(mut self, range: TimeRange) -> Self {
        self.from = Some(range.start);
        self.to = Some(range.end);
        self
    }

    fn apply(&self, query: Query) -> Query {
        let mut query = if self.user_ids.len() == 1 {
            query.eq("user_id", self.user_ids[0])
        } else {
            query.in_list("user_id", &self.user_ids)
        };
        if let Some(from) = self.from {
            query = query.gte_time("event_time", from);
        }
        if let Some(to) = self.to {
            query = query.lte_time("event_time", to);
        }
        if self.require_tool {
            query = query.not_null("tool_id");
        }
        query
    }
}

/// Sortable activity log columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    EventTime,
    Minutes,
    Title,
    Status,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::EventTime => "event_time",
            SortField::Minutes => "minutes",
            SortField::Title => "title",
            SortField::Status => "status",
        }
    }
}

/// One page of the action log listing.
#[derive(Debug, Clone)]
pub struct ActivityPageQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: Option<String>,
    pub tool_id: Option<i64>,
    pub status: Option<String>,
    pub sort_by: SortField,
    pub ascending: bool,
}

/// Low-level REST client.
#[derive(Clone)]
struct RestClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl RestClient {
    fn url(&self, query: &Query) -> String {
        let qs = query.to_query_string();
        if qs.is_empty() {
            format!("{}/rest/v1/{}", self.base_url, query.table_name())
        } else {
            format!("{}/rest/v1/{}?{}", self.base_url, query.table_name(), qs)
        }
    }

    fn request(&self, method: Method, query: &Query) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(query))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        table: &str,
    ) -> Result<reqwest::Response, AppError> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Database(format!("{} request failed: {}", table, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Database(format!(
                "{} request returned {}: {}",
                table, status, body
            )));
        }
        Ok(response)
    }

    async fn select<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, AppError> {
        let table = query.table_name();
        let response = self.send(self.request(Method::GET, query), table).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("Failed to decode {} rows: {}", table, e)))
    }

    async fn select_with_count<T: DeserializeOwned>(
        &self,
        query: &Query,
    ) -> Result<(Vec<T>, u64), AppError> {
        let table = query.table_name();
        let response = self
            .send(
                self.request(Method::GET, query)
                    .header("Prefer", "count=exact"),
                table,
            )
            .await?;

        let total = content_range_total(response.headers());
        let rows: Vec<T> = response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("Failed to decode {} rows: {}", table, e)))?;
        let total = total.unwrap_or(rows.len() as u64);
        Ok((rows, total))
    }

    async fn count(&self, query: &Query) -> Result<u64, AppError> {
        let table = query.table_name();
        let response = self
            .send(
                self.request(Method::HEAD, query)
                    .header("Prefer", "count=exact"),
                table,
            )
            .await?;

        content_range_total(response.headers()).ok_or_else(|| {
            AppError::Database(format!("{} count response had no Content-Range", table))
        })
    }

    async fn write<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        query: &Query,
        body: &B,
    ) -> Result<Vec<T>, AppError> {
        let table = query.table_name();
        let response = self
            .send(
                self.request(method, query)
                    .header("Prefer", "return=representation")
                    .json(body),
                table,
            )
            .await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Database(format!("Failed to decode {} rows: {}", table, e)))
    }
}

/// Soft-deleted accounts carry a `deleted_at` stamp and never sign in.
fn active_user_query(external_id: &str) -> Query {
    Query::table(tables::USER_ACCOUNT)
        .select(columns::USER_ACCOUNT)
        .eq("clerk_id", external_id)
        .is_null("deleted_at")
        .limit(1)
}

fn team_members_query(team_id: i64) -> Query {
    Query::table(tables::USER_ACCOUNT)
        .select(columns::TEAM_MEMBER)
        .eq("team_id", team_id)
        .is_null("deleted_at")
}

fn content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|h: &HeaderValue| h.to_str().ok())
        .and_then(parse_content_range_total)
}

/// Supabase database client.
#[derive(Clone)]
pub struct SupabaseDb {
    client: Option<RestClient>,
}

impl SupabaseDb {
    /// Create a client for the project at `base_url` using a service key.
    pub fn new(base_url: &str, service_key: &str) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| AppError::Database(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(url = base_url, "Configured Supabase REST client");

        Ok(Self {
            client: Some(RestClient {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                service_key: service_key.to_string(),
            }),
        })
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&RestClient, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get an active (not deleted) user by identity-provider subject.
    pub async fn get_user_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserAccount>, AppError> {
        let query = active_user_query(external_id);
        Ok(self.get_client()?.select(&query).await?.into_iter().next())
    }

    /// Get a user by ID, including deleted users.
    pub async fn get_user(&self, user_id: i64) -> Result<Option<UserAccount>, AppError> {
        let query = Query::table(tables::USER_ACCOUNT)
            .select(columns::USER_ACCOUNT)
            .eq("user_id", user_id)
            .limit(1);
        Ok(self.get_client()?.select(&query).await?.into_iter().next())
    }

    // ─── Team Operations ─────────────────────────────────────────

    pub async fn get_team(&self, team_id: i64) -> Result<Option<Team>, AppError> {
        let query = Query::table(tables::TEAM)
            .select(columns::TEAM)
            .eq("team_id", team_id)
            .limit(1);
        Ok(self.get_client()?.select(&query).await?.into_iter().next())
    }

    /// Active members of a team.
    pub async fn get_team_members(&self, team_id: i64) -> Result<Vec<TeamMember>, AppError> {
        self.get_client()?.select(&team_members_query(team_id)).await
    }

    // ─── Activity Operations ─────────────────────────────────────

    /// Read activity logs matching `filter`, ordered by event time.
    pub async fn get_activities(&self, filter: &ActivityFilter) -> Result<Vec<ActivityLog>, AppError> {
        if filter.user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = filter
            .apply(Query::table(tables::ACTIVITY_LOG).select(columns::ACTIVITY_LOG))
            .order("event_time", filter.ascending);
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let rows: Vec<ActivityLog> = self.get_client()?.select(&query).await?;
        tracing::debug!(
            users = filter.user_ids.len(),
            rows = rows.len(),
            "Fetched activity logs"
        );
        Ok(rows)
    }

    /// Count activity logs matching `filter`.
    pub async fn count_activities(&self, filter: &ActivityFilter) -> Result<u64, AppError> {
        if filter.user_ids.is_empty() {
            return Ok(0);
        }
        let query = filter.apply(Query::table(tables::ACTIVITY_LOG).select("log_id"));
        self.get_client()?.count(&query).await
    }

    /// One page of a user's activity logs plus the total matching count.
    pub async fn list_activity_page(
        &self,
        user_id: i64,
        page: &ActivityPageQuery,
    ) -> Result<(Vec<ActivityLog>, u64), AppError> {
        let mut query = Query::table(tables::ACTIVITY_LOG)
            .select(columns::ACTIVITY_LOG)
            .eq("user_id", user_id);

        if let Some(search) = page.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query = query.ilike_contains("title", search.trim());
        }
        if let Some(tool_id) = page.tool_id {
            query = query.eq("tool_id", tool_id);
        }
        if let Some(status) = page.status.as_deref() {
            query = query.eq("status", status);
        }

        let offset = u64::from(page.page.saturating_sub(1)) * u64::from(page.page_size);
        let query = query
            .order(page.sort_by.column(), page.ascending)
            .limit(u64::from(page.page_size))
            .offset(offset);

        self.get_client()?.select_with_count(&query).await
    }

    /// Get one of a user's activity logs.
    pub async fn get_user_activity(
        &self,
        user_id: i64,
        log_id: i64,
    ) -> Result<Option<ActivityLog>, AppError> {
        let query = Query::table(tables::ACTIVITY_LOG)
            .select(columns::ACTIVITY_LOG)
            .eq("log_id", log_id)
            .eq("user_id", user_id)
            .limit(1);
        Ok(self.get_client()?.select(&query).await?.into_iter().next())
    }

    /// Replace the metadata of one of a user's activity logs.
    pub async fn update_activity_metadata(
        &self,
        user_id: i64,
        log_id: i64,
        metadata: &Value,
    ) -> Result<(), AppError> {
        let query = Query::table(tables::ACTIVITY_LOG)
            .select("log_id")
            .eq("log_id", log_id)
            .eq("user_id", user_id);
        let body = serde_json::json!({ "metadata": metadata });

        let updated: Vec<Value> = self
            .get_client()?
            .write(Method::PATCH, &query, &body)
            .await?;
        if updated.is_empty() {
            return Err(AppError::NotFound(format!("Activity {} not found", log_id)));
        }
        Ok(())
    }

    /// Insert a new activity log and return the stored row.
    pub async fn insert_activity(&self, entry: &NewActivityLog) -> Result<ActivityLog, AppError> {
        let query = Query::table(tables::ACTIVITY_LOG).select(columns::ACTIVITY_LOG);
        let rows: Vec<ActivityLog> = self
            .get_client()?
            .write(Method::POST, &query, entry)
            .await?;

        let row = rows.into_iter().next().ok_or_else(|| {
            AppError::Database("Insert into activity_log returned no row".to_string())
        })?;
        tracing::info!(user_id = entry.user_id, log_id = row.log_id, "Created manual activity log");
        Ok(row)
    }

    // ─── Tool Operations ─────────────────────────────────────────

    /// Active tools ordered by name.
    pub async fn list_active_tools(&self) -> Result<Vec<ToolOption>, AppError> {
        let query = Query::table(tables::TOOL)
            .select(columns::TOOL_OPTION)
            .eq("active", true)
            .order("name", true);
        self.get_client()?.select(&query).await
    }

    // ─── Summary / Report Operations ─────────────────────────────

    /// Most recent daily summary that has generated text.
    pub async fn get_latest_daily_summary(
        &self,
        user_id: i64,
    ) -> Result<Option<DailySummary>, AppError> {
        let query = Query::table(tables::DAILY_SUMMARY)
            .select(columns::DAILY_SUMMARY)
            .eq("user_id", user_id)
            .not_null("ai_summary")
            .order("summary_date", false)
            .limit(1);
        Ok(self.get_client()?.select(&query).await?.into_iter().next())
    }

    /// Weekly reports for users, optionally bounded by `week_start` dates (inclusive).
    pub async fn get_weekly_reports(
        &self,
        user_ids: &[i64],
        week_starts: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<WeeklyReport>, AppError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = Query::table(tables::WEEKLY_REPORT)
            .select(columns::WEEKLY_REPORT)
            .in_list("user_id", user_ids);
        if let Some((from, to)) = week_starts {
            query = query.gte_date("week_start", from).lte_date("week_start", to);
        }
        self.get_client()?.select(&query).await
    }
}
