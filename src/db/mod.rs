// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Database layer (Supabase REST).

pub mod query;
pub mod supabase;

pub use query::Query;
pub use supabase::{ActivityFilter, ActivityPageQuery, SortField, SupabaseDb};

/// Table names as constants.
pub mod tables {
    pub const USER_ACCOUNT: &str = "user_account";
    pub const TEAM: &str = "team";
    pub const TOOL: &str = "tool";
    pub const ACTIVITY_LOG: &str = "activity_log";
    pub const DAILY_SUMMARY: &str = "daily_summary";
    pub const WEEKLY_REPORT: &str = "weekly_report";
}

/// Column projections shared by queries.
pub mod columns {
    pub const USER_ACCOUNT: &str = "user_id,team_id,name,email,timezone,clerk_id";
    pub const TEAM: &str = "team_id,name,manager_id";
    pub const TEAM_MEMBER: &str = "user_id,name";
    pub const ACTIVITY_LOG: &str = "log_id,user_id,event_time,minutes,title,status,metadata,\
        tool:tool_id(tool_id,name,category),template:template_id(display_name,action_type)";
    pub const DAILY_SUMMARY: &str =
        "summary_id,summary_date,ai_summary,total_actions,total_minutes,created_at";
    pub const WEEKLY_REPORT: &str = "user_id,week_start,project_time";
    pub const TOOL_OPTION: &str = "tool_id,name";
}
