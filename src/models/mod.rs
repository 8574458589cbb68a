// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Data models for the application.

pub mod activity;
pub mod report;
pub mod stats;
pub mod user;

pub use activity::{ActivityLog, Join, NewActivityLog, TemplateRef, ToolRef};
pub use report::{DailySummary, ToolOption, WeeklyReport};
pub use stats::{DayBucket, ToolWeekChart, WeekBuckets};
pub use user::{Team, TeamMember, UserAccount};
