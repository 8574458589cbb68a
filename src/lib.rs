// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Focus Flow: team activity-tracking dashboard API
//!
//! This crate provides the backend for the personal and team dashboards:
//! it verifies the caller's session, reads activity rows from Supabase and
//! aggregates them into weekly charts, streaks and allocations.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::SupabaseDb;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: SupabaseDb,
}
