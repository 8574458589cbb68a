// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Services module - dashboard aggregation logic.

pub mod dashboard;
pub mod team;
