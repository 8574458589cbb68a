// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! User and team models.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// User account row (`user_account`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: i64,
    /// Team membership, if any
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// IANA time zone name (e.g. "Europe/Berlin")
    #[serde(default)]
    pub timezone: Option<String>,
    /// Identity provider subject
    #[serde(default)]
    pub clerk_id: Option<String>,
}

impl UserAccount {
    /// The user's dashboard time zone, falling back to `default` when unset or invalid.
    pub fn time_zone(&self, default: Tz) -> Tz {
        self.timezone
            .as_deref()
            .and_then(crate::time_utils::parse_timezone)
            .unwrap_or(default)
    }
}

/// Team row (`team`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub team_id: i64,
    pub name: String,
    #[serde(default)]
    pub manager_id: Option<i64>,
}

impl Team {
    pub fn is_managed_by(&self, user_id: i64) -> bool {
        self.manager_id == Some(user_id)
    }
}

/// Minimal team member projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: i64,
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(timezone: Option<&str>) -> UserAccount {
        UserAccount {
            user_id: 1,
            team_id: None,
            name: "Ada".to_string(),
            email: None,
            timezone: timezone.map(String::from),
            clerk_id: None,
        }
    }

    #[test]
    fn test_time_zone_fallback() {
        assert_eq!(user(None).time_zone(Tz::UTC), Tz::UTC);
        assert_eq!(user(Some("Not/AZone")).time_zone(Tz::UTC), Tz::UTC);
        assert_eq!(
            user(Some("Europe/Berlin")).time_zone(Tz::UTC),
            chrono_tz::Europe::Berlin
        );
    }

    #[test]
    fn test_is_managed_by() {
        let team = Team {
            team_id: 3,
            name: "Core".to_string(),
            manager_id: Some(1),
        };
        assert!(team.is_managed_by(1));
        assert!(!team.is_managed_by(2));

        let unmanaged = Team {
            manager_id: None,
            ..team
        };
        assert!(!unmanaged.is_managed_by(1));
    }
}
