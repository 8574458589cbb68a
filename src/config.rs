// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Application configuration loaded from environment variables.

use chrono_tz::Tz;
use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Base URL of the Supabase project (e.g. https://xyz.supabase.co)
    pub supabase_url: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Time zone for users without a valid `timezone` column
    pub default_timezone: Tz,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// Service-role key for the Supabase REST API
    pub supabase_service_key: String,
    /// Key used to verify identity-provider session tokens (raw bytes)
    pub auth_jwt_key: Vec<u8>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            default_timezone: Tz::UTC,
            port: 8080,
            supabase_service_key: "test_service_key".to_string(),
            auth_jwt_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let default_timezone = match env::var("DEFAULT_TIMEZONE") {
            Ok(name) => {
                crate::time_utils::parse_timezone(&name).ok_or(ConfigError::Invalid {
                    var: "DEFAULT_TIMEZONE",
                    reason: format!("unknown time zone '{}'", name),
                })?
            }
            Err(_) => Tz::UTC,
        };

        Ok(Self {
            supabase_url: env::var("SUPABASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            default_timezone,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_KEY"))?,
            auth_jwt_key: env::var("AUTH_JWT_KEY")
                .map_err(|_| ConfigError::Missing("AUTH_JWT_KEY"))?
                .into_bytes(),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases live in one test since they share process-wide env vars.
    #[test]
    fn test_config_from_env() {
        env::set_var("SUPABASE_URL", "https://example.supabase.co/");
        env::set_var("SUPABASE_SERVICE_KEY", " service_key \n");
        env::set_var("AUTH_JWT_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("DEFAULT_TIMEZONE", "Europe/Paris");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.supabase_url, "https://example.supabase.co");
        assert_eq!(config.supabase_service_key, "service_key");
        assert_eq!(config.default_timezone, chrono_tz::Europe::Paris);
        assert_eq!(config.port, 8080);

        env::set_var("DEFAULT_TIMEZONE", "Mars/Olympus");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                var: "DEFAULT_TIMEZONE",
                ..
            }
        ));
        env::remove_var("DEFAULT_TIMEZONE");
    }
}
