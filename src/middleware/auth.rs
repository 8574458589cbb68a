// SPDX-License-Identifier: MIT
// Copyright 2026 Focus Flow contributors

//! Session token authentication middleware.
//!
//! Sessions are issued by the identity provider. This middleware only
//! verifies the token and exposes its subject; mapping the subject to a
//! `user_account` row happens in the handlers.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Cookie carrying the identity provider's session token.
pub const SESSION_COOKIE: &str = "__session";

/// Session token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity provider user id, matched against `user_account.clerk_id`)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: usize,
}

/// Authenticated caller extracted from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub external_id: String,
}

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Verify a session token and return its subject.
pub fn verify_session_token(token: &str, key: &[u8]) -> Option<String> {
    let key = DecodingKey::from_secret(key);
    let validation = Validation::new(Algorithm::HS256);

    match decode::<Claims>(token, &key, &validation) {
        Ok(data) if !data.claims.sub.is_empty() => Some(data.claims.sub),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session token");
            None
        }
    }
}

/// Middleware that requires a valid session token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = match jar.get(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => bearer_token(&request).ok_or(AppError::Unauthorized)?,
    };

    let external_id = verify_session_token(&token, &state.config.auth_jwt_key)
        .ok_or(AppError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser { external_id });

    Ok(next.run(request).await)
}

/// Sign a session token for `external_id`, valid for `ttl_secs`.
///
/// Used by tests and local tooling; production tokens come from the
/// identity provider.
pub fn create_session_token(
    external_id: &str,
    signing_key: &[u8],
    ttl_secs: usize,
) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: external_id.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_jwt_key_32_bytes_minimum!!";

    #[test]
    fn test_round_trip_subject() {
        let token = create_session_token("user_2abc", KEY, 3600).unwrap();
        assert_eq!(verify_session_token(&token, KEY).as_deref(), Some("user_2abc"));
    }

    #[test]
    fn test_rejects_wrong_key_and_garbage() {
        let token = create_session_token("user_2abc", KEY, 3600).unwrap();
        assert!(verify_session_token(&token, b"another_key_entirely_32_bytes!!").is_none());
        assert!(verify_session_token("not.a.token", KEY).is_none());
    }

    #[test]
    fn test_rejects_empty_subject() {
        let token = create_session_token("", KEY, 3600).unwrap();
        assert!(verify_session_token(&token, KEY).is_none());
    }
}
