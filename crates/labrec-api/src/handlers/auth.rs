//! Login.
//!
//! Credentials are checked against the stored secret on every call; there is
//! no session. Credential failures are answered with `200` and
//! `success: false` so clients can tell them apart from transport errors.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::error::{ApiError, ErrorStyle, NO_USER};
use crate::{ApiJson, AppState};

/// Reason returned when the password does not match.
pub const WRONG_PASSWORD: &str = "wrong_password";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum LoginResponse {
    Accepted {
        success: bool,
        username: String,
        name: Option<String>,
    },
    Refused {
        success: bool,
        reason: &'static str,
    },
}

impl LoginResponse {
    fn refused(reason: &'static str) -> Self {
        LoginResponse::Refused {
            success: false,
            reason,
        }
    }
}

/// `POST /login`
///
/// # Returns
/// - 200 `{success: true, username, name}` on a match
/// - 200 `{success: false, reason: "no_user" | "wrong_password"}`
/// - 400 when either field is missing
/// - 500 `{error: "db_error"}` if the lookup fails
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (username, password) = match (req.username.as_deref(), req.password.as_deref()) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => {
            return Err(ApiError::BadRequest(
                "username and password are required".to_string(),
            ))
        }
    };

    let user = state
        .users
        .find_by_username(username)
        .await
        .map_err(|e| ErrorStyle::Coded.store("login", e))?;

    let Some(user) = user else {
        info!(subsystem = "auth", username, result = NO_USER, "Login refused");
        return Ok(Json(LoginResponse::refused(NO_USER)));
    };

    if !bool::from(user.password.as_bytes().ct_eq(password.as_bytes())) {
        warn!(subsystem = "auth", username, result = WRONG_PASSWORD, "Login refused");
        return Ok(Json(LoginResponse::refused(WRONG_PASSWORD)));
    }

    info!(subsystem = "auth", username, "Login accepted");
    Ok(Json(LoginResponse::Accepted {
        success: true,
        username: user.username,
        name: user.name,
    }))
}
