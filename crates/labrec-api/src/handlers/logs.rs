//! Personal log handlers.

use std::time::Instant;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use labrec_core::{day_bounds, parse_day, CreateLogRequest, UserLog};

use super::{ListResponse, UsernameQuery};
use crate::error::{ApiError, ErrorStyle};
use crate::resolve::{require, resolve_user};
use crate::{ApiJson, ApiQuery, AppState};

const STYLE: ErrorStyle = ErrorStyle::Descriptive;

#[derive(Debug, Deserialize)]
pub struct AddLogBody {
    pub username: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddLogResponse {
    pub success: bool,
    pub log: UserLog,
}

#[derive(Debug, Deserialize)]
pub struct LogsByDateQuery {
    pub username: Option<String>,
    pub date: Option<String>,
}

/// `POST /addLog`
///
/// Returns the persisted row so the client can render it without
/// refetching.
///
/// # Returns
/// - 200 `{success: true, log}`
/// - 400 if username is missing or content is blank
/// - 404 `{error: "user not found"}`
/// - 500 with the store's message
pub async fn add_log(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AddLogBody>,
) -> Result<Json<AddLogResponse>, ApiError> {
    let username = require(body.username.as_deref(), "username")?;
    let content = require(body.content.as_deref(), "content")
        .map_err(|_| ApiError::BadRequest("log content must not be blank".to_string()))?;

    let user_id = resolve_user(state.users.as_ref(), username, STYLE).await?;

    // Blank titles are stored as absent.
    let title = body.title.filter(|t| !t.trim().is_empty());

    let log = state
        .logs
        .insert(CreateLogRequest {
            user_id,
            username: username.to_string(),
            title,
            content: content.to_string(),
            day_offset: state.config.log_day_offset,
        })
        .await
        .map_err(|e| STYLE.store("add_log", e))?;

    info!(
        subsystem = "api",
        component = "logs",
        op = "add",
        username,
        log_id = log.id,
        "Log added"
    );
    Ok(Json(AddLogResponse { success: true, log }))
}

/// `GET /getLogs?username=`: the 500 most recent entries.
pub async fn get_logs(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UsernameQuery>,
) -> Result<Json<ListResponse<UserLog>>, ApiError> {
    let username = require(query.username.as_deref(), "username")?;
    let user_id = resolve_user(state.users.as_ref(), username, STYLE).await?;

    let rows = state
        .logs
        .list_recent(user_id)
        .await
        .map_err(|e| STYLE.store("get_logs", e))?;

    Ok(Json(ListResponse::new(rows)))
}

/// `GET /getLogsByDate?username=&date=YYYY-MM-DD`
///
/// The day runs from local midnight to the next local midnight in the
/// configured `LOG_DAY_UTC_OFFSET`.
pub async fn get_logs_by_date(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LogsByDateQuery>,
) -> Result<Json<ListResponse<UserLog>>, ApiError> {
    let start = Instant::now();
    let (username, date) = match (query.username.as_deref(), query.date.as_deref()) {
        (Some(u), Some(d)) if !u.trim().is_empty() && !d.trim().is_empty() => (u, d),
        _ => {
            return Err(ApiError::BadRequest(
                "username and date are required".to_string(),
            ))
        }
    };
    let day = parse_day(date).map_err(|e| match e {
        labrec_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
        other => ApiError::BadRequest(other.to_string()),
    })?;

    let user_id = resolve_user(state.users.as_ref(), username, STYLE).await?;

    let (from, to) = day_bounds(day, state.config.log_day_offset);
    let rows = state
        .logs
        .list_between(user_id, from, to)
        .await
        .map_err(|e| STYLE.store("get_logs_by_date", e))?;

    info!(
        subsystem = "api",
        component = "logs",
        op = "list_by_date",
        username,
        %day,
        result_count = rows.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Logs listed for day"
    );
    Ok(Json(ListResponse::new(rows)))
}
