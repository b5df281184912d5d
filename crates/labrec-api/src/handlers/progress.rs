//! Thesis progress handlers.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use labrec_core::{CreateProgressRequest, ThesisProgress};

use super::{ListResponse, UsernameQuery};
use crate::error::{ApiError, ErrorStyle};
use crate::resolve::{require, resolve_user};
use crate::{ApiJson, ApiQuery, AppState};

const STYLE: ErrorStyle = ErrorStyle::Coded;

/// Every narrative field is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgressBody {
    pub username: Option<String>,
    pub progress_summary: Option<String>,
    pub completed_items: Option<String>,
    pub result_output: Option<String>,
    pub problems_encountered: Option<String>,
    pub next_plan: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgressResponse {
    pub success: bool,
    pub message: &'static str,
    pub progress_id: i64,
}

/// `POST /saveProgress`
pub async fn save_progress(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SaveProgressBody>,
) -> Result<Json<SaveProgressResponse>, ApiError> {
    let username = require(body.username.as_deref(), "username")
        .map_err(|_| ApiError::BadRequest("no_username".to_string()))?;
    let user_id = resolve_user(state.users.as_ref(), username, STYLE).await?;

    let id = state
        .progress
        .insert(CreateProgressRequest {
            user_id,
            progress_summary: body.progress_summary,
            completed_items: body.completed_items,
            result_output: body.result_output,
            problems_encountered: body.problems_encountered,
            next_plan: body.next_plan,
        })
        .await
        .map_err(|e| STYLE.store("save_progress", e))?;

    info!(
        subsystem = "api",
        component = "progress",
        op = "save",
        username,
        progress_id = id,
        "Progress saved"
    );
    Ok(Json(SaveProgressResponse {
        success: true,
        message: "progress saved",
        progress_id: id,
    }))
}

/// `GET /getProgress?username=`, newest first.
pub async fn get_progress(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UsernameQuery>,
) -> Result<Json<ListResponse<ThesisProgress>>, ApiError> {
    let username = require(query.username.as_deref(), "username")?;
    let user_id = resolve_user(state.users.as_ref(), username, STYLE).await?;

    let rows = state
        .progress
        .list_for_user(user_id)
        .await
        .map_err(|e| STYLE.store("get_progress", e))?;

    Ok(Json(ListResponse::new(rows)))
}
