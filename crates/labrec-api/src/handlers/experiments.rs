//! Experiment log handlers.

use std::time::Instant;

use axum::{extract::State, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use labrec_core::{CreateExperimentRequest, Experiment};

use super::{ListResponse, UsernameQuery};
use crate::body_types::deserialize_optional_date;
use crate::error::{ApiError, ErrorStyle};
use crate::resolve::{require, resolve_user};
use crate::{ApiJson, ApiQuery, AppState};

const STYLE: ErrorStyle = ErrorStyle::Coded;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddExperimentBody {
    pub username: Option<String>,
    pub exp_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub exp_date: Option<NaiveDate>,
    pub exp_data: Option<String>,
    pub exp_note: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddExperimentResponse {
    pub success: bool,
    pub message: &'static str,
    pub experiment_id: i64,
}

/// `POST /addExperiment`
///
/// # Returns
/// - 200 with the new `experimentId`
/// - 400 `{error: "no_username"}`
/// - 404 `{reason: "no_user"}`
/// - 500 `{error: "db_error"}`
pub async fn add_experiment(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AddExperimentBody>,
) -> Result<Json<AddExperimentResponse>, ApiError> {
    let username = require(body.username.as_deref(), "username")
        .map_err(|_| ApiError::BadRequest("no_username".to_string()))?;
    let user_id = resolve_user(state.users.as_ref(), username, STYLE).await?;

    let id = state
        .experiments
        .insert(CreateExperimentRequest {
            user_id,
            exp_name: body.exp_name,
            exp_date: body.exp_date,
            exp_data: body.exp_data,
            exp_note: body.exp_note,
        })
        .await
        .map_err(|e| STYLE.store("add_experiment", e))?;

    info!(
        subsystem = "api",
        component = "experiments",
        op = "add",
        username,
        experiment_id = id,
        "Experiment saved"
    );
    Ok(Json(AddExperimentResponse {
        success: true,
        message: "experiment saved",
        experiment_id: id,
    }))
}

/// `GET /getExperiments?username=`
///
/// Newest `expDate` first; undated entries come last.
pub async fn get_experiments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UsernameQuery>,
) -> Result<Json<ListResponse<Experiment>>, ApiError> {
    let start = Instant::now();
    let username = require(query.username.as_deref(), "username")?;
    let user_id = resolve_user(state.users.as_ref(), username, STYLE).await?;

    let rows = state
        .experiments
        .list_for_user(user_id)
        .await
        .map_err(|e| STYLE.store("get_experiments", e))?;

    info!(
        subsystem = "api",
        component = "experiments",
        op = "list",
        username,
        result_count = rows.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Experiments listed"
    );
    Ok(Json(ListResponse::new(rows)))
}
