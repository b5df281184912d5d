//! Literature handlers and attachment upload.
//!
//! Attaching a file is a two-step flow: `POST /uploadLiteratureFile` stores
//! the bytes and returns their location, then `POST /addLiterature` records
//! the reference together with that location. The steps are independent; an
//! upload that is never referenced simply stays in storage.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use labrec_core::upload::UNSUPPORTED_TYPE_MESSAGE;
use labrec_core::{
    generate_stored_name, is_allowed_mime, within_size_limit, CreateLiteratureRequest,
    Literature, UploadedFile, UPLOAD_FIELD,
};

use super::{ListResponse, UsernameQuery};
use crate::body_types::{deserialize_optional_i32, deserialize_optional_i64};
use crate::error::{ApiError, ErrorStyle};
use crate::resolve::{require, resolve_user};
use crate::{ApiJson, ApiQuery, AppState};

const STYLE: ErrorStyle = ErrorStyle::Descriptive;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

/// Attachment fields are accepted in snake_case (what the upload form
/// historically posted) and in the camelCase the upload response uses.
#[derive(Debug, Deserialize)]
pub struct AddLiteratureBody {
    pub username: Option<String>,
    pub title: Option<String>,
    pub authors: Option<String>,
    pub journal: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub year: Option<i32>,
    pub keywords: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
    #[serde(alias = "filePath")]
    pub file_path: Option<String>,
    #[serde(alias = "fileName")]
    pub file_name: Option<String>,
    #[serde(
        default,
        alias = "fileSize",
        deserialize_with = "deserialize_optional_i64"
    )]
    pub file_size: Option<i64>,
    #[serde(alias = "fileType")]
    pub file_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddLiteratureResponse {
    pub success: bool,
    pub literature_id: i64,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(flatten)]
    pub file: UploadedFile,
    pub message: &'static str,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /uploadLiteratureFile` (multipart, field `literatureFile`)
///
/// The content type is checked before any bytes are read, and the body is
/// streamed so an oversized file is refused as soon as it crosses the limit.
///
/// # Returns
/// - 200 with `filePath`, `storedName`, `fileName`, `fileSize`, `fileType`
///   (plus `storagePath` for object storage)
/// - 400 when no file is attached, the type is not accepted or the file
///   is larger than 10 MiB
/// - 500 `{error: "file upload failed"}` if the bytes cannot be stored
pub async fn upload_literature_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // A part without a filename is a plain form value, not a file.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        if state.config.upload_type_filter && !is_allowed_mime(&content_type) {
            warn!(
                subsystem = "upload",
                file_name = %file_name,
                content_type = %content_type,
                "Rejected attachment type"
            );
            return Err(ApiError::UploadRejected(
                UNSUPPORTED_TYPE_MESSAGE.to_string(),
            ));
        }

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if !within_size_limit((data.len() + chunk.len()) as u64) {
                warn!(subsystem = "upload", file_name = %file_name, "Attachment over size limit");
                return Err(ApiError::FileTooLarge);
            }
            data.extend_from_slice(&chunk);
        }

        let stored_name = generate_stored_name(&file_name);
        state
            .storage
            .write(&stored_name, &data, &content_type)
            .await
            .map_err(|e| {
                error!(
                    subsystem = "upload",
                    stored_name = %stored_name,
                    error = %e,
                    "Attachment write failed"
                );
                ApiError::Upload
            })?;

        info!(
            subsystem = "upload",
            stored_name = %stored_name,
            size = data.len(),
            content_type = %content_type,
            "Attachment stored"
        );

        let storage_path = state.storage.is_remote().then(|| stored_name.clone());
        return Ok(Json(UploadResponse {
            success: true,
            file: UploadedFile {
                file_path: state.storage.locate(&stored_name),
                stored_name,
                file_name,
                file_size: data.len() as i64,
                file_type: content_type,
                storage_path,
            },
            message: "file uploaded",
        }));
    }

    debug!(subsystem = "upload", "Multipart body carried no {} file", UPLOAD_FIELD);
    Err(ApiError::BadRequest("no file uploaded".to_string()))
}

/// `POST /addLiterature`
///
/// # Returns
/// - 200 with the new `literatureId`
/// - 400 if username, title or authors is missing
/// - 404 `{error: "user not found"}`
/// - 500 with the store's message
pub async fn add_literature(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AddLiteratureBody>,
) -> Result<Json<AddLiteratureResponse>, ApiError> {
    let missing =
        || ApiError::BadRequest("username, title and authors are required".to_string());
    let username = require(body.username.as_deref(), "username").map_err(|_| missing())?;
    let title = require(body.title.as_deref(), "title").map_err(|_| missing())?;
    let authors = require(body.authors.as_deref(), "authors").map_err(|_| missing())?;

    let user_id = resolve_user(state.users.as_ref(), username, STYLE).await?;

    let id = state
        .literature
        .insert(CreateLiteratureRequest {
            user_id,
            title: title.to_string(),
            authors: authors.to_string(),
            journal: body.journal,
            year: body.year,
            keywords: body.keywords,
            abstract_text: body.abstract_text,
            link: body.link,
            notes: body.notes,
            file_path: body.file_path,
            file_name: body.file_name,
            file_size: body.file_size,
            file_type: body.file_type,
        })
        .await
        .map_err(|e| STYLE.store("add_literature", e))?;

    info!(
        subsystem = "api",
        component = "literature",
        op = "add",
        username,
        literature_id = id,
        "Literature added"
    );
    Ok(Json(AddLiteratureResponse {
        success: true,
        literature_id: id,
        message: "literature added",
    }))
}

/// `GET /getLiterature?username=`, newest first.
pub async fn get_literature(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<UsernameQuery>,
) -> Result<Json<ListResponse<Literature>>, ApiError> {
    let username = require(query.username.as_deref(), "username")?;
    let user_id = resolve_user(state.users.as_ref(), username, STYLE).await?;

    let rows = state
        .literature
        .list_for_user(user_id)
        .await
        .map_err(|e| STYLE.store("get_literature", e))?;

    Ok(Json(ListResponse::new(rows)))
}
