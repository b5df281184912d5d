//! Core data models for labrec.
//!
//! Rows owned by the persistent store. Field names on the wire follow the
//! record-keeping client: experiments use camelCase keys, everything else
//! uses the column names directly.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// USERS
// =============================================================================

/// A provisioned account. Users are created out of band and never mutated here.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub name: Option<String>,
}

// =============================================================================
// EXPERIMENTS
// =============================================================================

/// One experiment log entry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Experiment {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    #[serde(rename = "expName")]
    pub exp_name: Option<String>,
    #[serde(rename = "expDate")]
    pub exp_date: Option<NaiveDate>,
    #[serde(rename = "expData")]
    pub exp_data: Option<String>,
    #[serde(rename = "expNote")]
    pub exp_note: Option<String>,
}

// =============================================================================
// THESIS PROGRESS
// =============================================================================

/// A thesis progress update. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ThesisProgress {
    pub id: i64,
    pub user_id: i64,
    /// Owning username, joined from the users table on read.
    pub username: String,
    pub progress_summary: Option<String>,
    pub completed_items: Option<String>,
    pub result_output: Option<String>,
    pub problems_encountered: Option<String>,
    pub next_plan: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// LITERATURE
// =============================================================================

/// A literature reference with an optional attachment descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Literature {
    pub id: i64,
    #[serde(skip)]
    pub user_id: i64,
    pub title: String,
    pub authors: String,
    pub journal: Option<String>,
    pub year: Option<i32>,
    pub keywords: Option<String>,
    #[serde(rename = "abstract")]
    #[sqlx(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// PERSONAL LOGS
// =============================================================================

/// A free-form daily log entry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserLog {
    pub id: i64,
    pub user_id: i64,
    /// Denormalized copy of the owner's username.
    pub username: String,
    pub title: Option<String>,
    pub content: String,
    pub log_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// ATTACHMENTS
// =============================================================================

/// Metadata returned after an attachment has been persisted.
///
/// The client passes `file_path`, `file_name`, `file_size` and `file_type`
/// back when creating the literature record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Client-facing location: a relative path or a public URL.
    pub file_path: String,
    /// Generated `literature-<epoch_ms>-<random>.<ext>` name.
    pub stored_name: String,
    /// Name of the file as uploaded.
    pub file_name: String,
    pub file_size: i64,
    pub file_type: String,
    /// Bucket key, present only for object storage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
}
