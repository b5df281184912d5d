//! Core traits for labrec abstractions.
//!
//! These traits define the single data-access interface every handler talks
//! to. The PostgreSQL implementations live in `labrec-db`.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::error::Result;
use crate::models::*;

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Read-only access to provisioned users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user row by exact (case-sensitive) username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Resolve a username to its store-assigned identifier.
    ///
    /// `Ok(None)` means no such user; `Err` means the store failed.
    async fn resolve_id(&self, username: &str) -> Result<Option<i64>>;
}

// =============================================================================
// EXPERIMENT REPOSITORY
// =============================================================================

/// Request for recording an experiment.
#[derive(Debug, Clone, Default)]
pub struct CreateExperimentRequest {
    pub user_id: i64,
    pub exp_name: Option<String>,
    pub exp_date: Option<NaiveDate>,
    pub exp_data: Option<String>,
    pub exp_note: Option<String>,
}

#[async_trait]
pub trait ExperimentRepository: Send + Sync {
    /// Insert an experiment, returning its new id.
    async fn insert(&self, req: CreateExperimentRequest) -> Result<i64>;

    /// All experiments for a user, newest `exp_date` first (undated last),
    /// ties broken by newest id.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Experiment>>;
}

// =============================================================================
// THESIS PROGRESS REPOSITORY
// =============================================================================

/// Request for appending a progress update.
#[derive(Debug, Clone, Default)]
pub struct CreateProgressRequest {
    pub user_id: i64,
    pub progress_summary: Option<String>,
    pub completed_items: Option<String>,
    pub result_output: Option<String>,
    pub problems_encountered: Option<String>,
    pub next_plan: Option<String>,
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Append a progress update, returning its new id.
    async fn insert(&self, req: CreateProgressRequest) -> Result<i64>;

    /// All progress updates for a user, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<ThesisProgress>>;
}

// =============================================================================
// LITERATURE REPOSITORY
// =============================================================================

/// Request for creating a literature record.
#[derive(Debug, Clone, Default)]
pub struct CreateLiteratureRequest {
    pub user_id: i64,
    pub title: String,
    pub authors: String,
    pub journal: Option<String>,
    pub year: Option<i32>,
    pub keywords: Option<String>,
    pub abstract_text: Option<String>,
    pub link: Option<String>,
    pub notes: Option<String>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
}

#[async_trait]
pub trait LiteratureRepository: Send + Sync {
    /// Insert a literature record, returning its new id.
    async fn insert(&self, req: CreateLiteratureRequest) -> Result<i64>;

    /// All literature for a user, newest first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Literature>>;
}

// =============================================================================
// PERSONAL LOG REPOSITORY
// =============================================================================

/// Maximum number of entries returned by [`LogRepository::list_recent`].
pub const RECENT_LOGS_LIMIT: i64 = 500;

/// Request for writing a personal log entry.
#[derive(Debug, Clone)]
pub struct CreateLogRequest {
    pub user_id: i64,
    pub username: String,
    pub title: Option<String>,
    pub content: String,
    /// Offset `log_date` is computed in; the same one day queries use.
    pub day_offset: FixedOffset,
}

#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Insert a log entry and return the persisted row, including
    /// store-assigned `id`, `log_date` and `created_at`.
    async fn insert(&self, req: CreateLogRequest) -> Result<UserLog>;

    /// Up to [`RECENT_LOGS_LIMIT`] most recent entries, newest first.
    async fn list_recent(&self, user_id: i64) -> Result<Vec<UserLog>>;

    /// Entries with `from <= created_at < to`, newest first.
    async fn list_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<UserLog>>;
}

// =============================================================================
// STORE HEALTH
// =============================================================================

/// Liveness check for the backing store.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// Succeeds when the store answers a trivial query.
    async fn ping(&self) -> Result<()>;
}
