//! Shared harness for API tests.
//!
//! Drives the real router with `tower::ServiceExt::oneshot` over an
//! in-memory store and a temporary upload directory.

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use labrec_api::{build_router, ApiConfig, AppState, StorageConfig, UPLOAD_ROUTE};
use labrec_core::{
    CreateExperimentRequest, CreateLiteratureRequest, CreateLogRequest, CreateProgressRequest,
    Error, Experiment, ExperimentRepository, Literature, LiteratureRepository, LogRepository,
    ProgressRepository, Result, StoreHealth, ThesisProgress, User, UserLog, UserRepository,
    local_day, RECENT_LOGS_LIMIT,
};
use labrec_db::{FilesystemBackend, ObjectStoreBackend};

pub const BOUNDARY: &str = "labrec-test-boundary";

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// In-memory stand-in for every repository.
///
/// `fail_lookups` makes user resolution fail; `fail_records` makes every
/// record read and write fail while lookups still succeed.
#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicI64,
    pub users: Mutex<Vec<User>>,
    pub experiments: Mutex<Vec<Experiment>>,
    pub progress: Mutex<Vec<ThesisProgress>>,
    pub literature: Mutex<Vec<Literature>>,
    pub logs: Mutex<Vec<UserLog>>,
    /// Offset passed with the most recent log insert.
    pub last_day_offset: Mutex<Option<FixedOffset>>,
    pub fail_lookups: AtomicBool,
    pub fail_records: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn check_records(&self) -> Result<()> {
        if self.fail_records.load(Ordering::SeqCst) {
            return Err(Error::Internal("store offline".to_string()));
        }
        Ok(())
    }

    pub fn add_user(&self, username: &str, password: &str, name: Option<&str>) -> i64 {
        let id = self.id();
        self.users.lock().unwrap().push(User {
            id,
            username: username.to_string(),
            password: password.to_string(),
            name: name.map(str::to_string),
        });
        id
    }

    /// Insert a log with an explicit creation time.
    pub fn add_log_at(
        &self,
        user_id: i64,
        username: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> i64 {
        let id = self.id();
        self.logs.lock().unwrap().push(UserLog {
            id,
            user_id,
            username: username.to_string(),
            title: None,
            content: content.to_string(),
            log_date: at.date_naive(),
            created_at: at,
        });
        id
    }

    pub fn experiment_count(&self) -> usize {
        self.experiments.lock().unwrap().len()
    }

    pub fn literature_count(&self) -> usize {
        self.literature.lock().unwrap().len()
    }

    pub fn log_count(&self) -> usize {
        self.logs.lock().unwrap().len()
    }
}

fn newest_first<T, F>(mut rows: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> (DateTime<Utc>, i64),
{
    rows.sort_by_key(|r| std::cmp::Reverse(key(r)));
    rows
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(Error::Internal("store offline".to_string()));
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn resolve_id(&self, username: &str) -> Result<Option<i64>> {
        Ok(self.find_by_username(username).await?.map(|u| u.id))
    }
}

#[async_trait]
impl ExperimentRepository for MemoryStore {
    async fn insert(&self, req: CreateExperimentRequest) -> Result<i64> {
        self.check_records()?;
        let id = self.id();
        self.experiments.lock().unwrap().push(Experiment {
            id,
            user_id: req.user_id,
            exp_name: req.exp_name,
            exp_date: req.exp_date,
            exp_data: req.exp_data,
            exp_note: req.exp_note,
        });
        Ok(id)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Experiment>> {
        self.check_records()?;
        let mut rows: Vec<Experiment> = self
            .experiments
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        // Dated before undated, newest date first, then newest id.
        rows.sort_by(|a, b| {
            b.exp_date
                .is_some()
                .cmp(&a.exp_date.is_some())
                .then(b.exp_date.cmp(&a.exp_date))
                .then(b.id.cmp(&a.id))
        });
        Ok(rows)
    }
}

#[async_trait]
impl ProgressRepository for MemoryStore {
    async fn insert(&self, req: CreateProgressRequest) -> Result<i64> {
        self.check_records()?;
        let id = self.id();
        let username = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == req.user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default();
        self.progress.lock().unwrap().push(ThesisProgress {
            id,
            user_id: req.user_id,
            username,
            progress_summary: req.progress_summary,
            completed_items: req.completed_items,
            result_output: req.result_output,
            problems_encountered: req.problems_encountered,
            next_plan: req.next_plan,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<ThesisProgress>> {
        self.check_records()?;
        let rows: Vec<ThesisProgress> = self
            .progress
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |p| (p.created_at, p.id)))
    }
}

#[async_trait]
impl LiteratureRepository for MemoryStore {
    async fn insert(&self, req: CreateLiteratureRequest) -> Result<i64> {
        self.check_records()?;
        let id = self.id();
        self.literature.lock().unwrap().push(Literature {
            id,
            user_id: req.user_id,
            title: req.title,
            authors: req.authors,
            journal: req.journal,
            year: req.year,
            keywords: req.keywords,
            abstract_text: req.abstract_text,
            link: req.link,
            notes: req.notes,
            file_path: req.file_path,
            file_name: req.file_name,
            file_size: req.file_size,
            file_type: req.file_type,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Literature>> {
        self.check_records()?;
        let rows: Vec<Literature> = self
            .literature
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |l| (l.created_at, l.id)))
    }
}

#[async_trait]
impl LogRepository for MemoryStore {
    async fn insert(&self, req: CreateLogRequest) -> Result<UserLog> {
        self.check_records()?;
        *self.last_day_offset.lock().unwrap() = Some(req.day_offset);
        let now = Utc::now();
        let log = UserLog {
            id: self.id(),
            user_id: req.user_id,
            username: req.username,
            title: req.title,
            content: req.content,
            log_date: local_day(now, req.day_offset),
            created_at: now,
        };
        self.logs.lock().unwrap().push(log.clone());
        Ok(log)
    }

    async fn list_recent(&self, user_id: i64) -> Result<Vec<UserLog>> {
        self.check_records()?;
        let rows: Vec<UserLog> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        let mut rows = newest_first(rows, |l| (l.created_at, l.id));
        rows.truncate(RECENT_LOGS_LIMIT as usize);
        Ok(rows)
    }

    async fn list_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<UserLog>> {
        self.check_records()?;
        let rows: Vec<UserLog> = self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == user_id && l.created_at >= from && l.created_at < to)
            .cloned()
            .collect();
        Ok(newest_first(rows, |l| (l.created_at, l.id)))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<()> {
        self.check_records()
    }
}

// =============================================================================
// TEST APP
// =============================================================================

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(ApiConfig::default())
    }

    /// Build an app around `config`, pointing filesystem storage at a
    /// fresh temporary directory.
    pub fn with_config(mut config: ApiConfig) -> Self {
        let upload_dir = TempDir::new().unwrap();
        config.storage = StorageConfig::Filesystem {
            upload_dir: upload_dir.path().to_path_buf(),
        };
        let store = MemoryStore::new();
        let storage = FilesystemBackend::new(upload_dir.path())
            .with_public_prefix(UPLOAD_ROUTE.trim_start_matches('/'));
        let state = AppState {
            users: store.clone(),
            experiments: store.clone(),
            progress: store.clone(),
            literature: store.clone(),
            logs: store.clone(),
            health: store.clone(),
            storage: Arc::new(storage),
            config: Arc::new(config),
        };
        Self {
            store,
            state,
            upload_dir,
        }
    }

    /// Build an app whose attachments go to an object store at `endpoint`.
    pub fn with_object_store(endpoint: &str, token: Option<&str>) -> Self {
        let mut app = Self::new();
        let storage = ObjectStoreBackend::new(
            endpoint,
            "literature",
            token.map(str::to_string),
            Some("https://cdn.example.com/public".to_string()),
        );
        let mut config = (*app.state.config).clone();
        config.storage = StorageConfig::Object {
            endpoint: endpoint.to_string(),
            bucket: "literature".to_string(),
            token: token.map(str::to_string),
            public_url: Some("https://cdn.example.com/public".to_string()),
        };
        app.state.storage = Arc::new(storage);
        app.state.config = Arc::new(config);
        app
    }

    pub fn upload_path(&self) -> &Path {
        self.upload_dir.path()
    }

    /// Send a request and decode the JSON body (`Value::Null` if not JSON).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(request).await;
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = build_router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(post_json(uri, body)).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(get(uri)).await
    }
}

// =============================================================================
// REQUEST BUILDERS
// =============================================================================

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a multipart upload with one file part.
pub fn multipart_upload(
    field: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    multipart_request(body)
}

/// Build a multipart body carrying only a plain text field.
pub fn multipart_text_only(field: &str, value: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"\r\n\r\n{v}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = field,
        v = value
    );
    multipart_request(body.into_bytes())
}

fn multipart_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/uploadLiteratureFile")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}
