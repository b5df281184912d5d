//! # labrec-api
//!
//! HTTP API for labrec. Every endpoint is a short sequence: resolve the
//! username, run one repository call, shape a JSON response.
//!
//! The binary in `main.rs` wires configuration, logging and the PostgreSQL
//! pool; everything reachable over HTTP is assembled by [`build_router`] so
//! tests can drive it with in-memory repositories.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, FromRequest, FromRequestParts},
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;
use uuid::Uuid;

use labrec_core::{
    ExperimentRepository, LiteratureRepository, LogRepository, ProgressRepository, StoreHealth,
    UserRepository, MAX_UPLOAD_BYTES,
};
use labrec_db::{Database, StorageBackend};

pub mod body_types;
pub mod config;
pub mod error;
pub mod handlers;
pub mod resolve;

pub use config::{ApiConfig, StorageConfig};
pub use error::{ApiError, ErrorStyle};

/// Request body ceiling. Kept above the attachment limit so oversized
/// uploads reach the upload handler and get its size-specific answer.
pub const REQUEST_BODY_LIMIT: usize = MAX_UPLOAD_BYTES as usize + 1024 * 1024;

/// Route under which filesystem-backed attachments are served.
pub const UPLOAD_ROUTE: &str = "/uploads/literature";

// =============================================================================
// STATE
// =============================================================================

/// Shared handler state. Constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub experiments: Arc<dyn ExperimentRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub literature: Arc<dyn LiteratureRepository>,
    pub logs: Arc<dyn LogRepository>,
    pub health: Arc<dyn StoreHealth>,
    pub storage: Arc<dyn StorageBackend>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Wire every repository to the PostgreSQL implementations.
    pub fn from_database(
        db: Database,
        storage: Arc<dyn StorageBackend>,
        config: Arc<ApiConfig>,
    ) -> Self {
        Self {
            users: Arc::new(db.users.clone()),
            experiments: Arc::new(db.experiments.clone()),
            progress: Arc::new(db.progress.clone()),
            literature: Arc::new(db.literature.clone()),
            logs: Arc::new(db.logs.clone()),
            health: Arc::new(db),
            storage,
            config,
        }
    }
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// JSON body whose rejections render as `{success:false, error}`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejections render as `{success:false, error}`.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// ROUTER
// =============================================================================

fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let origin = match allowed_origins {
        None => AllowOrigin::from(Any),
        Some(origins) => {
            let values: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        warn!(origin = %o, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            AllowOrigin::list(values)
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the application router with every endpoint and middleware layer.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.allowed_origins.as_deref());

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/login", post(handlers::auth::login))
        .route("/addExperiment", post(handlers::experiments::add_experiment))
        .route("/getExperiments", get(handlers::experiments::get_experiments))
        .route("/saveProgress", post(handlers::progress::save_progress))
        .route("/getProgress", get(handlers::progress::get_progress))
        .route(
            "/uploadLiteratureFile",
            post(handlers::literature::upload_literature_file),
        )
        .route("/addLiterature", post(handlers::literature::add_literature))
        .route("/getLiterature", get(handlers::literature::get_literature))
        .route("/addLog", post(handlers::logs::add_log))
        .route("/getLogs", get(handlers::logs::get_logs))
        .route("/getLogsByDate", get(handlers::logs::get_logs_by_date));

    // Attachments written to local disk are downloadable at the path the
    // upload response reports.
    if let StorageConfig::Filesystem { upload_dir } = &state.config.storage {
        router = router.nest_service(UPLOAD_ROUTE, ServeDir::new(upload_dir));
    }

    router
        .layer(DefaultBodyLimit::max(REQUEST_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors)
        .with_state(state)
}
