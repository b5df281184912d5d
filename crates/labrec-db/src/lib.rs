//! # labrec-db
//!
//! PostgreSQL database layer for labrec.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for users, experiments, thesis progress,
//!   literature and personal logs
//! - Attachment storage backends (filesystem, HTTP object storage)
//!
//! ## Example
//!
//! ```rust,ignore
//! use labrec_db::{Database, PoolConfig, UserRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("postgres://localhost/labrec", PoolConfig::default()).await?;
//!     let id = db.users.resolve_id("alice").await?;
//!     println!("alice -> {:?}", id);
//!     db.close().await;
//!     Ok(())
//! }
//! ```
pub mod experiments;
pub mod file_storage;
pub mod literature;
pub mod logs;
pub mod pool;
pub mod progress;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use labrec_core::*;

pub use experiments::PgExperimentRepository;
pub use file_storage::{FilesystemBackend, ObjectStoreBackend, StorageBackend};
pub use literature::PgLiteratureRepository;
pub use logs::PgLogRepository;
pub use pool::{log_pool_metrics, open_pool, PoolConfig};
pub use progress::PgProgressRepository;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
///
/// Opened once at process start and shared by every handler; cloning is
/// cheap because every repository holds the same pool handle.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Provisioned user lookups.
    pub users: PgUserRepository,
    /// Experiment log repository.
    pub experiments: PgExperimentRepository,
    /// Thesis progress repository.
    pub progress: PgProgressRepository,
    /// Literature reference repository.
    pub literature: PgLiteratureRepository,
    /// Personal log repository.
    pub logs: PgLogRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            experiments: PgExperimentRepository::new(pool.clone()),
            progress: PgProgressRepository::new(pool.clone()),
            literature: PgLiteratureRepository::new(pool.clone()),
            logs: PgLogRepository::new(pool.clone()),
            pool,
        }
    }

    /// Open a pool against `url` and build every repository on it.
    pub async fn open(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = open_pool(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Close every pooled connection. Pending acquisitions fail afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!(
            subsystem = "database",
            component = "pool",
            op = "close",
            "Database connection pool closed"
        );
    }
}

#[async_trait::async_trait]
impl StoreHealth for Database {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        log_pool_metrics(&self.pool);
        Ok(())
    }
}
