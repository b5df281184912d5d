//! Personal log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use labrec_core::{CreateLogRequest, Error, LogRepository, Result, UserLog, RECENT_LOGS_LIMIT};

/// PostgreSQL personal log repository.
#[derive(Clone)]
pub struct PgLogRepository {
    pool: Pool<Postgres>,
}

impl PgLogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogRepository for PgLogRepository {
    async fn insert(&self, req: CreateLogRequest) -> Result<UserLog> {
        sqlx::query_as::<_, UserLog>(
            "INSERT INTO user_logs (user_id, username, title, content, log_date)
             VALUES ($1, $2, $3, $4,
                     ((now() AT TIME ZONE 'UTC')
                      + make_interval(secs => $5::double precision))::date)
             RETURNING id, user_id, username, title, content, log_date, created_at",
        )
        .bind(req.user_id)
        .bind(&req.username)
        .bind(&req.title)
        .bind(&req.content)
        // log_date is the calendar day of created_at in the configured offset
        .bind(f64::from(req.day_offset.local_minus_utc()))
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn list_recent(&self, user_id: i64) -> Result<Vec<UserLog>> {
        sqlx::query_as::<_, UserLog>(
            "SELECT id, user_id, username, title, content, log_date, created_at
             FROM user_logs
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2",
        )
        .bind(user_id)
        .bind(RECENT_LOGS_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn list_between(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<UserLog>> {
        sqlx::query_as::<_, UserLog>(
            "SELECT id, user_id, username, title, content, log_date, created_at
             FROM user_logs
             WHERE user_id = $1 AND created_at >= $2 AND created_at < $3
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }
}
