//! Thesis progress repository.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use labrec_core::{CreateProgressRequest, Error, ProgressRepository, Result, ThesisProgress};

/// PostgreSQL thesis progress repository.
#[derive(Clone)]
pub struct PgProgressRepository {
    pool: Pool<Postgres>,
}

impl PgProgressRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressRepository for PgProgressRepository {
    async fn insert(&self, req: CreateProgressRequest) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO thesis_progress
                (user_id, progress_summary, completed_items, result_output,
                 problems_encountered, next_plan)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(req.user_id)
        .bind(&req.progress_summary)
        .bind(&req.completed_items)
        .bind(&req.result_output)
        .bind(&req.problems_encountered)
        .bind(&req.next_plan)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<ThesisProgress>> {
        sqlx::query_as::<_, ThesisProgress>(
            "SELECT tp.id, tp.user_id, u.username, tp.progress_summary, tp.completed_items,
                    tp.result_output, tp.problems_encountered, tp.next_plan, tp.created_at
             FROM thesis_progress tp
             JOIN users u ON tp.user_id = u.id
             WHERE tp.user_id = $1
             ORDER BY tp.created_at DESC, tp.id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }
}
