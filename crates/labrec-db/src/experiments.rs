//! Experiment log repository.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use labrec_core::{CreateExperimentRequest, Error, Experiment, ExperimentRepository, Result};

/// PostgreSQL experiment repository.
#[derive(Clone)]
pub struct PgExperimentRepository {
    pool: Pool<Postgres>,
}

impl PgExperimentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExperimentRepository for PgExperimentRepository {
    async fn insert(&self, req: CreateExperimentRequest) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO experiments (user_id, exp_name, exp_date, exp_data, exp_note)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(req.user_id)
        .bind(&req.exp_name)
        .bind(req.exp_date)
        .bind(&req.exp_data)
        .bind(&req.exp_note)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Experiment>> {
        // DESC alone would sort NULL dates first in PostgreSQL.
        sqlx::query_as::<_, Experiment>(
            "SELECT id, user_id, exp_name, exp_date, exp_data, exp_note
             FROM experiments
             WHERE user_id = $1
             ORDER BY exp_date DESC NULLS LAST, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }
}
