//! Literature reference repository.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::debug;

use labrec_core::{CreateLiteratureRequest, Error, Literature, LiteratureRepository, Result};

/// PostgreSQL literature repository.
#[derive(Clone)]
pub struct PgLiteratureRepository {
    pool: Pool<Postgres>,
}

impl PgLiteratureRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LiteratureRepository for PgLiteratureRepository {
    async fn insert(&self, req: CreateLiteratureRequest) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO literature
                (user_id, title, authors, journal, year, keywords, "abstract", link,
                 notes, file_path, file_name, file_size, file_type)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING id"#,
        )
        .bind(req.user_id)
        .bind(&req.title)
        .bind(&req.authors)
        .bind(&req.journal)
        .bind(req.year)
        .bind(&req.keywords)
        .bind(&req.abstract_text)
        .bind(&req.link)
        .bind(&req.notes)
        .bind(&req.file_path)
        .bind(&req.file_name)
        .bind(req.file_size)
        .bind(&req.file_type)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "literature",
            op = "insert",
            literature_id = id,
            has_attachment = req.file_path.is_some(),
            "Literature record inserted"
        );
        Ok(id)
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Literature>> {
        sqlx::query_as::<_, Literature>(
            r#"SELECT id, user_id, title, authors, journal, year, keywords, "abstract", link,
                      notes, file_path, file_name, file_size, file_type, created_at
             FROM literature
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)
    }
}
