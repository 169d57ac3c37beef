//! Postgres-backed corpus store using full-text search over the
//! `candidates` table (`id BIGINT PRIMARY KEY, raw_text TEXT NOT NULL`).

use async_trait::async_trait;
use sqlx::PgPool;

use crate::corpus::{CandidateRecord, CorpusError, CorpusStore};

pub struct PgCorpusStore {
    pool: PgPool,
}

impl PgCorpusStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CandidateRow {
    id: i64,
    raw_text: String,
}

#[async_trait]
impl CorpusStore for PgCorpusStore {
    async fn search(
        &self,
        query_terms: &[String],
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, CorpusError> {
        let query = query_terms.join(" ");

        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT id, raw_text
            FROM candidates
            WHERE to_tsvector('english', raw_text) @@ plainto_tsquery('english', $1)
            ORDER BY ts_rank(to_tsvector('english', raw_text),
                             plainto_tsquery('english', $1)) DESC,
                     id ASC
            LIMIT $2
            "#,
        )
        .bind(&query)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        Ok(rows
            .into_iter()
            .map(|r| CandidateRecord {
                id: r.id,
                raw_text: r.raw_text,
            })
            .collect())
    }
}

fn classify(err: sqlx::Error) -> CorpusError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            CorpusError::Unavailable(err.to_string())
        }
        _ => CorpusError::Query(err.to_string()),
    }
}
