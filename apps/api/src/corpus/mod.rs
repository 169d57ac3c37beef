//! Corpus Store — the external collaborator holding candidate résumés.
//!
//! The pipeline only ever reads: `search` is the sole operation, and the
//! trait seam lets tests substitute an in-memory fake for the real store.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod file;
pub mod postgres;

pub use file::FileCorpusStore;
pub use postgres::PgCorpusStore;

/// A candidate résumé as stored in the corpus. Read-only to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Unique, stable id within the corpus.
    pub id: i64,
    /// Unprocessed résumé text.
    pub raw_text: String,
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("corpus store unavailable: {0}")]
    Unavailable(String),

    #[error("corpus query failed: {0}")]
    Query(String),
}

/// Read-only search capability over the candidate corpus.
///
/// `search` is approximate relevance search, not exact match: on a non-empty
/// corpus it returns up to `limit` candidates ordered by relevance. An empty
/// corpus yields an empty result, not an error.
#[async_trait]
pub trait CorpusStore: Send + Sync {
    async fn search(
        &self,
        query_terms: &[String],
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, CorpusError>;
}
