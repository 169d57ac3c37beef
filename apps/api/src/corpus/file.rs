//! File-backed corpus store — a JSON array of candidate records loaded into
//! memory at startup, searched with term-frequency scoring.
//!
//! This is the default backend for local datasets and the model for test
//! fakes; the Postgres backend covers real deployments.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::corpus::{CandidateRecord, CorpusError, CorpusStore};

pub struct FileCorpusStore {
    records: Vec<CandidateRecord>,
}

impl FileCorpusStore {
    /// Loads a corpus from a JSON file containing `[{"id": .., "raw_text": ..}, ..]`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus file {}", path.display()))?;
        let records: Vec<CandidateRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("Corpus file {} is not a JSON record array", path.display()))?;

        info!("Loaded {} candidate records from {}", records.len(), path.display());
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<CandidateRecord>) -> Self {
        Self { records }
    }

    /// Total term occurrences across the record text, case-insensitive.
    fn relevance(record: &CandidateRecord, query_terms: &[String]) -> usize {
        let text = record.raw_text.to_lowercase();
        query_terms
            .iter()
            .map(|term| text.matches(term.as_str()).count())
            .sum()
    }
}

#[async_trait]
impl CorpusStore for FileCorpusStore {
    async fn search(
        &self,
        query_terms: &[String],
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, CorpusError> {
        let mut scored: Vec<(usize, &CandidateRecord)> = self
            .records
            .iter()
            .map(|r| (Self::relevance(r, query_terms), r))
            .filter(|(score, _)| *score > 0)
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.id.cmp(&b.1.id)));

        if scored.is_empty() {
            // Approximate retrieval never comes back empty-handed on a
            // non-empty corpus: fall back to id order.
            let mut all: Vec<CandidateRecord> = self.records.clone();
            all.sort_by_key(|r| r.id);
            all.truncate(limit);
            return Ok(all);
        }

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, r)| r.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(id: i64, text: &str) -> CandidateRecord {
        CandidateRecord {
            id,
            raw_text: text.to_string(),
        }
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[tokio::test]
    async fn test_search_ranks_by_term_frequency() {
        let store = FileCorpusStore::from_records(vec![
            make_record(1, "Java developer"),
            make_record(2, "Rust engineer. Rust systems work. Rust tooling."),
            make_record(3, "Rust beginner"),
        ]);

        let hits = store.search(&terms(&["rust"]), 10).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, 2, "most mentions first");
        assert_eq!(hits[1].id, 3);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let records = (0..20)
            .map(|i| make_record(i, "python data pipelines"))
            .collect();
        let store = FileCorpusStore::from_records(records);

        let hits = store.search(&terms(&["python"]), 5).await.unwrap();
        assert_eq!(hits.len(), 5);
    }

    #[tokio::test]
    async fn test_search_ties_broken_by_id() {
        let store = FileCorpusStore::from_records(vec![
            make_record(7, "golang services"),
            make_record(3, "golang services"),
        ]);

        let hits = store.search(&terms(&["golang"]), 10).await.unwrap();
        assert_eq!(hits[0].id, 3);
        assert_eq!(hits[1].id, 7);
    }

    #[tokio::test]
    async fn test_empty_corpus_yields_empty_result() {
        let store = FileCorpusStore::from_records(vec![]);
        let hits = store.search(&terms(&["rust"]), 10).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_no_term_match_falls_back_to_id_order() {
        let store = FileCorpusStore::from_records(vec![
            make_record(5, "embedded firmware"),
            make_record(2, "frontend design"),
        ]);

        let hits = store.search(&terms(&["haskell"]), 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }
}
