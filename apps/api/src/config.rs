use anyhow::{Context, Result};

/// Where candidate résumés are read from.
///
/// `DATABASE_URL` selects the Postgres store; otherwise `CORPUS_PATH` must
/// point at a JSON corpus file loaded at startup.
#[derive(Debug, Clone)]
pub enum CorpusBackend {
    Postgres(String),
    File(String),
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub corpus_backend: CorpusBackend,
    /// "keyword" (default, deterministic) or "llm" — swapped at startup.
    pub reranker_backend: String,
    /// Concurrent per-candidate evaluations. Bounds load on the reasoning service.
    pub scoring_concurrency: usize,
    /// Retrieval fetches `top_n × overfetch` candidates to leave room for reranking.
    pub retrieval_overfetch: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let corpus_backend = match std::env::var("DATABASE_URL") {
            Ok(url) => CorpusBackend::Postgres(url),
            Err(_) => CorpusBackend::File(
                require_env("CORPUS_PATH")
                    .context("Set DATABASE_URL or CORPUS_PATH to locate the candidate corpus")?,
            ),
        };

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            corpus_backend,
            reranker_backend: std::env::var("RERANKER_BACKEND")
                .unwrap_or_else(|_| "keyword".to_string()),
            scoring_concurrency: env_usize("SCORING_CONCURRENCY", 4)?,
            retrieval_overfetch: env_usize("RETRIEVAL_OVERFETCH", 4)?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_usize(key: &str, default: usize) -> Result<usize> {
    match std::env::var(key) {
        Ok(v) => v
            .parse::<usize>()
            .with_context(|| format!("{key} must be a positive integer")),
        Err(_) => Ok(default),
    }
}
