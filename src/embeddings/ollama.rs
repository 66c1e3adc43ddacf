//! Ollama embeddings client.
//!
//! Talks to the `/api/embed` endpoint of a local Ollama instance and
//! caches results by content hash so repeated texts never hit the
//! network twice.

use super::Embedder;
use crate::cache::EmbeddingCache;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Configures the Ollama client.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    pub cache_size: usize,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: env_or("OLLAMA_HOST", "http://localhost:11434"),
            model: env_or("EMBEDDING_MODEL", "nomic-embed-text"),
            // nomic-embed-text dimensions
            dimensions: 768,
            cache_size: 1000,
            timeout: Duration::from_secs(30),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Option<Vec<Vec<f32>>>,
}

/// Embedder backed by an Ollama HTTP endpoint.
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    dims: usize,
    client: reqwest::blocking::Client,
    cache: EmbeddingCache,

    requests: AtomicU64,
    /// Cumulative request latency in microseconds.
    latency_us: AtomicU64,
}

impl OllamaEmbedder {
    pub fn new(mut cfg: OllamaConfig) -> Result<Self> {
        let defaults = OllamaConfig::default();
        if cfg.base_url.is_empty() {
            cfg.base_url = defaults.base_url;
        }
        if cfg.model.is_empty() {
            cfg.model = defaults.model;
        }
        if cfg.cache_size == 0 {
            cfg.cache_size = defaults.cache_size;
        }
        if cfg.timeout.is_zero() {
            cfg.timeout = defaults.timeout;
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(cfg.timeout)
            .build()?;

        Ok(Self {
            base_url: cfg.base_url,
            model: cfg.model,
            dims: cfg.dimensions,
            client,
            cache: EmbeddingCache::new(cfg.cache_size),
            requests: AtomicU64::new(0),
            latency_us: AtomicU64::new(0),
        })
    }

    /// Verifies the endpoint is reachable and the model answers.
    pub fn ping(&self) -> Result<()> {
        self.embed("ping").map(|_| ())
    }

    /// (requests, average latency ms, cache hit rate %).
    pub fn stats(&self) -> (u64, f64, f64) {
        let requests = self.requests.load(Ordering::Relaxed);
        let avg_latency_ms = if requests > 0 {
            self.latency_us.load(Ordering::Relaxed) as f64 / requests as f64 / 1000.0
        } else {
            0.0
        };
        let (_, _, hit_rate) = self.cache.stats();
        (requests, avg_latency_ms, hit_rate)
    }

    fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embed", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                input: text,
            })
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(Error::EmbedderBadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbedResponse = serde_json::from_str(&body)
            .map_err(|e| Error::MalformedResponse(e.to_string()))?;

        let mut rows = parsed
            .embeddings
            .ok_or_else(|| Error::MalformedResponse("no embeddings in response".to_string()))?;
        if rows.is_empty() {
            return Err(Error::MalformedResponse(
                "empty embeddings array".to_string(),
            ));
        }
        Ok(rows.swap_remove(0))
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(embedding) = self.cache.get(text) {
            return Ok(embedding);
        }

        let start = Instant::now();
        let embedding = self.request_embedding(text)?;

        self.requests.fetch_add(1, Ordering::Relaxed);
        self.latency_us
            .fetch_add(start.elapsed().as_micros() as u64, Ordering::Relaxed);

        self.cache.put(text, &embedding);
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn model(&self) -> &str {
        &self.model
    }
}
