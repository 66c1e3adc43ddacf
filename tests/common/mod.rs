//! Shared test fixtures: a deterministic embedder and a service factory.
#![allow(dead_code)]

use moneta::chunking::CodeChunker;
use moneta::embeddings::Embedder;
use moneta::memory::{MemoryService, ServiceConfig};
use moneta::store::{SqliteStore, StoreConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

pub const DIMS: usize = 16;

/// Deterministic text-to-vector stand-in: equal texts map to equal
/// vectors, so exact-content queries score 1.0.
pub struct StubEmbedder {
    dims: usize,
    calls: Arc<AtomicUsize>,
}

impl StubEmbedder {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Embedder for StubEmbedder {
    fn embed(&self, text: &str) -> moneta::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let mut v = vec![0.0f32; self.dims];
        for (i, b) in text.bytes().enumerate() {
            v[i % self.dims] += b as f32 / 255.0;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn model(&self) -> &str {
        "stub-embedder"
    }
}

/// A service over a temp-dir store and the stub embedder. The TempDir
/// must outlive the service.
pub fn service() -> (TempDir, MemoryService) {
    service_with_embedder(StubEmbedder::new(DIMS))
}

pub fn service_with_embedder(embedder: StubEmbedder) -> (TempDir, MemoryService) {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(StoreConfig {
        path: dir.path().join("moneta.db"),
        dimensions: DIMS,
    })
    .unwrap();

    let svc = MemoryService::new(
        store,
        Box::new(embedder),
        Box::new(CodeChunker::new(1500, 100)),
        ServiceConfig::default(),
    );
    (dir, svc)
}
