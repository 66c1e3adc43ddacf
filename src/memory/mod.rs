//! The memory service: orchestrates the chunker, embedder, and store.
//!
//! This is a thin layer; it mints ids and timestamps, applies defaults,
//! batches embedding calls, and walks directories for indexing. All of
//! the heavy lifting lives in the components it composes.

use crate::chunking::Chunker;
use crate::embeddings::Embedder;
use crate::error::{Error, Result};
use crate::paths;
use crate::store::{ListOptions, SearchOptions, SqliteStore};
use crate::types::{
    AddMemoryRequest, IndexRequest, Memory, MemoryType, SearchRequest, SearchResponse,
    StatsResponse,
};
use chrono::Utc;
use glob::Pattern;
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

/// File extensions the indexer will touch (lowercase, with dot).
const INDEXABLE_EXTENSIONS: &[&str] = &[
    ".go", ".py", ".js", ".ts", ".tsx", ".jsx", ".rs", ".java", ".c", ".cpp", ".h", ".hpp", ".rb",
    ".php", ".swift", ".kt", ".cs", ".md", ".txt", ".yaml", ".yml", ".toml", ".json", ".sql",
    ".sh",
];

/// Configures the memory service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Batch size for embedding generation during indexing.
    pub embed_batch_size: usize,
    /// Glob patterns skipped during directory walks; a matching
    /// directory prunes its whole subtree.
    pub index_ignore: Vec<String>,
    /// Project used when a request does not name one.
    pub default_project: String,
    pub search_limit: usize,
    pub search_threshold: f32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            embed_batch_size: 50,
            index_ignore: [
                ".git",
                "node_modules",
                "vendor",
                "__pycache__",
                ".venv",
                "dist",
                "build",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            default_project: "default".to_string(),
            search_limit: 10,
            search_threshold: 0.5,
        }
    }
}

pub struct MemoryService {
    store: SqliteStore,
    embedder: Box<dyn Embedder>,
    chunker: Box<dyn Chunker>,
    config: ServiceConfig,
}

impl MemoryService {
    pub fn new(
        store: SqliteStore,
        embedder: Box<dyn Embedder>,
        chunker: Box<dyn Chunker>,
        mut config: ServiceConfig,
    ) -> Self {
        let defaults = ServiceConfig::default();
        if config.embed_batch_size == 0 {
            config.embed_batch_size = defaults.embed_batch_size;
        }
        if config.default_project.is_empty() {
            config.default_project = defaults.default_project;
        }
        if config.search_limit == 0 {
            config.search_limit = defaults.search_limit;
        }
        if config.search_threshold <= 0.0 {
            config.search_threshold = defaults.search_threshold;
        }
        Self {
            store,
            embedder,
            chunker,
            config,
        }
    }

    /// Creates a new memory with automatic embedding generation.
    pub fn add(&self, req: AddMemoryRequest) -> Result<Memory> {
        if req.content.is_empty() {
            return Err(Error::InvalidArgument("content is required".to_string()));
        }

        let project = if req.project.is_empty() {
            self.config.default_project.clone()
        } else {
            req.project
        };
        let memory_type = req.memory_type.unwrap_or_default();

        let embedding = self.embedder.embed(&req.content)?;

        let now = Utc::now();
        let mut memory = Memory {
            id: Uuid::new_v4().to_string(),
            content: req.content,
            project,
            memory_type,
            file_path: req.file_path,
            language: req.language,
            metadata: req.metadata,
            embedding,
            created_at: now,
            updated_at: now,
        };

        self.store.add(&mut memory)?;
        Ok(memory)
    }

    /// Finds relevant memories via embedding similarity.
    pub fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
        let start = Instant::now();

        if req.query.is_empty() {
            return Err(Error::InvalidArgument("query is required".to_string()));
        }

        let query_embedding = self.embedder.embed(&req.query)?;

        let limit = if req.limit == 0 {
            self.config.search_limit
        } else {
            req.limit
        };
        let threshold = if req.threshold <= 0.0 {
            self.config.search_threshold
        } else {
            req.threshold
        };

        let opts = SearchOptions {
            project: if req.project.is_empty() {
                None
            } else {
                Some(req.project)
            },
            types: req.memory_type.into_iter().collect(),
            limit,
            threshold,
            file_paths: Vec::new(),
        };

        let results = self.store.search(&query_embedding, &opts)?;
        let total = results.len();
        Ok(SearchResponse {
            results,
            total,
            timing_ms: start.elapsed().as_millis() as i64,
        })
    }

    /// Indexes a file or directory tree, returning the number of
    /// memories created. Per-file failures inside a walk are logged and
    /// skipped; the walk itself is best-effort.
    pub fn index(&self, req: IndexRequest) -> Result<usize> {
        if req.path.is_empty() {
            return Err(Error::InvalidArgument("path is required".to_string()));
        }

        let project = if req.project.is_empty() {
            self.config.default_project.clone()
        } else {
            req.project
        };

        let path = paths::expand_tilde(&req.path);
        let info = std::fs::metadata(&path)
            .map_err(|e| Error::io(format!("failed to access {}", path.display()), e))?;

        if info.is_dir() {
            self.index_directory(&path, &project)
        } else {
            self.index_file(&path, &project)
        }
    }

    fn index_directory(&self, dir: &Path, project: &str) -> Result<usize> {
        let ignore: Vec<Pattern> = self
            .config
            .index_ignore
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();

        let mut count = 0;
        let walker = WalkDir::new(dir).into_iter().filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !ignore.iter().any(|p| p.matches(&name))
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // Unreadable entries are skipped, like ignored ones.
                Err(_) => continue,
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if !is_indexable(entry.path()) {
                continue;
            }

            match self.index_file(entry.path(), project) {
                Ok(n) => count += n,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "failed to index file");
                }
            }
        }

        Ok(count)
    }

    fn index_file(&self, path: &Path, project: &str) -> Result<usize> {
        let chunks = self.chunker.chunk_file(path)?;
        if chunks.is_empty() {
            return Ok(0);
        }
        debug!(path = %path.display(), chunks = chunks.len(), "chunked file");

        let mut memories = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.config.embed_batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts)?;

            let now = Utc::now();
            for (chunk, embedding) in batch.iter().zip(embeddings) {
                let mut metadata = HashMap::new();
                metadata.insert("start_line".to_string(), chunk.start_line.to_string());
                metadata.insert("end_line".to_string(), chunk.end_line.to_string());
                metadata.insert(
                    "chunk_name".to_string(),
                    chunk.name.clone().unwrap_or_default(),
                );

                memories.push(Memory {
                    id: Uuid::new_v4().to_string(),
                    content: chunk.content.clone(),
                    project: project.to_string(),
                    memory_type: MemoryType::Context,
                    file_path: Some(path.display().to_string()),
                    language: Some(chunk.chunk_type.clone()),
                    metadata,
                    embedding,
                    created_at: now,
                    updated_at: now,
                });
            }
        }

        self.store.add_batch(&mut memories)?;
        Ok(memories.len())
    }

    pub fn get(&self, id: &str) -> Result<Memory> {
        self.store.get(id)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id)
    }

    pub fn delete_by_project(&self, project: &str) -> Result<()> {
        self.store.delete_by_project(project)
    }

    pub fn list(&self, opts: &ListOptions) -> Result<Vec<Memory>> {
        self.store.list(opts)
    }

    pub fn count(&self, project: Option<&str>) -> Result<usize> {
        self.store.count(project)
    }

    pub fn projects(&self) -> Result<Vec<String>> {
        self.store.projects()
    }

    pub fn stats(&self) -> Result<StatsResponse> {
        let mut stats = self.store.stats()?;
        stats.embedding_model = self.embedder.model().to_string();
        Ok(stats)
    }
}

fn is_indexable(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let dotted = format!(".{}", ext.to_lowercase());
    INDEXABLE_EXTENSIONS.contains(&dotted.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_indexable() {
        assert!(is_indexable(Path::new("main.go")));
        assert!(is_indexable(Path::new("src/lib.RS")));
        assert!(is_indexable(Path::new("notes.md")));
        assert!(!is_indexable(Path::new("image.png")));
        assert!(!is_indexable(Path::new("Makefile")));
    }

    #[test]
    fn test_config_defaults() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.search_limit, 10);
        assert_eq!(cfg.search_threshold, 0.5);
        assert_eq!(cfg.default_project, "default");
        assert_eq!(cfg.embed_batch_size, 50);
        assert!(cfg.index_ignore.contains(&".git".to_string()));
    }
}
