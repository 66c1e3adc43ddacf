//! SQLite-backed memory store.
//!
//! A single `memories` table holds content, metadata JSON, and the
//! embedding blob (little-endian f32, no header). Connections come from
//! an r2d2 pool configured for WAL; a readers-writer lock serializes
//! transactional intent on top of the engine's own locking so that
//! `add_batch` is atomic with respect to readers observing counts.

use super::{ListOptions, OrderBy, SearchOptions};
use crate::error::{Error, Result};
use crate::types::{Memory, MemoryType, SearchResult, StatsResponse};
use crate::vector::{encoding, ops, topk, VectorPool};
use chrono::Utc;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params, params_from_iter};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_LIST_LIMIT: usize = 100;

// page_size and auto_vacuum must precede journal_mode for fresh files.
const PRAGMAS: &str = "
    PRAGMA page_size = 4096;
    PRAGMA auto_vacuum = INCREMENTAL;
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    PRAGMA busy_timeout = 5000;
    PRAGMA cache_size = -32000;
    PRAGMA temp_store = MEMORY;
    PRAGMA mmap_size = 268435456;
";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS memories (
        id TEXT PRIMARY KEY,
        content TEXT NOT NULL,
        project TEXT NOT NULL,
        type TEXT NOT NULL DEFAULT 'context',
        file_path TEXT,
        language TEXT,
        metadata TEXT,
        embedding BLOB,
        created_at DATETIME NOT NULL,
        updated_at DATETIME NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_memories_project ON memories(project);
    CREATE INDEX IF NOT EXISTS idx_memories_type ON memories(type);
    CREATE INDEX IF NOT EXISTS idx_memories_file_path ON memories(file_path);
    CREATE INDEX IF NOT EXISTS idx_memories_created_at ON memories(created_at);

    CREATE TABLE IF NOT EXISTS schema_version (
        version INTEGER PRIMARY KEY,
        applied_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    INSERT OR IGNORE INTO schema_version (version) VALUES (1);
";

const SELECT_COLUMNS: &str =
    "id, content, project, type, file_path, language, metadata, embedding, created_at, updated_at";

/// Configures the SQLite store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the database file.
    pub path: PathBuf,
    /// Embedding dimensions; every persisted vector must have this length.
    pub dimensions: usize,
}

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
    path: PathBuf,
    dims: usize,
    // Writes exclusive, reads shared; the engine handles the rest.
    lock: RwLock<()>,
    buffers: VectorPool,
}

impl SqliteStore {
    pub fn open(cfg: StoreConfig) -> Result<Self> {
        if let Some(parent) = cfg.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::io("failed to create data directory", e))?;
        }

        let manager = SqliteConnectionManager::file(&cfg.path)
            .with_init(|conn| conn.execute_batch(PRAGMAS));
        let pool = Pool::builder().max_size(8).build(manager)?;

        {
            let conn = pool.get()?;
            conn.execute_batch(SCHEMA)
                .map_err(|e| Error::store("failed to initialize schema", e))?;
        }

        Ok(Self {
            pool,
            path: cfg.path,
            dims: cfg.dimensions,
            lock: RwLock::new(()),
            buffers: VectorPool::new(cfg.dimensions),
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    /// Creates a new memory. Duplicate ids are a conflict, not an upsert.
    pub fn add(&self, memory: &mut Memory) -> Result<()> {
        self.validate(memory)?;

        let _guard = self.lock.write().unwrap();
        let conn = self.pool.get()?;

        let now = Utc::now();
        if memory.created_at.timestamp() == 0 {
            memory.created_at = now;
        }
        memory.updated_at = now;

        let metadata = serde_json::to_string(&memory.metadata)
            .map_err(|e| Error::InvalidArgument(format!("unencodable metadata: {e}")))?;
        let blob = encoding::pack(&memory.embedding);

        conn.execute(
            "INSERT INTO memories (id, content, project, type, file_path, language, metadata, embedding, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                memory.id,
                memory.content,
                memory.project,
                memory.memory_type.as_str(),
                memory.file_path,
                memory.language,
                metadata,
                blob,
                memory.created_at,
                memory.updated_at,
            ],
        )
        .map_err(|e| insert_error(&memory.id, e))?;

        Ok(())
    }

    /// Retrieves a memory by id.
    pub fn get(&self, id: &str) -> Result<Memory> {
        let _guard = self.lock.read().unwrap();
        let conn = self.pool.get()?;

        let sql = format!("SELECT {SELECT_COLUMNS} FROM memories WHERE id = ?1");
        match conn.query_row(&sql, params![id], |row| self.row_to_memory(row)) {
            Ok(memory) => Ok(memory),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::NotFound(id.to_string())),
            Err(e) => Err(Error::store("failed to get memory", e)),
        }
    }

    /// Full replace by id, except `created_at`.
    pub fn update(&self, memory: &mut Memory) -> Result<()> {
        self.validate(memory)?;

        let _guard = self.lock.write().unwrap();
        let conn = self.pool.get()?;

        memory.updated_at = Utc::now();
        let metadata = serde_json::to_string(&memory.metadata)
            .map_err(|e| Error::InvalidArgument(format!("unencodable metadata: {e}")))?;
        let blob = encoding::pack(&memory.embedding);

        let rows = conn
            .execute(
                "UPDATE memories
                 SET content = ?1, project = ?2, type = ?3, file_path = ?4, language = ?5,
                     metadata = ?6, embedding = ?7, updated_at = ?8
                 WHERE id = ?9",
                params![
                    memory.content,
                    memory.project,
                    memory.memory_type.as_str(),
                    memory.file_path,
                    memory.language,
                    metadata,
                    blob,
                    memory.updated_at,
                    memory.id,
                ],
            )
            .map_err(|e| Error::store("failed to update memory", e))?;

        if rows == 0 {
            return Err(Error::NotFound(memory.id.clone()));
        }
        Ok(())
    }

    /// Removes a memory by id.
    pub fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.lock.write().unwrap();
        let conn = self.pool.get()?;

        let rows = conn
            .execute("DELETE FROM memories WHERE id = ?1", params![id])
            .map_err(|e| Error::store("failed to delete memory", e))?;
        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Removes all memories for a project. An empty project is not an
    /// error.
    pub fn delete_by_project(&self, project: &str) -> Result<()> {
        let _guard = self.lock.write().unwrap();
        let conn = self.pool.get()?;

        conn.execute("DELETE FROM memories WHERE project = ?1", params![project])
            .map_err(|e| Error::store("failed to delete memories for project", e))?;
        Ok(())
    }

    /// Adds multiple memories in a single transaction; any failure rolls
    /// back the whole batch.
    pub fn add_batch(&self, memories: &mut [Memory]) -> Result<()> {
        for memory in memories.iter() {
            self.validate(memory)?;
        }

        let _guard = self.lock.write().unwrap();
        let mut conn = self.pool.get()?;

        let tx = conn
            .transaction()
            .map_err(|e| Error::store("failed to begin transaction", e))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO memories (id, content, project, type, file_path, language, metadata, embedding, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                )
                .map_err(|e| Error::store("failed to prepare insert", e))?;

            let now = Utc::now();
            for memory in memories.iter_mut() {
                if memory.created_at.timestamp() == 0 {
                    memory.created_at = now;
                }
                memory.updated_at = now;

                let metadata = serde_json::to_string(&memory.metadata)
                    .map_err(|e| Error::InvalidArgument(format!("unencodable metadata: {e}")))?;
                let blob = encoding::pack(&memory.embedding);

                stmt.execute(params![
                    memory.id,
                    memory.content,
                    memory.project,
                    memory.memory_type.as_str(),
                    memory.file_path,
                    memory.language,
                    metadata,
                    blob,
                    memory.created_at,
                    memory.updated_at,
                ])
                .map_err(|e| insert_error(&memory.id, e))?;
            }
        }
        tx.commit()
            .map_err(|e| Error::store("failed to commit batch", e))?;
        Ok(())
    }

    /// Finds similar memories: filter first, then score every matching
    /// row with the kernel and keep the top `limit`.
    ///
    /// The scan is exact and O(matched rows); `limit` bounds the result,
    /// not the work.
    pub fn search(&self, query: &[f32], opts: &SearchOptions) -> Result<Vec<SearchResult>> {
        let _guard = self.lock.read().unwrap();
        let conn = self.pool.get()?;

        let mut conditions: Vec<String> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if let Some(project) = opts.project.as_deref() {
            if !project.is_empty() {
                conditions.push(format!("project = ?{}", args.len() + 1));
                args.push(project.to_string());
            }
        }
        if !opts.types.is_empty() {
            let placeholders: Vec<String> = opts
                .types
                .iter()
                .map(|t| {
                    args.push(t.as_str().to_string());
                    format!("?{}", args.len())
                })
                .collect();
            conditions.push(format!("type IN ({})", placeholders.join(",")));
        }
        if !opts.file_paths.is_empty() {
            let clauses: Vec<String> = opts
                .file_paths
                .iter()
                .map(|prefix| {
                    args.push(format!("{prefix}%"));
                    format!("file_path LIKE ?{}", args.len())
                })
                .collect();
            conditions.push(format!("({})", clauses.join(" OR ")));
        }

        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM memories");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Error::store("failed to prepare search", e))?;
        let mut rows = stmt
            .query(params_from_iter(args.iter()))
            .map_err(|e| Error::store("failed to query memories", e))?;

        let mut results: Vec<SearchResult> = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| Error::store("failed to scan memory", e))?
        {
            let blob = match row.get_ref(7) {
                Ok(ValueRef::Blob(b)) => b,
                _ => &[][..],
            };
            let similarity = self.score_blob(query, blob);

            if opts.threshold > 0.0 && similarity < opts.threshold {
                continue;
            }

            let memory = self
                .row_to_memory(row)
                .map_err(|e| Error::store("failed to scan memory", e))?;
            results.push(SearchResult { memory, similarity });
        }

        let limit = if opts.limit == 0 {
            DEFAULT_SEARCH_LIMIT
        } else {
            opts.limit
        };
        Ok(topk::top_k(results, limit))
    }

    /// Lists memories with filtering and pagination.
    pub fn list(&self, opts: &ListOptions) -> Result<Vec<Memory>> {
        let _guard = self.lock.read().unwrap();
        let conn = self.pool.get()?;

        let mut conditions: Vec<String> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(project) = opts.project.as_deref() {
            if !project.is_empty() {
                args.push(Value::Text(project.to_string()));
                conditions.push(format!("project = ?{}", args.len()));
            }
        }
        if let Some(memory_type) = opts.memory_type {
            args.push(Value::Text(memory_type.as_str().to_string()));
            conditions.push(format!("type = ?{}", args.len()));
        }

        let limit = if opts.limit == 0 {
            DEFAULT_LIST_LIMIT
        } else {
            opts.limit
        };
        let direction = if opts.descending { "DESC" } else { "ASC" };

        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM memories");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(&format!(
            " ORDER BY {} {} LIMIT ?{} OFFSET ?{}",
            opts.order_by.column(),
            direction,
            args.len() + 1,
            args.len() + 2,
        ));
        args.push(Value::Integer(limit as i64));
        args.push(Value::Integer(opts.offset as i64));

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Error::store("failed to prepare list", e))?;
        let memories = stmt
            .query_map(params_from_iter(args), |row| self.row_to_memory(row))
            .map_err(|e| Error::store("failed to list memories", e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::store("failed to scan memory", e))?;

        Ok(memories)
    }

    /// Counts memories, optionally within one project.
    pub fn count(&self, project: Option<&str>) -> Result<usize> {
        let _guard = self.lock.read().unwrap();
        let conn = self.pool.get()?;

        let count: i64 = match project.filter(|p| !p.is_empty()) {
            Some(p) => conn.query_row(
                "SELECT COUNT(*) FROM memories WHERE project = ?1",
                params![p],
                |row| row.get(0),
            ),
            None => conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0)),
        }
        .map_err(|e| Error::store("failed to count memories", e))?;

        Ok(count as usize)
    }

    /// Distinct projects, sorted.
    pub fn projects(&self) -> Result<Vec<String>> {
        let _guard = self.lock.read().unwrap();
        let conn = self.pool.get()?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT project FROM memories ORDER BY project")
            .map_err(|e| Error::store("failed to prepare projects", e))?;
        let projects = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| Error::store("failed to list projects", e))?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(|e| Error::store("failed to scan project", e))?;
        Ok(projects)
    }

    /// Storage statistics: totals, per-type histogram, distinct project
    /// count, and the database file size.
    pub fn stats(&self) -> Result<StatsResponse> {
        let _guard = self.lock.read().unwrap();
        let conn = self.pool.get()?;

        let total: i64 = conn
            .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))
            .map_err(|e| Error::store("failed to get total count", e))?;

        let mut by_type: HashMap<String, usize> = HashMap::new();
        let mut stmt = conn
            .prepare("SELECT type, COUNT(*) FROM memories GROUP BY type")
            .map_err(|e| Error::store("failed to prepare type counts", e))?;
        let type_rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|e| Error::store("failed to get type counts", e))?;
        for entry in type_rows {
            let (memory_type, count) =
                entry.map_err(|e| Error::store("failed to scan type count", e))?;
            by_type.insert(memory_type, count as usize);
        }

        let project_count: i64 = conn
            .query_row("SELECT COUNT(DISTINCT project) FROM memories", [], |row| {
                row.get(0)
            })
            .map_err(|e| Error::store("failed to get project count", e))?;

        let storage_bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);

        Ok(StatsResponse {
            total_memories: total as usize,
            memories_by_type: by_type,
            project_count: project_count as usize,
            embedding_model: String::new(),
            storage_bytes,
        })
    }

    /// Reclaims free space (VACUUM).
    pub fn compact(&self) -> Result<()> {
        let _guard = self.lock.write().unwrap();
        let conn = self.pool.get()?;
        conn.execute_batch("VACUUM")
            .map_err(|e| Error::store("failed to vacuum", e))?;
        Ok(())
    }

    fn validate(&self, memory: &Memory) -> Result<()> {
        if memory.id.is_empty() {
            return Err(Error::InvalidArgument("id is required".to_string()));
        }
        if memory.content.is_empty() {
            return Err(Error::InvalidArgument("content is required".to_string()));
        }
        if memory.project.is_empty() {
            return Err(Error::InvalidArgument("project is required".to_string()));
        }
        if memory.embedding.len() != self.dims {
            return Err(Error::InvalidArgument(format!(
                "embedding has {} dimensions, store expects {}",
                memory.embedding.len(),
                self.dims
            )));
        }
        Ok(())
    }

    /// Scores one embedding blob against the query. Aligned blobs are
    /// viewed in place on little-endian hosts; everything else decodes
    /// through a pooled buffer.
    fn score_blob(&self, query: &[f32], blob: &[u8]) -> f32 {
        if blob.len() != self.dims * 4 {
            return 0.0;
        }
        if cfg!(target_endian = "little") {
            if let Some(view) = encoding::try_as_f32(blob) {
                return ops::cosine_similarity(query, view);
            }
        }
        let mut buf = self.buffers.get();
        let similarity = if encoding::unpack_into(blob, &mut buf) {
            ops::cosine_similarity(query, &buf)
        } else {
            0.0
        };
        self.buffers.put(buf);
        similarity
    }

    fn row_to_memory(&self, row: &rusqlite::Row<'_>) -> rusqlite::Result<Memory> {
        let type_name: String = row.get(3)?;
        let metadata_json: Option<String> = row.get(6)?;
        let blob: Option<Vec<u8>> = row.get(7)?;

        let mut embedding = encoding::unpack(blob.as_deref().unwrap_or_default());
        if embedding.len() != self.dims {
            // Rows with foreign dimensions are unusable; surface them
            // with an empty vector rather than failing the scan.
            embedding = Vec::new();
        }

        Ok(Memory {
            id: row.get(0)?,
            content: row.get(1)?,
            project: row.get(2)?,
            memory_type: MemoryType::parse_lossy(&type_name),
            file_path: row.get(4)?,
            language: row.get(5)?,
            metadata: metadata_json
                .and_then(|s| serde_json::from_str(&s).ok())
                .unwrap_or_default(),
            embedding,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

fn insert_error(id: &str, e: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(f, _) = &e {
        if f.code == rusqlite::ErrorCode::ConstraintViolation {
            return Error::Conflict(id.to_string());
        }
    }
    Error::store("failed to insert memory", e)
}
