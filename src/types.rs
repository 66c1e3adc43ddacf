//! Core data structures shared across the store, service, and HTTP layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A single memory entry: content plus its embedding and bookkeeping.
///
/// The embedding never travels over the wire; it lives in the store and
/// in the embedding cache only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub content: String,
    pub project: String,
    #[serde(rename = "type", default)]
    pub memory_type: MemoryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    #[serde(skip)]
    pub embedding: Vec<f32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Categorizes memories for better organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryType {
    /// High-level design decisions
    Architecture,
    /// Code patterns and conventions
    Pattern,
    /// Why something was done
    Decision,
    /// Bugs, edge cases, warnings
    Gotcha,
    /// General context about code
    #[default]
    Context,
    /// User coding preferences
    Preference,
}

impl MemoryType {
    /// Canonical lowercase name, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryType::Architecture => "architecture",
            MemoryType::Pattern => "pattern",
            MemoryType::Decision => "decision",
            MemoryType::Gotcha => "gotcha",
            MemoryType::Context => "context",
            MemoryType::Preference => "preference",
        }
    }

    /// Parses a type name; unknown names fall back to `Context`.
    pub fn parse_lossy(s: &str) -> Self {
        match s {
            "architecture" => MemoryType::Architecture,
            "pattern" => MemoryType::Pattern,
            "decision" => MemoryType::Decision,
            "gotcha" => MemoryType::Gotcha,
            "preference" => MemoryType::Preference,
            _ => MemoryType::Context,
        }
    }

    /// All known variants, for CLI help and stats tables.
    pub fn all() -> &'static [MemoryType] {
        &[
            MemoryType::Architecture,
            MemoryType::Pattern,
            MemoryType::Decision,
            MemoryType::Gotcha,
            MemoryType::Context,
            MemoryType::Preference,
        ]
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A piece of code or text produced by the chunker. Transient: chunks
/// become memories during indexing and are never persisted as such.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    /// 1-based, inclusive.
    pub start_line: usize,
    /// 1-based, inclusive.
    pub end_line: usize,
    /// "function", "class", "text", or a language tag.
    #[serde(rename = "type")]
    pub chunk_type: String,
    /// Function/class name if applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A memory match with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub memory: Memory,
    pub similarity: f32,
}

/// Request payload for adding a memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddMemoryRequest {
    pub content: String,
    #[serde(default)]
    pub project: String,
    #[serde(rename = "type", default)]
    pub memory_type: Option<MemoryType>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Request payload for semantic search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub project: String,
    #[serde(rename = "type", default)]
    pub memory_type: Option<MemoryType>,
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub threshold: f32,
}

/// Response payload for search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub total: usize,
    #[serde(rename = "timing_ms")]
    pub timing_ms: i64,
}

/// Request payload for indexing a file or directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexRequest {
    pub path: String,
    #[serde(default)]
    pub project: String,
    /// Auto-detect if empty.
    #[serde(default)]
    pub language: Option<String>,
}

/// Statistics about the memory store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_memories: usize,
    pub memories_by_type: HashMap<String, usize>,
    pub project_count: usize,
    #[serde(default)]
    pub embedding_model: String,
    pub storage_bytes: u64,
}
