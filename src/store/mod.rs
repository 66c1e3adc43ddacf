//! Durable storage of memories with filtered brute-force vector search.

mod sqlite;

pub use sqlite::{SqliteStore, StoreConfig};

use crate::types::MemoryType;

/// Configures vector search.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Equality filter on project; empty means all projects.
    pub project: Option<String>,
    /// Restrict to these types; empty means all types.
    pub types: Vec<MemoryType>,
    /// Maximum results; 0 means the default (10).
    pub limit: usize,
    /// Minimum similarity score in (0, 1]; 0 disables the gate.
    pub threshold: f32,
    /// Restrict to memories whose file path starts with any of these.
    pub file_paths: Vec<String>,
}

/// Sort column for listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl OrderBy {
    fn column(self) -> &'static str {
        match self {
            OrderBy::CreatedAt => "created_at",
            OrderBy::UpdatedAt => "updated_at",
        }
    }
}

/// Configures listing queries.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub project: Option<String>,
    pub memory_type: Option<MemoryType>,
    /// Maximum results; 0 means the default (100).
    pub limit: usize,
    pub offset: usize,
    pub order_by: OrderBy,
    pub descending: bool,
}
