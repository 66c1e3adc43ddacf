//! CLI subcommands and shared service bootstrap.

pub mod add;
pub mod delete;
pub mod index;
pub mod list;
pub mod search;
pub mod serve;
pub mod stats;

use anyhow::{Context, Result};
use colored::Colorize;
use moneta::chunking::CodeChunker;
use moneta::embeddings::{OllamaConfig, OllamaEmbedder};
use moneta::memory::{MemoryService, ServiceConfig};
use moneta::paths;
use moneta::store::{SqliteStore, StoreConfig};
use moneta::types::MemoryType;
use std::path::PathBuf;

/// Flags shared by every subcommand.
pub struct GlobalArgs {
    pub data_dir: Option<PathBuf>,
    pub project: Option<String>,
    pub verbose: bool,
}

/// Sends tracing output to stderr; `-v` raises the default level,
/// RUST_LOG overrides everything.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "moneta=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Builds the service stack: store, embedder, chunker.
pub fn init_service(args: &GlobalArgs) -> Result<MemoryService> {
    let data_dir = paths::resolve_data_dir(args.data_dir.as_deref());
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

    let db_path = paths::db_path(&data_dir);
    let embedder_cfg = OllamaConfig::default();

    let store = SqliteStore::open(StoreConfig {
        path: db_path.clone(),
        dimensions: embedder_cfg.dimensions,
    })
    .context("failed to initialize store")?;

    let embedder = OllamaEmbedder::new(embedder_cfg).context("failed to initialize embedder")?;
    let chunker = CodeChunker::new(1500, 100);

    if args.verbose {
        println!("Data directory: {}", data_dir.display());
        println!("Database: {}", db_path.display());
    }

    Ok(MemoryService::new(
        store,
        Box::new(embedder),
        Box::new(chunker),
        ServiceConfig::default(),
    ))
}

/// The project to operate on: the flag if given, otherwise the current
/// directory's name.
pub fn resolve_project(args: &GlobalArgs) -> String {
    if let Some(project) = &args.project {
        if !project.is_empty() {
            return project.clone();
        }
    }
    std::env::current_dir()
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "default".to_string())
}

/// Colours a type name for terminal output.
pub fn format_type(memory_type: MemoryType) -> colored::ColoredString {
    let name = memory_type.as_str();
    match memory_type {
        MemoryType::Architecture => name.blue(),
        MemoryType::Pattern => name.green(),
        MemoryType::Decision => name.yellow(),
        MemoryType::Gotcha => name.red(),
        MemoryType::Context => name.white(),
        MemoryType::Preference => name.magenta(),
    }
}

pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3);
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Collapses content to a single normalized line, truncated for display.
pub fn format_content(content: &str) -> String {
    let one_line = content.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate(&one_line, 200)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 80), "short");
        let long = "x".repeat(100);
        let cut = truncate(&long, 20);
        assert_eq!(cut.len(), 20);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_format_content_normalizes_whitespace() {
        assert_eq!(format_content("a\n b\t\tc"), "a b c");
    }
}
