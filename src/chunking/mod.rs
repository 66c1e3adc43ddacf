//! Splitting source files into semantically bounded pieces.
//!
//! Two implementations share the [`Chunker`] trait: a line-based splitter
//! with overlap that works for any text, and a code-aware splitter that
//! respects function/class boundaries for a known set of languages.

mod code;
mod line;

pub use code::CodeChunker;
pub use line::LineChunker;

use crate::error::Result;
use crate::types::Chunk;
use std::path::Path;

/// Splits content into semantic chunks.
pub trait Chunker: Send + Sync {
    /// Splits content into pieces based on options.
    fn chunk(&self, content: &str, opts: &ChunkOptions) -> Vec<Chunk>;

    /// Reads and chunks a file, detecting language from the extension.
    fn chunk_file(&self, path: &Path) -> Result<Vec<Chunk>>;

    /// Languages this chunker understands.
    fn supported_languages(&self) -> &'static [&'static str];
}

/// Configures chunking behavior.
#[derive(Debug, Clone)]
pub struct ChunkOptions {
    /// Programming language, or "text" for plain text.
    pub language: String,
    /// Maximum chunk size in bytes.
    pub max_size: usize,
    /// Overlap between adjacent line chunks in bytes.
    pub overlap: usize,
    /// Use semantic boundaries (functions, classes) where possible.
    pub semantic: bool,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            language: "text".to_string(),
            max_size: 1500,
            overlap: 100,
            semantic: true,
        }
    }
}

/// Maps a lowercase file extension (without the dot) to a language name.
/// Unknown extensions map to "text".
pub fn detect_language(ext: &str) -> &'static str {
    match ext {
        "go" => "go",
        "py" => "python",
        "js" | "jsx" | "mjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "rs" => "rust",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "kt" | "kts" => "kotlin",
        "cs" => "csharp",
        "md" | "markdown" => "markdown",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "sql" => "sql",
        "sh" | "bash" => "shell",
        _ => "text",
    }
}

/// Language for a path, from its lowercase extension.
pub fn language_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    detect_language(&ext)
}
