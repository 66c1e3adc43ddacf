//! Line-based chunking with overlap. Language-agnostic; the fallback for
//! every language the code chunker does not understand.

use super::{language_for_path, ChunkOptions, Chunker};
use crate::error::{Error, Result};
use crate::types::Chunk;
use std::path::Path;

pub struct LineChunker {
    max_size: usize,
    overlap: usize,
}

impl LineChunker {
    pub fn new(max_size: usize, overlap: usize) -> Self {
        Self {
            max_size: if max_size == 0 { 1500 } else { max_size },
            overlap,
        }
    }

    pub(crate) fn max_size(&self) -> usize {
        self.max_size
    }

    pub(crate) fn overlap(&self) -> usize {
        self.overlap
    }
}

impl Default for LineChunker {
    fn default() -> Self {
        Self::new(1500, 100)
    }
}

impl Chunker for LineChunker {
    fn chunk(&self, content: &str, opts: &ChunkOptions) -> Vec<Chunk> {
        if content.is_empty() {
            return Vec::new();
        }

        let max_size = if opts.max_size == 0 {
            self.max_size
        } else {
            opts.max_size
        };
        let overlap = opts.overlap;

        let mut chunks: Vec<Chunk> = Vec::new();
        let mut buf = String::new();
        let mut start_line = 1;
        let mut current_line = 1;

        for line in content.split('\n') {
            if buf.len() + line.len() + 1 > max_size && !buf.is_empty() {
                chunks.push(Chunk {
                    content: buf.trim().to_string(),
                    start_line,
                    end_line: current_line - 1,
                    chunk_type: "text".to_string(),
                    name: None,
                });

                // Seed the next buffer with whole lines from the tail of
                // the chunk just emitted.
                buf.clear();
                let prefix = overlap_prefix(&chunks[chunks.len() - 1].content, overlap);
                if !prefix.is_empty() {
                    buf.push_str(prefix);
                    buf.push('\n');
                }
                start_line = current_line;
            }

            buf.push_str(line);
            buf.push('\n');
            current_line += 1;
        }

        if !buf.trim().is_empty() {
            chunks.push(Chunk {
                content: buf.trim().to_string(),
                start_line,
                end_line: current_line - 1,
                chunk_type: "text".to_string(),
                name: None,
            });
        }

        chunks
    }

    fn chunk_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;

        let language = language_for_path(path);
        let opts = ChunkOptions {
            language: language.to_string(),
            max_size: self.max_size,
            overlap: self.overlap,
            semantic: false,
        };

        let mut chunks = self.chunk(&content, &opts);
        for chunk in &mut chunks {
            chunk.chunk_type = language.to_string();
        }
        Ok(chunks)
    }

    fn supported_languages(&self) -> &'static [&'static str] {
        &[
            "text",
            "go",
            "python",
            "javascript",
            "typescript",
            "rust",
            "java",
            "c",
            "cpp",
        ]
    }
}

/// Returns the tail of `content` to carry into the next chunk: the last
/// `overlap` bytes, trimmed forward to the first line boundary within
/// that window (the raw tail if the window has none).
fn overlap_prefix(content: &str, overlap: usize) -> &str {
    if content.len() <= overlap {
        return content;
    }
    let mut start = content.len() - overlap;
    while !content.is_char_boundary(start) {
        start += 1;
    }
    let tail = &content[start..];
    match tail.find('\n') {
        Some(idx) => &tail[idx + 1..],
        None => tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_bounds_hold(chunks: &[Chunk], total_lines: usize) {
        for c in chunks {
            assert!(c.start_line >= 1, "start_line must be 1-based");
            assert!(c.start_line <= c.end_line, "start <= end for {:?}", c);
            assert!(c.end_line <= total_lines, "end within input for {:?}", c);
            assert!(!c.content.trim().is_empty(), "no empty chunks");
        }
    }

    #[test]
    fn test_empty_content() {
        let chunker = LineChunker::default();
        assert!(chunker.chunk("", &ChunkOptions::default()).is_empty());
    }

    #[test]
    fn test_single_small_chunk() {
        let chunker = LineChunker::default();
        let chunks = chunker.chunk("hello\nworld", &ChunkOptions::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "hello\nworld");
        assert_eq!(chunks[0].start_line, 1);
        assert_eq!(chunks[0].end_line, 2);
        assert_eq!(chunks[0].chunk_type, "text");
    }

    #[test]
    fn test_splits_on_max_size() {
        let chunker = LineChunker::new(100, 0);
        let content: Vec<String> = (1..=30).map(|i| format!("line number {i:03}")).collect();
        let content = content.join("\n");
        let total_lines = 30;

        let opts = ChunkOptions {
            max_size: 100,
            overlap: 0,
            ..ChunkOptions::default()
        };
        let chunks = chunker.chunk(&content, &opts);

        assert!(chunks.len() > 1, "30 x 15-byte lines cannot fit one chunk");
        line_bounds_hold(&chunks, total_lines);
        for c in &chunks {
            assert!(c.content.len() <= 100 + 16, "chunk near max size: {}", c.content.len());
        }

        // Without overlap every input line appears exactly once.
        let mut covered = Vec::new();
        for c in &chunks {
            covered.extend(c.start_line..=c.end_line);
        }
        assert_eq!(covered, (1..=total_lines).collect::<Vec<_>>());
    }

    #[test]
    fn test_overlap_carries_whole_lines() {
        let chunker = LineChunker::new(80, 40);
        let content: Vec<String> = (1..=20).map(|i| format!("alpha beta gamma {i:02}")).collect();
        let content = content.join("\n");

        let opts = ChunkOptions {
            max_size: 80,
            overlap: 40,
            ..ChunkOptions::default()
        };
        let chunks = chunker.chunk(&content, &opts);
        assert!(chunks.len() > 1);
        line_bounds_hold(&chunks, 20);

        // Each later chunk starts with full lines repeated from its
        // predecessor's tail.
        for window in chunks.windows(2) {
            let first_line = window[1].content.split('\n').next().unwrap();
            assert!(
                window[0].content.contains(first_line),
                "chunk should start with lines from the previous chunk's tail"
            );
        }
    }

    #[test]
    fn test_trailing_buffer_flushed() {
        let chunker = LineChunker::new(50, 0);
        let opts = ChunkOptions {
            max_size: 50,
            overlap: 0,
            ..ChunkOptions::default()
        };
        let chunks = chunker.chunk("0123456789012345678901234567890123456789012345\nshort tail", &opts);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].content, "short tail");
    }

    #[test]
    fn test_whitespace_only_content_yields_nothing() {
        let chunker = LineChunker::default();
        assert!(chunker.chunk("  \n\t\n  ", &ChunkOptions::default()).is_empty());
    }

    #[test]
    fn test_overlap_prefix() {
        assert_eq!(overlap_prefix("short", 100), "short");
        // Window contains a newline: start after it.
        assert_eq!(overlap_prefix("aaaa\nbbbb\ncccc", 7), "cccc");
        // No newline in window: raw tail.
        assert_eq!(overlap_prefix("aaaabbbbcccc", 4), "cccc");
        assert_eq!(overlap_prefix("abc", 0), "");
    }

    #[test]
    fn test_overlap_prefix_multibyte_safe() {
        // 'é' is two bytes; an odd overlap lands mid-character and must
        // be nudged to a boundary instead of panicking.
        let content = "ééééééééé";
        let prefix = overlap_prefix(content, 3);
        assert!(content.ends_with(prefix));
    }

    #[test]
    fn test_chunk_file_tags_language() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.py");
        std::fs::write(&path, "import os\nprint('hi')\n").unwrap();

        let chunker = LineChunker::default();
        let chunks = chunker.chunk_file(&path).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type, "python");
    }

    #[test]
    fn test_chunk_file_missing() {
        let chunker = LineChunker::default();
        assert!(chunker.chunk_file(Path::new("/no/such/file.txt")).is_err());
    }
}
