//! Code-aware chunking that respects function and class boundaries.
//!
//! Boundary detection is line-oriented: brace depth for go-like
//! languages, indentation for python. Languages outside the supported
//! set fall through to the line chunker. Tree-sitter would be more
//! accurate; this is deliberately dependency-free and fast.

use super::{language_for_path, ChunkOptions, Chunker, LineChunker};
use crate::error::{Error, Result};
use crate::types::Chunk;
use std::path::Path;

pub struct CodeChunker {
    line_chunker: LineChunker,
}

impl CodeChunker {
    pub fn new(max_size: usize, overlap: usize) -> Self {
        Self {
            line_chunker: LineChunker::new(max_size, overlap),
        }
    }

    /// Splits go-like code (go, javascript, typescript) on `func `
    /// boundaries, tracking brace depth to find function ends.
    fn chunk_braced(&self, content: &str, opts: &ChunkOptions) -> Vec<Chunk> {
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut buf = String::new();
        let mut current_name: Option<String> = None;
        let mut start_line = 1;
        let mut line_num = 0;
        let mut brace_depth: i32 = 0;
        let mut in_func = false;

        for line in content.split('\n') {
            line_num += 1;
            let trimmed = line.trim_start();

            if trimmed.starts_with("func ") {
                if !buf.is_empty() {
                    push_chunk(
                        &mut chunks,
                        &buf,
                        start_line,
                        line_num - 1,
                        "function",
                        current_name.take(),
                    );
                    buf.clear();
                }
                start_line = line_num;
                in_func = true;
                current_name = braced_symbol_name(trimmed);
            }

            buf.push_str(line);
            buf.push('\n');

            brace_depth += line.matches('{').count() as i32;
            brace_depth -= line.matches('}').count() as i32;

            if in_func && brace_depth == 0 && line.contains('}') {
                push_chunk(
                    &mut chunks,
                    &buf,
                    start_line,
                    line_num,
                    "function",
                    current_name.take(),
                );
                buf.clear();
                start_line = line_num + 1;
                in_func = false;
            }

            if buf.len() > opts.max_size && !in_func {
                push_chunk(&mut chunks, &buf, start_line, line_num, "text", None);
                buf.clear();
                start_line = line_num + 1;
            }
        }

        if !buf.trim().is_empty() {
            push_chunk(
                &mut chunks,
                &buf,
                start_line,
                line_num,
                "text",
                current_name.take(),
            );
        }

        chunks
    }

    /// Splits python code on `def `/`class ` lines at or above the
    /// current base indentation.
    fn chunk_python(&self, content: &str, opts: &ChunkOptions) -> Vec<Chunk> {
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut buf = String::new();
        let mut current_name: Option<String> = None;
        let mut current_type = "text";
        let mut start_line = 1;
        let mut line_num = 0;
        let mut base_indent: Option<usize> = None;

        for line in content.split('\n') {
            line_num += 1;
            let trimmed = line.trim_start();
            let indent = line.len() - trimmed.len();

            let is_def = trimmed.starts_with("def ");
            let is_class = trimmed.starts_with("class ");
            // Nested definitions stay inside the enclosing chunk; only a
            // def/class at or above the base indentation starts a new one.
            if (is_def || is_class) && base_indent.map_or(true, |base| indent <= base) {
                if !buf.is_empty() {
                    push_chunk(
                        &mut chunks,
                        &buf,
                        start_line,
                        line_num - 1,
                        current_type,
                        current_name.take(),
                    );
                    buf.clear();
                    start_line = line_num;
                }

                base_indent = Some(indent);
                current_type = if is_def { "function" } else { "class" };
                current_name = python_symbol_name(trimmed);
            }

            buf.push_str(line);
            buf.push('\n');

            if buf.len() > opts.max_size {
                push_chunk(
                    &mut chunks,
                    &buf,
                    start_line,
                    line_num,
                    current_type,
                    current_name.take(),
                );
                buf.clear();
                start_line = line_num + 1;
                current_type = "text";
                base_indent = None;
            }
        }

        if !buf.trim().is_empty() {
            push_chunk(
                &mut chunks,
                &buf,
                start_line,
                line_num,
                current_type,
                current_name.take(),
            );
        }

        chunks
    }
}

impl Default for CodeChunker {
    fn default() -> Self {
        Self::new(1500, 100)
    }
}

impl Chunker for CodeChunker {
    fn chunk(&self, content: &str, opts: &ChunkOptions) -> Vec<Chunk> {
        if !opts.semantic {
            return self.line_chunker.chunk(content, opts);
        }

        match opts.language.as_str() {
            "go" => self.chunk_braced(content, opts),
            "python" => self.chunk_python(content, opts),
            // JS/TS are brace-delimited like go; arrow functions and
            // class methods still land inside the enclosing chunk.
            "javascript" | "typescript" => self.chunk_braced(content, opts),
            _ => self.line_chunker.chunk(content, opts),
        }
    }

    fn chunk_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read {}", path.display()), e))?;

        let opts = ChunkOptions {
            language: language_for_path(path).to_string(),
            max_size: self.line_chunker.max_size(),
            overlap: self.line_chunker.overlap(),
            semantic: true,
        };

        Ok(self.chunk(&content, &opts))
    }

    fn supported_languages(&self) -> &'static [&'static str] {
        &["go", "python", "javascript", "typescript"]
    }
}

fn push_chunk(
    chunks: &mut Vec<Chunk>,
    buf: &str,
    start_line: usize,
    end_line: usize,
    chunk_type: &str,
    name: Option<String>,
) {
    let content = buf.trim();
    if content.is_empty() {
        return;
    }
    chunks.push(Chunk {
        content: content.to_string(),
        start_line,
        end_line: end_line.max(start_line),
        chunk_type: chunk_type.to_string(),
        name,
    });
}

/// Extracts the identifier between `func ` and the first `(`.
/// Methods (`func (r *Recv) Name(...)`) yield nothing from the receiver
/// token, matching the line-oriented scan's limits.
fn braced_symbol_name(trimmed: &str) -> Option<String> {
    let token = trimmed.split_whitespace().nth(1)?;
    let name = match token.find('(') {
        Some(idx) => &token[..idx],
        None => token,
    };
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Extracts the identifier after `def `/`class `, up to `(` or `:`.
fn python_symbol_name(trimmed: &str) -> Option<String> {
    let token = trimmed.split_whitespace().nth(1)?;
    let name = token
        .split(|c| c == '(' || c == ':')
        .next()
        .unwrap_or_default();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GO_SOURCE: &str = r#"package main

import "fmt"

func Hello(name string) string {
	if name == "" {
		name = "world"
	}
	return fmt.Sprintf("hello %s", name)
}

func Add(a, b int) int {
	return a + b
}
"#;

    const PYTHON_SOURCE: &str = r#"import os

def first(x):
    return x + 1

class Widget:
    def method(self):
        return 2

def second():
    return 3
"#;

    fn opts_for(language: &str) -> ChunkOptions {
        ChunkOptions {
            language: language.to_string(),
            ..ChunkOptions::default()
        }
    }

    #[test]
    fn test_go_functions_detected() {
        let chunker = CodeChunker::default();
        let chunks = chunker.chunk(GO_SOURCE, &opts_for("go"));

        let functions: Vec<_> = chunks
            .iter()
            .filter(|c| c.chunk_type == "function" && c.name.is_some())
            .collect();
        assert!(functions.len() >= 2, "expected both funcs, got {chunks:?}");

        let names: Vec<&str> = functions
            .iter()
            .filter_map(|c| c.name.as_deref())
            .collect();
        assert!(names.contains(&"Hello"));
        assert!(names.contains(&"Add"));

        let hello = functions.iter().find(|c| c.name.as_deref() == Some("Hello")).unwrap();
        assert!(hello.content.starts_with("func Hello"));
        assert!(hello.content.ends_with('}'));
    }

    #[test]
    fn test_go_line_numbers() {
        let chunker = CodeChunker::default();
        let total_lines = GO_SOURCE.split('\n').count();
        let chunks = chunker.chunk(GO_SOURCE, &opts_for("go"));
        for c in &chunks {
            assert!(c.start_line >= 1);
            assert!(c.start_line <= c.end_line);
            assert!(c.end_line <= total_lines);
            assert!(!c.content.trim().is_empty());
        }
    }

    #[test]
    fn test_go_method_name_is_dropped() {
        let src = "func (s *Store) Add(x int) int {\n\treturn x\n}\n";
        let chunker = CodeChunker::default();
        let chunks = chunker.chunk(src, &opts_for("go"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type, "function");
        assert_eq!(chunks[0].name, None);
    }

    #[test]
    fn test_python_functions_and_classes() {
        let chunker = CodeChunker::default();
        let chunks = chunker.chunk(PYTHON_SOURCE, &opts_for("python"));

        let names: Vec<(&str, &str)> = chunks
            .iter()
            .filter_map(|c| c.name.as_deref().map(|n| (c.chunk_type.as_str(), n)))
            .collect();
        assert!(names.contains(&("function", "first")), "{names:?}");
        assert!(names.contains(&("class", "Widget")), "{names:?}");
        assert!(names.contains(&("function", "second")), "{names:?}");

        // Nested method stays inside the class chunk.
        let widget = chunks
            .iter()
            .find(|c| c.name.as_deref() == Some("Widget"))
            .unwrap();
        assert!(widget.content.contains("def method"));
    }

    #[test]
    fn test_javascript_uses_braced_splitter() {
        let src = "func render() {\n  return 1\n}\n";
        let chunker = CodeChunker::default();
        let chunks = chunker.chunk(src, &opts_for("javascript"));
        assert_eq!(chunks[0].chunk_type, "function");
    }

    #[test]
    fn test_unknown_language_falls_back_to_lines() {
        let chunker = CodeChunker::default();
        let chunks = chunker.chunk("some\nplain\ntext", &opts_for("markdown"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type, "text");
    }

    #[test]
    fn test_non_semantic_falls_back_to_lines() {
        let chunker = CodeChunker::default();
        let mut opts = opts_for("go");
        opts.semantic = false;
        let chunks = chunker.chunk(GO_SOURCE, &opts);
        assert!(chunks.iter().all(|c| c.chunk_type == "text"));
    }

    #[test]
    fn test_oversize_non_function_text_flushes() {
        let filler: Vec<String> = (0..40).map(|i| format!("var x{i} = {i}")).collect();
        let src = filler.join("\n");
        let chunker = CodeChunker::default();
        let opts = ChunkOptions {
            language: "go".to_string(),
            max_size: 120,
            overlap: 0,
            semantic: true,
        };
        let chunks = chunker.chunk(&src, &opts);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chunk_type == "text"));
    }

    #[test]
    fn test_symbol_name_extraction() {
        assert_eq!(braced_symbol_name("func Add(a, b int)"), Some("Add".into()));
        assert_eq!(braced_symbol_name("func (s *S) Add(x)"), None);
        assert_eq!(braced_symbol_name("func "), None);
        assert_eq!(python_symbol_name("def foo(x):"), Some("foo".into()));
        assert_eq!(python_symbol_name("class Widget:"), Some("Widget".into()));
        assert_eq!(python_symbol_name("class Widget(Base):"), Some("Widget".into()));
    }

    #[test]
    fn test_chunk_file_detects_language() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.go");
        std::fs::write(&path, GO_SOURCE).unwrap();

        let chunker = CodeChunker::default();
        let chunks = chunker.chunk_file(&path).unwrap();
        assert!(chunks.iter().any(|c| c.name.as_deref() == Some("Hello")));
    }
}
