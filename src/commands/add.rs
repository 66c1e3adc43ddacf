//! `moneta add` - store one memory from the command line.

use super::GlobalArgs;
use anyhow::{Context, Result};
use moneta::types::{AddMemoryRequest, MemoryType};
use std::collections::HashMap;

pub fn execute(
    globals: &GlobalArgs,
    content: Vec<String>,
    memory_type: String,
    file: Option<String>,
    lang: Option<String>,
    meta: Vec<String>,
) -> Result<()> {
    let content = content.join(" ");
    if content.is_empty() {
        anyhow::bail!("content is required");
    }

    let svc = super::init_service(globals)?;

    let mut metadata = HashMap::new();
    for pair in &meta {
        if let Some((key, value)) = pair.split_once('=') {
            metadata.insert(key.to_string(), value.to_string());
        }
    }

    let req = AddMemoryRequest {
        content,
        project: super::resolve_project(globals),
        memory_type: Some(MemoryType::parse_lossy(&memory_type)),
        file_path: file,
        language: lang,
        metadata,
    };

    let memory = svc.add(req).context("failed to add memory")?;

    if globals.verbose {
        println!("Added memory:");
        println!("  ID:      {}", memory.id);
        println!("  Type:    {}", memory.memory_type);
        println!("  Project: {}", memory.project);
        println!("  Content: {}", super::truncate(&memory.content, 100));
    } else {
        println!("Added: {}", memory.id);
    }

    Ok(())
}
