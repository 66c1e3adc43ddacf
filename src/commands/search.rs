//! `moneta search` - semantic search over stored memories.

use super::GlobalArgs;
use anyhow::{Context, Result};
use moneta::types::{MemoryType, SearchRequest};

pub fn execute(
    globals: &GlobalArgs,
    query: Vec<String>,
    limit: usize,
    threshold: f32,
    memory_type: Option<String>,
    json: bool,
) -> Result<()> {
    let query = query.join(" ");
    if query.is_empty() {
        anyhow::bail!("query is required");
    }

    let svc = super::init_service(globals)?;

    let req = SearchRequest {
        query,
        project: super::resolve_project(globals),
        memory_type: memory_type.as_deref().map(MemoryType::parse_lossy),
        limit,
        threshold,
    };

    let resp = svc.search(req).context("search failed")?;

    if resp.results.is_empty() {
        println!("No results found");
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
        return Ok(());
    }

    println!("Found {} results ({}ms):\n", resp.total, resp.timing_ms);
    for (i, result) in resp.results.iter().enumerate() {
        println!(
            "{}. [{:.2}] {}",
            i + 1,
            result.similarity,
            super::format_type(result.memory.memory_type)
        );
        println!("   {}", super::format_content(&result.memory.content));
        if let Some(file_path) = &result.memory.file_path {
            println!("   File: {file_path}");
        }
        println!();
    }

    Ok(())
}
