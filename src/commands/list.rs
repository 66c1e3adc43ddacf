//! `moneta list` - show recent memories in the current project.

use super::GlobalArgs;
use anyhow::{Context, Result};
use moneta::store::ListOptions;
use moneta::types::MemoryType;

pub fn execute(globals: &GlobalArgs, limit: usize, memory_type: Option<String>) -> Result<()> {
    let svc = super::init_service(globals)?;
    let project = super::resolve_project(globals);

    let opts = ListOptions {
        project: Some(project.clone()),
        memory_type: memory_type.as_deref().map(MemoryType::parse_lossy),
        limit,
        descending: true,
        ..ListOptions::default()
    };

    let memories = svc.list(&opts).context("failed to list memories")?;

    if memories.is_empty() {
        println!("No memories found");
        return Ok(());
    }

    println!("Memories in project '{project}':\n");
    for memory in &memories {
        println!(
            "  [{}] {}",
            super::format_type(memory.memory_type),
            super::truncate(&memory.content, 80)
        );
        println!("    ID: {}\n", memory.id);
    }

    Ok(())
}
