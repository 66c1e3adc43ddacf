//! `moneta stats` - storage statistics.

use super::GlobalArgs;
use anyhow::{Context, Result};

pub fn execute(globals: &GlobalArgs) -> Result<()> {
    let svc = super::init_service(globals)?;
    let stats = svc.stats().context("failed to get stats")?;

    println!("Moneta Statistics");
    println!("─────────────────");
    println!("Total memories:  {}", stats.total_memories);
    println!("Projects:        {}", stats.project_count);
    println!("Embedding model: {}", stats.embedding_model);
    println!(
        "Storage size:    {:.2} MB",
        stats.storage_bytes as f64 / 1024.0 / 1024.0
    );
    println!();

    if !stats.memories_by_type.is_empty() {
        println!("By type:");
        let mut entries: Vec<_> = stats.memories_by_type.iter().collect();
        entries.sort();
        for (memory_type, count) in entries {
            println!("  {memory_type:<15} {count}");
        }
    }

    Ok(())
}
