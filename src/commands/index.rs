//! `moneta index` - chunk and embed a file or directory tree.

use super::GlobalArgs;
use anyhow::{Context, Result};
use moneta::types::IndexRequest;
use std::time::Instant;

pub fn execute(globals: &GlobalArgs, path: String) -> Result<()> {
    let svc = super::init_service(globals)?;

    println!("Indexing {path}...");
    let start = Instant::now();

    let req = IndexRequest {
        path,
        project: super::resolve_project(globals),
        language: None,
    };

    let count = svc.index(req).context("indexing failed")?;

    println!(
        "Indexed {} chunks in {}ms",
        count,
        start.elapsed().as_millis()
    );
    Ok(())
}
