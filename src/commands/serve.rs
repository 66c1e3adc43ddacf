//! `moneta serve` - run the HTTP API for editor integrations.

use super::GlobalArgs;
use anyhow::{Context, Result};
use moneta::server::{self, ServerConfig};
use std::sync::Arc;

pub fn execute(globals: &GlobalArgs, host: String, port: u16) -> Result<()> {
    let svc = Arc::new(super::init_service(globals)?);

    println!("Moneta server listening on http://{host}:{port}");
    println!("Press Ctrl+C to stop");
    println!();
    println!("Endpoints:");
    println!("  POST   /memory      - Add a memory");
    println!("  POST   /search      - Search memories");
    println!("  POST   /index       - Index a file or directory");
    println!("  GET    /memory/:id  - Get a memory");
    println!("  DELETE /memory/:id  - Delete a memory");
    println!("  GET    /stats       - Get statistics");
    println!("  GET    /projects    - List projects");
    println!("  GET    /health      - Health check");

    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
    runtime.block_on(server::serve(svc, ServerConfig { host, port }))
}
