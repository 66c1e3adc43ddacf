//! `moneta delete` - remove one memory, or a whole project with --all.

use super::GlobalArgs;
use anyhow::{Context, Result};

pub fn execute(globals: &GlobalArgs, id: Option<String>, all: bool) -> Result<()> {
    let svc = super::init_service(globals)?;

    if all {
        let project = super::resolve_project(globals);
        svc.delete_by_project(&project)
            .context("failed to delete memories")?;
        println!("Deleted all memories in project '{project}'");
        return Ok(());
    }

    let Some(id) = id else {
        anyhow::bail!("memory ID required (or use --all)");
    };

    svc.delete(&id).context("failed to delete memory")?;
    println!("Deleted: {id}");
    Ok(())
}
