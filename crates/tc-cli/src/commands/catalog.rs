//! Catalog command implementation

use anyhow::{Context, Result};
use std::path::Path;
use tc_core::load_catalog_json;
use tc_db::catalog;

use crate::cli::{CatalogArgs, CatalogCommands, GlobalArgs};
use crate::commands::common;

/// Execute the catalog command
pub async fn execute(args: &CatalogArgs, global: &GlobalArgs) -> Result<()> {
    match &args.command {
        CatalogCommands::Load { path } => load(path, global),
    }
}

fn load(path: &str, global: &GlobalArgs) -> Result<()> {
    let checks = load_catalog_json(Path::new(path)).context("Failed to read catalog")?;
    let (_, db) = common::open(global)?;
    db.transaction(|conn| catalog::replace(conn, &checks))
        .context("Failed to replace catalog")?;
    log::info!("Loaded {} checks from {path}", checks.len());
    println!(
        "Loaded {} checks. Run `tripcheck classify` to refresh classifications.",
        checks.len()
    );
    Ok(())
}
