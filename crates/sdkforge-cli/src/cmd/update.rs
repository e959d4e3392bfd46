//! Update command: catalog auto-update from release feeds.

use crate::resolve_paths;
use anyhow::{Context, Result};
use sdkforge_core::store::CatalogStore;

/// Fetch release feeds and append newly discovered component versions.
pub async fn update() -> Result<()> {
    let paths = resolve_paths()?;
    let mut catalog = CatalogStore::load(&paths)
        .with_context(|| format!("no catalog at {}", paths.catalog_file().display()))?;

    let client = reqwest::Client::builder()
        .user_agent(sdkforge_core::USER_AGENT)
        .build()?;
    let appended = catalog.auto_update(&client).await?;

    if appended == 0 {
        println!("Catalog is up to date.");
    } else {
        println!("Added {appended} new component version(s).");
    }
    Ok(())
}
