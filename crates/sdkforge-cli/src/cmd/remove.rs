//! Remove command.

use crate::ui::reporter_for;
use crate::{resolve_paths, Target};
use anyhow::{Context, Result};
use sdkforge_core::store::{load_prereq, CatalogStore, StatusStore};
use sdkforge_core::uninstall;

/// Uninstall one component.
pub async fn remove(target: &str, yes: bool, json: bool) -> Result<()> {
    let target = Target::parse(target)?;

    let paths = resolve_paths()?;
    let catalog = CatalogStore::load(&paths)
        .with_context(|| format!("no catalog at {}", paths.catalog_file().display()))?;
    let prereq = load_prereq(&paths)
        .with_context(|| format!("no prerequisite file at {}", paths.prereq_file().display()))?;
    let mut status = StatusStore::load(&paths)?;
    status.refresh()?;

    if !yes && !json {
        print!("Remove '{}'? [y/N] ", target.id);
        use std::io::Write;
        std::io::stdout().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let reporter = reporter_for(json);
    uninstall::uninstall(
        &paths,
        &mut status,
        catalog.catalog(),
        &prereq,
        &reporter,
        &target.family,
        &target.id,
    )
    .await?;
    Ok(())
}
