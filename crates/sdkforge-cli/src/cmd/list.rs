//! List command: the catalog with installed markers.

use crate::resolve_paths;
use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use sdkforge_core::store::{CatalogStore, StatusStore};

/// Print catalog components, optionally restricted to one family.
pub fn list(family: Option<&str>) -> Result<()> {
    let paths = resolve_paths()?;
    let catalog = CatalogStore::load(&paths)
        .with_context(|| format!("no catalog at {}", paths.catalog_file().display()))?;
    let mut status = StatusStore::load(&paths)?;
    status.refresh()?;

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(["Family", "Type", "Component", "Version", "Size (MB)", "Installed"]);

    let mut rows = 0usize;
    for (fam, fam_catalog) in &catalog.catalog().families {
        if family.is_some_and(|f| fam != &f) {
            continue;
        }
        for ctype in &fam_catalog.component_types {
            for component in catalog.catalog().components(fam, ctype) {
                let installed = status
                    .doc()
                    .component(fam, &component.id)
                    .map_or_else(String::new, |r| r.sdk_version.to_string());
                table.add_row([
                    fam.as_str(),
                    ctype.as_str(),
                    component.id.as_str(),
                    &component.version.to_string(),
                    &component.expected_size_mb.to_string(),
                    &installed,
                ]);
                rows += 1;
            }
        }
    }

    if rows == 0 {
        let scope = family.map_or_else(|| "the catalog".to_string(), |f| format!("family '{f}'"));
        println!("No components in {scope}.");
        return Ok(());
    }
    println!("{table}");
    Ok(())
}
