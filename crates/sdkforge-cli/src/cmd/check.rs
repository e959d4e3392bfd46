//! Check command: print the prerequisite resolution without installing.

use crate::{resolve_paths, Target};
use anyhow::{bail, Context, Result};
use comfy_table::{presets::UTF8_BORDERS_ONLY, Table};
use sdkforge_core::resolver;
use sdkforge_core::store::{load_prereq, StatusStore};
use sdkforge_schema::Os;

/// Resolve and print a component's prerequisite set.
pub fn check(target: &str) -> Result<()> {
    let target = Target::parse(target)?;
    let Some(ctype) = target.ctype.clone() else {
        bail!("check needs the full <family>/<type>/<id> form");
    };

    let paths = resolve_paths()?;
    let prereq = load_prereq(&paths)
        .with_context(|| format!("no prerequisite file at {}", paths.prereq_file().display()))?;
    let mut status = StatusStore::load(&paths)?;
    status.refresh()?;

    let resolved = resolver::resolve(
        &prereq,
        status.doc(),
        &target.family,
        &ctype,
        &target.id,
        Os::current(),
    )?;

    if resolved.is_empty() {
        println!("'{}' has no prerequisites on this OS.", target.id);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(["Tool", "Constraint", "Detected", "Satisfied", "Would install"]);
    for (tool, req) in &resolved {
        let chosen = req
            .distribution
            .as_ref()
            .map_or_else(String::new, |d| d.version.to_string());
        table.add_row([
            tool.as_str(),
            &req.constraint.to_string(),
            req.detected_version.as_str(),
            if req.satisfied { "yes" } else { "no" },
            &chosen,
        ]);
    }
    println!("{table}");
    Ok(())
}
