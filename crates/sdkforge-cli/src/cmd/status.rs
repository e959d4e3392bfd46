//! Status command: installed components and detected tools.

use crate::resolve_paths;
use anyhow::Result;
use crossterm::style::Stylize;
use sdkforge_core::store::StatusStore;

/// Show what is installed on this machine.
pub fn status() -> Result<()> {
    let paths = resolve_paths()?;
    let mut status = StatusStore::load(&paths)?;
    status.refresh()?;

    let status_date = std::fs::metadata(paths.status_file())
        .ok()
        .and_then(|m| m.modified().ok())
        .map_or_else(
            || "never".to_string(),
            |t| {
                chrono::DateTime::<chrono::Local>::from(t)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            },
        );

    println!();
    println!("{}", "SDK status".dark_grey());
    println!();
    println!("{:<12}{}", "Home:", paths.root().display());
    println!("{:<12}{}", "Updated:", status_date);

    let doc = status.doc();
    let installed: usize = doc.families.values().map(|m| m.len()).sum();
    println!("{:<12}{} component(s)", "Installed:", installed);
    println!();

    for (family, comps) in &doc.families {
        for (id, rec) in comps {
            let instance = rec
                .instance_name
                .as_ref()
                .map_or_else(String::new, |n| format!("  [{n}]"));
            println!("  {family}/{id}  {}{instance}", rec.sdk_version);
        }
    }
    if installed > 0 {
        println!();
    }

    if doc.pre_req.is_empty() {
        println!("{}", "No prerequisite tools detected".dark_grey());
    } else {
        println!("{}", "Detected tools".dark_grey());
        for (tool, version) in &doc.pre_req {
            println!("  {:<20}{version}", tool.as_str());
        }
    }
    Ok(())
}
