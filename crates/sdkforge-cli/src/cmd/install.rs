//! Install command: check, confirm, enqueue, drain.

use crate::ui::reporter_for;
use crate::{resolve_paths, Target};
use anyhow::{bail, Context, Result};
use sdkforge_core::queue::{ItemState, QueueItem};
use sdkforge_core::store::{load_prereq, CatalogStore, StatusStore};
use sdkforge_core::{Orchestrator, Paths, Planned};
use sdkforge_schema::Os;

/// Install one component, prerequisites first.
pub async fn install(target: &str, yes: bool, json: bool) -> Result<()> {
    let target = Target::parse(target)?;
    let Some(ctype) = target.ctype.clone() else {
        bail!("install needs the full <family>/<type>/<id> form");
    };

    let paths = resolve_paths()?;
    let catalog = CatalogStore::load(&paths)
        .with_context(|| format!("no catalog at {}", paths.catalog_file().display()))?;
    let prereq = load_prereq(&paths)
        .with_context(|| format!("no prerequisite file at {}", paths.prereq_file().display()))?;
    let mut status = StatusStore::load(&paths)?;
    status.refresh()?;

    let reporter = reporter_for(json);
    let mut orch = Orchestrator::new(paths.clone(), catalog, prereq, status, reporter);

    let plan = match orch.plan(&target.family, &ctype, &target.id, Os::current())? {
        Planned::AlreadyInstalled => {
            println!("'{}' is already installed.", target.id);
            return Ok(());
        }
        Planned::Ready(plan) => plan,
    };

    if !yes && !json {
        println!();
        println!(
            "Installing {} {} ({} MB including prerequisites)",
            plan.component.display_name, plan.component.version, plan.required_mb
        );
        for (tool, req) in &plan.unmet {
            let chosen = req
                .distribution
                .as_ref()
                .map_or_else(|| "?".to_string(), |d| d.version.to_string());
            println!("  requires {} {} (have: {})", tool, chosen, req.detected_version);
        }
        print!("Proceed? [y/N] ");
        use std::io::Write;
        std::io::stdout().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    orch.enqueue(plan)?;

    // Ctrl-C cancels the in-flight download; the queue loop then cleans
    // up the partial directory and exits through the Cancelled state.
    let cancel = orch.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let finished = orch.process_queue().await;
    for item in finished.iter().filter(|i| i.state == ItemState::Failed) {
        if let Some(log) = write_failure_log(&paths, item) {
            if !json {
                println!("Details logged to {log}");
            }
        }
    }
    Ok(())
}

/// Persist a failed item's error under the log directory, in the shape
/// `install-<id>-<timestamp>.log`. Returns the path on success.
fn write_failure_log(paths: &Paths, item: &QueueItem) -> Option<String> {
    let error = item.error.as_deref()?;
    let dir = paths.log_dir();
    std::fs::create_dir_all(&dir).ok()?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(format!("install-{}-{stamp}.log", item.component.id));
    let body = format!(
        "component: {}\nversion: {}\nartifact: {}\nerror: {error}\n",
        item.component.id,
        item.component.version,
        item.artifact.as_deref().unwrap_or("-"),
    );
    std::fs::write(&path, body).ok()?;
    Some(path.display().to_string())
}
