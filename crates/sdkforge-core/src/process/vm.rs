//! Virtual-machine manager adapter (VBoxManage-compatible CLI).
//!
//! Emulator components register a VM instance from an extracted disk
//! image. The adapter wraps the handful of `VBoxManage` invocations the
//! engine needs and parses its `list vms` output.

use crate::process::{run, ProcessError};
use std::path::Path;
use tracing::{debug, warn};

const VBOX_MANAGE: &str = "VBoxManage";

/// Parse `VBoxManage list vms` output into instance names.
///
/// Lines look like `"tv-emulator-v5" {8a3c...}`.
fn parse_vm_list(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let rest = line.strip_prefix('"')?;
            let end = rest.find('"')?;
            Some(rest[..end].to_string())
        })
        .collect()
}

/// Names of all registered VM instances.
pub async fn list_instances() -> Result<Vec<String>, ProcessError> {
    let out = run(VBOX_MANAGE, &["list", "vms"], None).await?;
    Ok(parse_vm_list(&out))
}

/// Whether an instance with this exact name is registered.
pub async fn instance_exists(name: &str) -> Result<bool, ProcessError> {
    Ok(list_instances().await?.iter().any(|n| n == name))
}

/// Register a VM instance from an extracted image directory and return the
/// instance name actually created.
///
/// The image directory must contain exactly one `.ovf` or `.vbox`
/// definition; `.ovf` images are imported, `.vbox` definitions registered
/// in place.
pub async fn register_instance(name: &str, image_dir: &Path) -> Result<String, ProcessError> {
    let definition = find_definition(image_dir).ok_or_else(|| ProcessError::NonZeroExit {
        program: VBOX_MANAGE.to_string(),
        code: -1,
        stderr: format!("no .ovf or .vbox definition under {}", image_dir.display()),
    })?;
    let def_str = definition.to_string_lossy();

    if definition.extension().is_some_and(|e| e == "ovf") {
        run(
            VBOX_MANAGE,
            &["import", &def_str, "--vsys", "0", "--vmname", name],
            None,
        )
        .await?;
    } else {
        run(VBOX_MANAGE, &["registervm", &def_str], None).await?;
    }
    debug!(name, "registered VM instance");
    Ok(name.to_string())
}

/// Tear an instance down: pause, power off, unregister with media delete.
///
/// Pause and poweroff fail when the VM is not running; those failures are
/// expected and only logged.
pub async fn remove_instance(name: &str) -> Result<(), ProcessError> {
    for sub in ["pause", "poweroff"] {
        if let Err(e) = run(VBOX_MANAGE, &["controlvm", name, sub], None).await {
            debug!(name, sub, "controlvm step skipped: {e}");
        }
    }
    match run(VBOX_MANAGE, &["unregistervm", name, "--delete"], None).await {
        Ok(_) => Ok(()),
        Err(ProcessError::NonZeroExit { stderr, .. })
            if stderr.contains("Could not find a registered machine") =>
        {
            // Already gone; uninstall stays idempotent.
            warn!(name, "VM instance was not registered");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn find_definition(image_dir: &Path) -> Option<std::path::PathBuf> {
    walkdir::WalkDir::new(image_dir)
        .max_depth(2)
        .into_iter()
        .flatten()
        .map(|e| e.into_path())
        .find(|p| {
            p.extension()
                .is_some_and(|ext| ext == "ovf" || ext == "vbox")
        })
}
