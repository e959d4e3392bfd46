//! Prerequisite tool install procedures.

use super::InstallContext;
use crate::error::InstallError;
use crate::io::download::DownloadRequest;
use crate::io::extract;
use crate::process;
use crate::reporter::Step;
use crate::resolver::Requirement;
use crate::store::StatusStore;
use sdkforge_schema::{ComponentId, ToolInstallMethod, ToolKey};
use std::path::Path;
use tracing::{debug, info, warn};

/// Install one unmet prerequisite tool for the component `comp_uid`.
///
/// Dispatches on the chosen distribution's install-method tag, and on
/// success records the installed version in the status store. Busy-mark
/// bookkeeping stays with the orchestrator.
pub async fn install_tool(
    ctx: &InstallContext<'_>,
    status: &mut StatusStore,
    comp_uid: &ComponentId,
    tool: &ToolKey,
    req: &Requirement,
) -> Result<(), InstallError> {
    let dist = req
        .distribution
        .as_ref()
        .ok_or_else(|| InstallError::Unsatisfiable {
            tool: tool.clone(),
            constraint: req.constraint.to_string(),
        })?;

    info!(%tool, version = %dist.version, method = ?dist.install_method, "installing tool");
    ctx.reporter.tool_step(
        comp_uid,
        Step::Downloading,
        &format!("Downloading {} {}", req.display_name, dist.version),
    );

    let staging = ctx.paths.tmp_dir().join(tool.as_str());
    let artifact = DownloadRequest {
        client: ctx.client,
        comp_uid,
        url: &dist.download_location,
        dest_dir: &staging,
        expected_sha256: dist.sha256.as_deref(),
        reporter: &ctx.reporter,
        cancel: ctx.cancel,
    }
    .execute()
    .await?;

    match dist.install_method {
        ToolInstallMethod::InstallerPackage => {
            ctx.reporter.tool_step(
                comp_uid,
                Step::Installing,
                &format!("Installing {}", req.display_name),
            );
            run_installer_package(&artifact).await?;
        }
        ToolInstallMethod::PackageManagerScript => {
            ctx.reporter.tool_step(
                comp_uid,
                Step::Installing,
                &format!("Installing {}", req.display_name),
            );
            process::run_shell(&format!("sh '{}'", artifact.display()), None).await?;
        }
        ToolInstallMethod::Archive => {
            ctx.reporter.tool_step(
                comp_uid,
                Step::Extracting,
                &format!("Extracting {}", req.display_name),
            );
            let dest = ctx.paths.tool_dir(tool.as_str());
            extract::extract(&artifact, &dest).await?;
            persist_tool_home(tool, &dest).await;
        }
        ToolInstallMethod::VersionManager => {
            ctx.reporter.tool_step(
                comp_uid,
                Step::Installing,
                &format!("Installing {} {}", req.display_name, dist.version),
            );
            // The artifact is the manager bootstrap script; it takes the
            // requested version as its argument.
            process::run_shell(
                &format!("sh '{}' {}", artifact.display(), dist.version),
                None,
            )
            .await?;
        }
    }

    if let Err(e) = tokio::fs::remove_file(&artifact).await {
        debug!("leaving artifact behind: {e}");
    }

    status.record_tool(tool.clone(), dist.version.clone())?;
    ctx.reporter.tool_step(
        comp_uid,
        Step::Done,
        &format!("{} {} installed", req.display_name, dist.version),
    );
    Ok(())
}

/// Run a native installer package with elevation.
async fn run_installer_package(artifact: &Path) -> Result<(), InstallError> {
    let path = artifact.display().to_string();
    if cfg!(target_os = "macos") {
        process::run_elevated("installer", &["-pkg", &path, "-target", "/"]).await?;
    } else if cfg!(target_os = "windows") {
        process::run_elevated(&path, &["/S"]).await?;
    } else {
        process::run_elevated("dpkg", &["-i", &path]).await?;
    }
    Ok(())
}

/// Export `<TOOL>_HOME` so shells launched after the install can find a
/// component-local archive tool. Failure is logged, not fatal.
async fn persist_tool_home(tool: &ToolKey, dir: &Path) {
    let key = format!(
        "{}_HOME",
        tool.as_str().to_uppercase().replace(['-', '.'], "_")
    );
    if let Err(e) = process::env::persist_var(&key, &dir.display().to_string()).await {
        warn!(%tool, "could not persist {key}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_home_key_is_shell_safe() {
        let key = format!(
            "{}_HOME",
            ToolKey::new("influx-db.v1")
                .as_str()
                .to_uppercase()
                .replace(['-', '.'], "_")
        );
        assert_eq!(key, "INFLUX_DB_V1_HOME");
    }
}
