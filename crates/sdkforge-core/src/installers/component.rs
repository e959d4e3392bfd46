//! Component install procedures, one per install-method tag.

use super::InstallContext;
use crate::error::InstallError;
use crate::io::download::DownloadRequest;
use crate::io::extract;
use crate::process::{self, vm};
use crate::reporter::Step;
use crate::store::StatusStore;
use sdkforge_schema::{Component, ComponentRecord, InstallMethod, SdkFamily};
use std::path::Path;
use tracing::{debug, info};

/// Install a component whose prerequisites are already satisfied.
///
/// Dispatches on the install-method tag. Every variant ends by writing a
/// [`ComponentRecord`] to the status store; the `location` it records is
/// the directory whose existence the status refresh later checks.
pub async fn install_component(
    ctx: &InstallContext<'_>,
    status: &mut StatusStore,
    family: &SdkFamily,
    component: &Component,
) -> Result<ComponentRecord, InstallError> {
    info!(id = %component.id, method = ?component.install_method, "installing component");

    let record = match component.install_method {
        InstallMethod::PackageManagerGlobal => install_pm_global(ctx, component).await?,
        InstallMethod::SourceCheckoutAndLink => {
            install_source_link(ctx, family, component).await?
        }
        InstallMethod::ArchiveAndRegisterVm => install_vm_archive(ctx, family, component).await?,
        InstallMethod::ArchiveAndLauncher => {
            install_launcher_archive(ctx, family, component).await?
        }
    };

    status.record_component(family, component.id.clone(), record.clone())?;
    ctx.reporter.component_step(
        &component.id,
        Step::Done,
        &format!("{} {} installed", component.display_name, component.version),
    );
    Ok(record)
}

/// URL of the component's archive artifact: `<repository>/<subdir>-<version>`
/// with a platform-appropriate archive extension.
pub(crate) fn archive_url(component: &Component) -> String {
    let ext = if cfg!(target_os = "windows") {
        "zip"
    } else {
        "tar.gz"
    };
    format!(
        "{}/{}-{}.{}",
        component.repository.trim_end_matches('/'),
        component.subdir,
        component.version,
        ext
    )
}

/// Global install through the system package manager. The catalog's
/// `repository` field is the package name or tarball URL passed to npm.
async fn install_pm_global(
    ctx: &InstallContext<'_>,
    component: &Component,
) -> Result<ComponentRecord, InstallError> {
    ctx.reporter.component_step(
        &component.id,
        Step::Installing,
        &format!("Installing {}", component.display_name),
    );
    process::run_shell(&format!("npm install -g {}", component.repository), None).await?;

    // The global root is where the refresh step will look for the install.
    let global_root = process::run_shell("npm root -g", None).await?;
    let location = Path::new(global_root.trim()).join(&component.subdir);
    Ok(ComponentRecord {
        sdk_version: component.version.clone(),
        location: location.display().to_string(),
        instance_name: None,
    })
}

/// Clone the component's source repository and link it into the global
/// package-manager namespace.
async fn install_source_link(
    ctx: &InstallContext<'_>,
    family: &SdkFamily,
    component: &Component,
) -> Result<ComponentRecord, InstallError> {
    let dest = ctx.paths.component_dir(family, &component.subdir);
    ctx.reporter.component_step(
        &component.id,
        Step::Downloading,
        &format!("Cloning {}", component.display_name),
    );
    process::run(
        "git",
        &[
            "clone",
            "--depth",
            "1",
            &component.repository,
            &dest.display().to_string(),
        ],
        None,
    )
    .await?;

    ctx.reporter.component_step(
        &component.id,
        Step::Installing,
        &format!("Linking {}", component.display_name),
    );
    process::run_shell("npm install && npm link", Some(&dest)).await?;

    Ok(ComponentRecord {
        sdk_version: component.version.clone(),
        location: dest.display().to_string(),
        instance_name: None,
    })
}

/// Download, extract, and register a virtual-machine image.
async fn install_vm_archive(
    ctx: &InstallContext<'_>,
    family: &SdkFamily,
    component: &Component,
) -> Result<ComponentRecord, InstallError> {
    // Conflict check before any download or extraction.
    if vm::instance_exists(component.id.as_str()).await? {
        return Err(InstallError::InstanceAlreadyExists(
            component.id.to_string(),
        ));
    }

    let dest = ctx.paths.component_dir(family, &component.subdir);
    fetch_and_extract(ctx, component, &dest).await?;

    ctx.reporter.component_step(
        &component.id,
        Step::Installing,
        &format!("Registering {}", component.display_name),
    );
    let instance = vm::register_instance(component.id.as_str(), &dest).await?;

    Ok(ComponentRecord {
        sdk_version: component.version.clone(),
        location: dest.display().to_string(),
        instance_name: Some(instance),
    })
}

/// Download, extract, and expose the component through a desktop launcher.
async fn install_launcher_archive(
    ctx: &InstallContext<'_>,
    family: &SdkFamily,
    component: &Component,
) -> Result<ComponentRecord, InstallError> {
    let dest = ctx.paths.component_dir(family, &component.subdir);
    fetch_and_extract(ctx, component, &dest).await?;

    ctx.reporter.component_step(
        &component.id,
        Step::Installing,
        &format!("Creating launcher for {}", component.display_name),
    );
    if let Some(shortcuts) = ctx.shortcuts {
        shortcuts.create(&component.display_name, &dest).await?;
    } else {
        debug!(id = %component.id, "no launcher directory on this machine");
    }

    Ok(ComponentRecord {
        sdk_version: component.version.clone(),
        location: dest.display().to_string(),
        instance_name: None,
    })
}

/// Shared download-then-extract phase of the archive-based methods.
/// The artifact is staged under `tmp/` and removed after extraction.
async fn fetch_and_extract(
    ctx: &InstallContext<'_>,
    component: &Component,
    dest: &Path,
) -> Result<(), InstallError> {
    let url = archive_url(component);
    ctx.reporter.component_step(
        &component.id,
        Step::Downloading,
        &format!("Downloading {}", component.display_name),
    );
    let staging = ctx.paths.tmp_dir().join(component.id.as_str());
    let artifact = DownloadRequest {
        client: ctx.client,
        comp_uid: &component.id,
        url: &url,
        dest_dir: &staging,
        expected_sha256: None,
        reporter: &ctx.reporter,
        cancel: ctx.cancel,
    }
    .execute()
    .await?;

    ctx.reporter.component_step(
        &component.id,
        Step::Extracting,
        &format!("Extracting {}", component.display_name),
    );
    extract::extract(&artifact, dest).await?;

    if let Err(e) = tokio::fs::remove_file(&artifact).await {
        debug!("leaving artifact behind: {e}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdkforge_schema::{ComponentId, UninstallMethod, Version};

    fn component(repo: &str) -> Component {
        Component {
            id: ComponentId::new("tv-emulator-v5"),
            display_name: "TV Emulator v5".into(),
            version: Version::parse("5.0.0"),
            install_method: InstallMethod::ArchiveAndRegisterVm,
            uninstall_method: UninstallMethod::UnregisterVm,
            expected_size_mb: 2100,
            subdir: "v5.0.0".into(),
            repository: repo.into(),
            sort_order: 0,
        }
    }

    #[test]
    fn archive_url_joins_repository_subdir_and_version() {
        let url = archive_url(&component("https://example.org/emulator/"));
        if cfg!(target_os = "windows") {
            assert_eq!(url, "https://example.org/emulator/v5.0.0-5.0.0.zip");
        } else {
            assert_eq!(url, "https://example.org/emulator/v5.0.0-5.0.0.tar.gz");
        }
    }
}
