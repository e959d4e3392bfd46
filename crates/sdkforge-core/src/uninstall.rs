//! Component removal: reverse of the method-specific install procedures.

use crate::error::InstallError;
use crate::paths::Paths;
use crate::process::{self, shortcut::Shortcuts, vm};
use crate::reporter::{Reporter, Step};
use crate::store::StatusStore;
use sdkforge_schema::{Catalog, ComponentId, Os, PrereqFile, SdkFamily, UninstallMethod};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Uninstall a component and update the status store.
///
/// Idempotent: an absent install directory or missing status entry means
/// already-uninstalled, which is success. Sub-steps (package-manager
/// removal, VM de-registration, shortcut cleanup) run best-effort and
/// log failures without aborting the rest of the procedure.
pub async fn uninstall(
    paths: &Paths,
    status: &mut StatusStore,
    catalog: &Catalog,
    prereq: &PrereqFile,
    reporter: &Arc<dyn Reporter>,
    family: &SdkFamily,
    comp_uid: &ComponentId,
) -> Result<(), InstallError> {
    let (ctype, component) = catalog
        .find(family, comp_uid)
        .ok_or_else(|| InstallError::NotFound(format!("unknown component '{comp_uid}'")))?;

    reporter.component_step(
        comp_uid,
        Step::Uninstalling,
        &format!("Removing {}", component.display_name),
    );

    let record = status.doc().component(family, comp_uid).cloned();
    let dir: PathBuf = record
        .as_ref()
        .map(|r| PathBuf::from(&r.location))
        .unwrap_or_else(|| paths.component_dir(family, &component.subdir));

    match component.uninstall_method {
        UninstallMethod::PackageManager => {
            let cmd = format!("npm uninstall -g {}", component.repository);
            if let Err(e) = process::run_shell(&cmd, None).await {
                warn!(id = %comp_uid, "package-manager removal failed: {e}");
            }
        }
        UninstallMethod::UnregisterVm => {
            let instance = record
                .as_ref()
                .and_then(|r| r.instance_name.clone())
                .unwrap_or_else(|| comp_uid.to_string());
            if let Err(e) = vm::remove_instance(&instance).await {
                warn!(id = %comp_uid, instance, "VM de-registration failed: {e}");
            }
        }
        UninstallMethod::RemoveDirectory => {}
    }

    remove_dir_if_present(&dir);

    if let Some(shortcuts) = Shortcuts::for_user() {
        if let Err(e) = shortcuts.remove(&component.display_name) {
            warn!(id = %comp_uid, "launcher removal failed: {e}");
        }
    }

    if status.remove_component(family, comp_uid)?.is_none() {
        info!(id = %comp_uid, "already uninstalled");
    }

    // Tools kept local to this component are forgotten so a future
    // install re-provisions them. Machine-wide tools stay recorded.
    if let Some(set) = prereq.requirements(family, ctype, Os::current(), comp_uid) {
        for tool in set.keys() {
            let local = prereq.tools.get(tool).is_some_and(|t| !t.global);
            if local {
                status.reset_tool(tool)?;
            }
        }
    }

    reporter.component_step(
        comp_uid,
        Step::Done,
        &format!("{} removed", component.display_name),
    );
    reporter.uninstall_complete(comp_uid);
    Ok(())
}

/// Recursive removal that treats an absent directory as success.
fn remove_dir_if_present(dir: &Path) {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => info!("removed {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove {}: {e}", dir.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::NullReporter;
    use sdkforge_schema::{ComponentRecord, ToolKey, Version};
    use tempfile::TempDir;

    const CATALOG: &str = r#"{
        "tv": {
            "componentTypes": ["tv-simulator"],
            "components": {
                "tv-simulator": [{
                    "id": "tv-simulator-v2",
                    "displayName": "TV Simulator v2",
                    "version": "2.4.0",
                    "installMethod": "launcher-archive",
                    "uninstallMethod": "remove-dir",
                    "expectedSizeMb": 800,
                    "subdir": "sim-v2",
                    "repository": "https://example.org/simulator",
                    "sortOrder": 0
                }]
            }
        }
    }"#;

    const PREREQ: &str = r#"{
        "tools": {
            "influxdb": { "displayName": "InfluxDB", "global": false },
            "java": { "displayName": "Java Runtime", "global": true }
        },
        "dependencies": {
            "tv": {
                "tv-simulator": {
                    "linux": {
                        "-default-": { "influxdb": ">=1.0", "java": ">=11" }
                    }
                }
            }
        },
        "distributions": []
    }"#;

    struct Fixture {
        _home: TempDir,
        paths: Paths,
        status: StatusStore,
        catalog: Catalog,
        prereq: PrereqFile,
    }

    fn fixture() -> Fixture {
        let home = TempDir::new().unwrap();
        let paths = Paths::from_root(home.path());
        std::fs::create_dir_all(paths.root()).unwrap();
        let status = StatusStore::load(&paths).unwrap();
        Fixture {
            paths,
            status,
            catalog: Catalog::from_json(CATALOG).unwrap(),
            prereq: PrereqFile::from_json(PREREQ).unwrap(),
            _home: home,
        }
    }

    async fn run(fx: &mut Fixture) -> Result<(), InstallError> {
        let reporter: Arc<dyn Reporter> = Arc::new(NullReporter);
        uninstall(
            &fx.paths,
            &mut fx.status,
            &fx.catalog,
            &fx.prereq,
            &reporter,
            &SdkFamily::new("tv"),
            &ComponentId::new("tv-simulator-v2"),
        )
        .await
    }

    #[tokio::test]
    async fn removes_directory_and_status_entry() {
        let mut fx = fixture();
        let family = SdkFamily::new("tv");
        let dir = fx.paths.component_dir(&family, "sim-v2");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("marker"), b"x").unwrap();
        fx.status
            .record_component(
                &family,
                ComponentId::new("tv-simulator-v2"),
                ComponentRecord {
                    sdk_version: Version::parse("2.4.0"),
                    location: dir.display().to_string(),
                    instance_name: None,
                },
            )
            .unwrap();

        run(&mut fx).await.unwrap();
        assert!(!dir.exists());
        assert!(fx
            .status
            .doc()
            .component(&family, &ComponentId::new("tv-simulator-v2"))
            .is_none());
    }

    #[tokio::test]
    async fn second_uninstall_is_a_no_op_success() {
        let mut fx = fixture();
        run(&mut fx).await.unwrap();
        // Nothing installed, nothing on disk. Still success.
        run(&mut fx).await.unwrap();
    }

    #[tokio::test]
    async fn component_local_tools_are_reset_global_ones_kept() {
        let mut fx = fixture();
        fx.status
            .record_tool(ToolKey::new("influxdb"), Version::parse("1.8.3"))
            .unwrap();
        fx.status
            .record_tool(ToolKey::new("java"), Version::parse("11.0.2"))
            .unwrap();

        run(&mut fx).await.unwrap();
        assert!(fx
            .status
            .doc()
            .tool_version(&ToolKey::new("influxdb"))
            .is_empty());
        assert_eq!(
            fx.status.doc().tool_version(&ToolKey::new("java")),
            Version::parse("11.0.2")
        );
    }

    #[tokio::test]
    async fn unknown_component_is_not_found() {
        let mut fx = fixture();
        let reporter: Arc<dyn Reporter> = Arc::new(NullReporter);
        let err = uninstall(
            &fx.paths,
            &mut fx.status,
            &fx.catalog,
            &fx.prereq,
            &reporter,
            &SdkFamily::new("tv"),
            &ComponentId::new("nope"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, InstallError::NotFound(_)));
    }
}
