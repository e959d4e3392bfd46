//! Install and uninstall method tags.
//!
//! Each tag selects one procedure variant in the engine. The wire names are
//! the ones the catalog and prerequisite documents carry.

use serde::{Deserialize, Serialize};

/// How a component is installed once its prerequisites are satisfied.
///
/// Every variant follows the same four-phase shape: download,
/// unpack/execute, register with the status store, provision a shortcut
/// where applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallMethod {
    /// Global install through the host package manager (e.g. `npm -g`).
    #[serde(rename = "pm-global")]
    PackageManagerGlobal,
    /// Clone/fetch sources into the component directory and link binaries.
    #[serde(rename = "source-link")]
    SourceCheckoutAndLink,
    /// Download an archive, extract it, and register a VM instance from the
    /// extracted image.
    #[serde(rename = "vm-archive")]
    ArchiveAndRegisterVm,
    /// Download an archive, extract it, and expose a desktop launcher.
    #[serde(rename = "launcher-archive")]
    ArchiveAndLauncher,
}

/// How a prerequisite tool is installed. Encodes the delivery mechanism;
/// the OS is carried separately on the distribution row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolInstallMethod {
    /// Run a native installer package (`.exe`, `.pkg`, `.run`).
    #[serde(rename = "installer")]
    InstallerPackage,
    /// Run an install script through the host package manager.
    #[serde(rename = "pm-script")]
    PackageManagerScript,
    /// Download and extract a compressed archive into the tools directory.
    #[serde(rename = "archive")]
    Archive,
    /// Delegate to a version manager already on the machine (e.g. `sdkman`,
    /// `nvm`).
    #[serde(rename = "version-manager")]
    VersionManager,
}

/// How a component is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UninstallMethod {
    /// Global uninstall through the host package manager.
    #[serde(rename = "pm-global")]
    PackageManager,
    /// Pause, power off, and unregister the VM instance, deleting its
    /// media, then remove the component directory.
    #[serde(rename = "vm-unregister")]
    UnregisterVm,
    /// Plain recursive removal of the component directory.
    #[serde(rename = "remove-dir")]
    RemoveDirectory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_stable() {
        assert_eq!(
            serde_json::to_string(&InstallMethod::ArchiveAndRegisterVm).unwrap(),
            "\"vm-archive\""
        );
        assert_eq!(
            serde_json::to_string(&ToolInstallMethod::VersionManager).unwrap(),
            "\"version-manager\""
        );
        let m: UninstallMethod = serde_json::from_str("\"vm-unregister\"").unwrap();
        assert_eq!(m, UninstallMethod::UnregisterVm);
    }
}
