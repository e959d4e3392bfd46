//! Filesystem layout of the sdkforge home directory.
//!
//! Everything lives under one root so the whole installation can be moved
//! or wiped as a unit. The root is `~/.sdkforge`, overridable through
//! `SDKFORGE_HOME`. The engine never touches these functions directly; it
//! carries a [`Paths`] handle so tests can point it at a temp directory.

use dirs::home_dir;
use sdkforge_schema::SdkFamily;
use std::path::{Path, PathBuf};

/// Returns the configured home directory, or None if the user's home
/// cannot be resolved.
pub fn try_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("SDKFORGE_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".sdkforge"))
}

/// Resolved filesystem layout handed to the engine.
#[derive(Debug, Clone)]
pub struct Paths {
    root: PathBuf,
}

impl Paths {
    /// Layout rooted at an explicit directory (tests, custom installs).
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at `SDKFORGE_HOME` or `~/.sdkforge`.
    ///
    /// Returns `None` when no home directory can be determined.
    pub fn resolve() -> Option<Self> {
        try_home().map(|root| Self { root })
    }

    /// The root directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Catalog document: `<root>/catalog.json`.
    pub fn catalog_file(&self) -> PathBuf {
        self.root.join("catalog.json")
    }

    /// Prerequisite document: `<root>/prereq.json`.
    pub fn prereq_file(&self) -> PathBuf {
        self.root.join("prereq.json")
    }

    /// Status document: `<root>/status.json`.
    pub fn status_file(&self) -> PathBuf {
        self.root.join("status.json")
    }

    /// Install root for all SDK families: `<root>/sdk`.
    pub fn sdk_root(&self) -> PathBuf {
        self.root.join("sdk")
    }

    /// Install root for one family: `<root>/sdk/<family>`.
    pub fn family_root(&self, family: &SdkFamily) -> PathBuf {
        self.sdk_root().join(family.as_str())
    }

    /// Directory a component installs into: `<root>/sdk/<family>/<subdir>`.
    pub fn component_dir(&self, family: &SdkFamily, subdir: &str) -> PathBuf {
        self.family_root(family).join(subdir)
    }

    /// Machine-local tool installs: `<root>/tools/<tool_key>`.
    pub fn tool_dir(&self, tool: &str) -> PathBuf {
        self.root.join("tools").join(tool)
    }

    /// Download staging area: `<root>/tmp`.
    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    /// Log directory: `<root>/logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}
