//! Persisted installation status.
//!
//! The document is a cache of what is actually on disk: directory
//! existence is the ground truth, and [`StatusStore::refresh`] re-derives
//! the component entries from it before the document is served. Every
//! mutation rewrites the file as a whole.

use crate::error::StoreError;
use crate::paths::Paths;
use sdkforge_schema::{ComponentId, ComponentRecord, SdkFamily, StatusDoc, ToolKey, Version};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Handle to the status document. The single source of truth queried
/// before every install/uninstall decision.
#[derive(Debug)]
pub struct StatusStore {
    path: PathBuf,
    doc: StatusDoc,
}

impl StatusStore {
    /// Load the document, or start empty when the file does not exist yet.
    pub fn load(paths: &Paths) -> Result<Self, StoreError> {
        let path = paths.status_file();
        let doc = match std::fs::read_to_string(&path) {
            Ok(json) => {
                serde_json::from_str(&json).map_err(|source| StoreError::Malformed {
                    path: path.display().to_string(),
                    source,
                })?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StatusDoc::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, doc })
    }

    /// Read access to the current document.
    pub fn doc(&self) -> &StatusDoc {
        &self.doc
    }

    /// Drop component entries whose install directory no longer exists,
    /// then persist if anything changed.
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        let mut stale: Vec<(SdkFamily, ComponentId)> = Vec::new();
        for (family, comps) in &self.doc.families {
            for (id, rec) in comps {
                if !Path::new(&rec.location).is_dir() {
                    stale.push((family.clone(), id.clone()));
                }
            }
        }
        if stale.is_empty() {
            return Ok(());
        }
        for (family, id) in stale {
            warn!(%family, %id, "install directory missing, dropping status entry");
            self.doc.remove_component(&family, &id);
        }
        self.save()
    }

    /// Record a successful component install.
    pub fn record_component(
        &mut self,
        family: &SdkFamily,
        id: ComponentId,
        record: ComponentRecord,
    ) -> Result<(), StoreError> {
        self.doc.set_component(family, id, record);
        self.save()
    }

    /// Remove a component entry. Absence is not an error.
    pub fn remove_component(
        &mut self,
        family: &SdkFamily,
        id: &ComponentId,
    ) -> Result<Option<ComponentRecord>, StoreError> {
        let rec = self.doc.remove_component(family, id);
        self.save()?;
        Ok(rec)
    }

    /// Record a detected prerequisite-tool version.
    pub fn record_tool(&mut self, tool: ToolKey, version: Version) -> Result<(), StoreError> {
        self.doc.set_tool(tool, version);
        self.save()
    }

    /// Forget a tool so the next install re-provisions it.
    pub fn reset_tool(&mut self, tool: &ToolKey) -> Result<(), StoreError> {
        self.doc.reset_tool(tool);
        self.save()
    }

    /// Whole-document replace on disk.
    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json =
            serde_json::to_string_pretty(&self.doc).map_err(|source| StoreError::Malformed {
                path: self.path.display().to_string(),
                source,
            })?;
        std::fs::write(&self.path, json)?;
        debug!("status written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(root: &Path) -> StatusStore {
        StatusStore::load(&Paths::from_root(root)).unwrap()
    }

    #[test]
    fn starts_empty_and_persists_mutations() {
        let tmp = tempdir().unwrap();
        let fam = SdkFamily::new("tv");
        let dir = tmp.path().join("sdk/tv/v5");
        std::fs::create_dir_all(&dir).unwrap();

        {
            let mut s = store(tmp.path());
            s.record_component(
                &fam,
                ComponentId::new("tv-emulator-v5"),
                ComponentRecord {
                    sdk_version: Version::parse("5.0.0"),
                    location: dir.display().to_string(),
                    instance_name: Some("tv-emulator-v5".into()),
                },
            )
            .unwrap();
            s.record_tool(ToolKey::new("java"), Version::parse("11.0.2"))
                .unwrap();
        }

        let reloaded = store(tmp.path());
        assert!(reloaded
            .doc()
            .component(&fam, &ComponentId::new("tv-emulator-v5"))
            .is_some());
        assert_eq!(
            reloaded.doc().tool_version(&ToolKey::new("java")),
            Version::parse("11.0.2")
        );
    }

    #[test]
    fn refresh_prunes_entries_without_directory() {
        let tmp = tempdir().unwrap();
        let fam = SdkFamily::new("tv");
        let gone = tmp.path().join("sdk/tv/removed-by-hand");

        let mut s = store(tmp.path());
        s.record_component(
            &fam,
            ComponentId::new("tv-cli"),
            ComponentRecord {
                sdk_version: Version::parse("1.0"),
                location: gone.display().to_string(),
                instance_name: None,
            },
        )
        .unwrap();

        s.refresh().unwrap();
        assert!(s.doc().component(&fam, &ComponentId::new("tv-cli")).is_none());

        // The prune is persisted, not just in memory.
        let reloaded = store(tmp.path());
        assert!(reloaded.doc().component(&fam, &ComponentId::new("tv-cli")).is_none());
    }

    #[test]
    fn refresh_keeps_entries_with_directory() {
        let tmp = tempdir().unwrap();
        let fam = SdkFamily::new("tv");
        let dir = tmp.path().join("sdk/tv/v5");
        std::fs::create_dir_all(&dir).unwrap();

        let mut s = store(tmp.path());
        s.record_component(
            &fam,
            ComponentId::new("tv-emulator-v5"),
            ComponentRecord {
                sdk_version: Version::parse("5.0.0"),
                location: dir.display().to_string(),
                instance_name: None,
            },
        )
        .unwrap();
        s.refresh().unwrap();
        assert!(s
            .doc()
            .component(&fam, &ComponentId::new("tv-emulator-v5"))
            .is_some());
    }
}
