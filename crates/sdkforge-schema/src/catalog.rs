//! The catalog document: which components exist per SDK family.
//!
//! Read-only at runtime except for the auto-update step, which appends
//! newly discovered component versions (see `sdkforge-core::store::catalog`).

use crate::method::{InstallMethod, UninstallMethod};
use crate::types::{ComponentId, ComponentType, SdkFamily};
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One installable component record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Unique id (`comp_uid`), unique per family + type + version slot.
    pub id: ComponentId,
    /// Human-readable name shown in listings and prompts.
    pub display_name: String,
    /// Semantic version of this component release.
    pub version: Version,
    /// Which install procedure variant to run.
    pub install_method: InstallMethod,
    /// Which uninstall procedure variant to run.
    pub uninstall_method: UninstallMethod,
    /// Declared disk footprint in MB, used by the enqueue disk gate.
    pub expected_size_mb: u64,
    /// Sub-directory under the family's install root. Also the key the
    /// auto-update step matches against when deciding whether a remote
    /// version is already present.
    pub subdir: String,
    /// Source repository or download base URL.
    pub repository: String,
    /// Stable listing order within the component type.
    pub sort_order: u32,
}

/// The catalog for one SDK family.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FamilyCatalog {
    /// Component types in display order.
    pub component_types: Vec<ComponentType>,
    /// Component records per type, kept sorted by `sort_order`.
    pub components: BTreeMap<ComponentType, Vec<Component>>,
}

/// The whole catalog document, keyed by SDK family.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Catalog {
    /// Per-family catalogs.
    pub families: BTreeMap<SdkFamily, FamilyCatalog>,
}

impl Catalog {
    /// Parse a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Components of one `(family, type)` group, sorted by `sort_order`.
    pub fn components(&self, family: &SdkFamily, ctype: &ComponentType) -> Vec<&Component> {
        let mut list: Vec<&Component> = self
            .families
            .get(family)
            .and_then(|f| f.components.get(ctype))
            .map(|v| v.iter().collect())
            .unwrap_or_default();
        list.sort_by_key(|c| c.sort_order);
        list
    }

    /// Find a component by id within a family, returning its type as well.
    pub fn find(
        &self,
        family: &SdkFamily,
        id: &ComponentId,
    ) -> Option<(&ComponentType, &Component)> {
        let fam = self.families.get(family)?;
        for (ctype, comps) in &fam.components {
            if let Some(c) = comps.iter().find(|c| &c.id == id) {
                return Some((ctype, c));
            }
        }
        None
    }

    /// Whether any record of the given type already uses `subdir`.
    pub fn has_subdir(&self, family: &SdkFamily, ctype: &ComponentType, subdir: &str) -> bool {
        self.families
            .get(family)
            .and_then(|f| f.components.get(ctype))
            .is_some_and(|v| v.iter().any(|c| c.subdir == subdir))
    }

    /// Append a newly discovered component version and renumber
    /// `sort_order` over the group so listing order stays stable.
    pub fn append(&mut self, family: &SdkFamily, ctype: &ComponentType, component: Component) {
        let fam = self.families.entry(family.clone()).or_default();
        if !fam.component_types.contains(ctype) {
            fam.component_types.push(ctype.clone());
        }
        let group = fam.components.entry(ctype.clone()).or_default();
        group.push(component);
        group.sort_by(|a, b| b.version.cmp(&a.version));
        for (i, c) in group.iter_mut().enumerate() {
            c.sort_order = i as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::from_json(
            r#"{
                "tv": {
                    "componentTypes": ["tv-cli", "tv-emulator"],
                    "components": {
                        "tv-cli": [{
                            "id": "tv-cli",
                            "displayName": "TV CLI",
                            "version": "1.12.4",
                            "installMethod": "pm-global",
                            "uninstallMethod": "pm-global",
                            "expectedSizeMb": 120,
                            "subdir": "tv-cli",
                            "repository": "https://example.org/tv-cli",
                            "sortOrder": 0
                        }],
                        "tv-emulator": [{
                            "id": "tv-emulator-v5",
                            "displayName": "TV Emulator v5",
                            "version": "5.0.0",
                            "installMethod": "vm-archive",
                            "uninstallMethod": "vm-unregister",
                            "expectedSizeMb": 2100,
                            "subdir": "v5.0.0",
                            "repository": "https://example.org/emulator",
                            "sortOrder": 0
                        }]
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn finds_component_across_types() {
        let cat = sample();
        let family = SdkFamily::new("tv");
        let (ctype, comp) = cat
            .find(&family, &ComponentId::new("tv-emulator-v5"))
            .unwrap();
        assert_eq!(ctype, &"tv-emulator");
        assert_eq!(comp.install_method, InstallMethod::ArchiveAndRegisterVm);
    }

    #[test]
    fn append_renumbers_sort_order_newest_first() {
        let mut cat = sample();
        let family = SdkFamily::new("tv");
        let ctype = ComponentType::new("tv-emulator");
        cat.append(
            &family,
            &ctype,
            Component {
                id: ComponentId::new("tv-emulator-v6"),
                display_name: "TV Emulator v6".into(),
                version: Version::parse("6.0.0"),
                install_method: InstallMethod::ArchiveAndRegisterVm,
                uninstall_method: UninstallMethod::UnregisterVm,
                expected_size_mb: 2300,
                subdir: "v6.0.0".into(),
                repository: "https://example.org/emulator".into(),
                sort_order: 0,
            },
        );
        let comps = cat.components(&family, &ctype);
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].id, "tv-emulator-v6");
        assert_eq!(comps[0].sort_order, 0);
        assert_eq!(comps[1].sort_order, 1);
        assert!(cat.has_subdir(&family, &ctype, "v6.0.0"));
    }
}
