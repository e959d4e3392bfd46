//! The prerequisite document: which tools each component type needs per OS,
//! and which distribution artifacts exist for each tool.

use crate::method::ToolInstallMethod;
use crate::types::{ComponentId, ComponentType, Os, SdkFamily, ToolKey};
use crate::version::Version;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key used in the dependency table when no per-component entry exists.
pub const DEFAULT_KEY: &str = "-default-";

/// Static description of one prerequisite tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    /// Human-readable name ("Java Runtime", "VirtualBox").
    pub display_name: String,
    /// Whether the tool is installed machine-wide (true) or kept local to
    /// the component directory (false).
    pub global: bool,
}

/// One downloadable distribution artifact of a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    /// The tool this artifact provides.
    pub tool: ToolKey,
    /// OS the artifact targets.
    pub os: Os,
    /// Version of the tool the artifact installs.
    pub version: Version,
    /// Where to download the artifact from.
    pub download_location: String,
    /// How to install the artifact once downloaded.
    pub install_method: ToolInstallMethod,
    /// Declared size in MB, used by the enqueue disk gate.
    pub expected_size_mb: u64,
    /// Optional SHA-256 checksum of the artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// `tool_key -> constraint string` for one component (or `-default-`).
///
/// Tools install in the order the document declares them, so the map must
/// keep insertion order rather than sort its keys.
pub type RequirementSet = IndexMap<ToolKey, String>;

/// The whole prerequisite document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrereqFile {
    /// Tool definitions keyed by tool key.
    pub tools: BTreeMap<ToolKey, ToolInfo>,
    /// Dependency table: family -> component type -> os -> comp_uid (or
    /// `-default-`) -> requirement set.
    pub dependencies: BTreeMap<SdkFamily, BTreeMap<ComponentType, BTreeMap<Os, BTreeMap<String, RequirementSet>>>>,
    /// Every known distribution artifact.
    pub distributions: Vec<Distribution>,
}

impl PrereqFile {
    /// Parse the document from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The requirement set for `(family, ctype, os, comp_uid)`, falling
    /// back to the `-default-` entry when no per-component entry exists.
    pub fn requirements(
        &self,
        family: &SdkFamily,
        ctype: &ComponentType,
        os: Os,
        comp_uid: &ComponentId,
    ) -> Option<&RequirementSet> {
        let by_id = self
            .dependencies
            .get(family)?
            .get(ctype)?
            .get(&os)?;
        by_id
            .get(comp_uid.as_str())
            .or_else(|| by_id.get(DEFAULT_KEY))
    }

    /// All distributions of one tool for one OS.
    pub fn distributions_for(&self, tool: &ToolKey, os: Os) -> Vec<&Distribution> {
        self.distributions
            .iter()
            .filter(|d| &d.tool == tool && d.os == os)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PrereqFile {
        PrereqFile::from_json(
            r#"{
                "tools": {
                    "java": { "displayName": "Java Runtime", "global": true },
                    "vbox": { "displayName": "VirtualBox", "global": true }
                },
                "dependencies": {
                    "tv": {
                        "tv-emulator": {
                            "linux": {
                                "-default-": { "java": ">=1.8", "vbox": ">=6.1" },
                                "tv-emulator-v5": { "java": ">=11", "vbox": ">=6.1" }
                            }
                        }
                    }
                },
                "distributions": [
                    {
                        "tool": "java",
                        "os": "linux",
                        "version": "11.0.2",
                        "downloadLocation": "https://example.org/jre-11.tar.gz",
                        "installMethod": "archive",
                        "expectedSizeMb": 190
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn per_component_entry_wins_over_default() {
        let p = sample();
        let set = p
            .requirements(
                &SdkFamily::new("tv"),
                &ComponentType::new("tv-emulator"),
                Os::Linux,
                &ComponentId::new("tv-emulator-v5"),
            )
            .unwrap();
        assert_eq!(set.get("java").map(String::as_str), Some(">=11"));
    }

    #[test]
    fn unknown_component_falls_back_to_default() {
        let p = sample();
        let set = p
            .requirements(
                &SdkFamily::new("tv"),
                &ComponentType::new("tv-emulator"),
                Os::Linux,
                &ComponentId::new("tv-emulator-v9"),
            )
            .unwrap();
        assert_eq!(set.get("java").map(String::as_str), Some(">=1.8"));
    }

    #[test]
    fn requirement_set_keeps_declaration_order() {
        // Keys deliberately out of lexicographic order; the install queue
        // walks them as declared.
        let p = PrereqFile::from_json(
            r#"{
                "tools": {},
                "dependencies": {
                    "tv": { "tv-cli": { "linux": {
                        "-default-": { "zlib": ">=1.0", "ares": ">=2.0" }
                    } } }
                },
                "distributions": []
            }"#,
        )
        .unwrap();
        let set = p
            .requirements(
                &SdkFamily::new("tv"),
                &ComponentType::new("tv-cli"),
                Os::Linux,
                &ComponentId::new("tv-cli"),
            )
            .unwrap();
        let keys: Vec<&str> = set.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["zlib", "ares"]);
    }

    #[test]
    fn distributions_filter_by_tool_and_os() {
        let p = sample();
        assert_eq!(p.distributions_for(&ToolKey::new("java"), Os::Linux).len(), 1);
        assert!(p.distributions_for(&ToolKey::new("java"), Os::Windows).is_empty());
        assert!(p.distributions_for(&ToolKey::new("vbox"), Os::Linux).is_empty());
    }
}
