//! The persisted status document: what is actually installed.
//!
//! The document is always written back as a whole after each mutation;
//! there is no field-level persistence. Wire shape:
//!
//! ```json
//! {
//!   "preReq": { "java": "11.0.2" },
//!   "tv": { "tv-emulator-v5": { "sdkVersion": "5.0.0", "location": "...", "instanceName": "tv5" } }
//! }
//! ```

use crate::types::{ComponentId, SdkFamily, ToolKey};
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status record of one installed component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentRecord {
    /// Version of the component that was installed.
    pub sdk_version: Version,
    /// Install directory on disk. Ground truth for the status invariant:
    /// the record is valid only while this path exists.
    pub location: String,
    /// VM instance name, present only for VM-registered components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
}

/// The whole status document.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct StatusDoc {
    /// Detected prerequisite tool versions.
    #[serde(rename = "preReq", default)]
    pub pre_req: BTreeMap<ToolKey, Version>,
    /// Installed components per family, keyed by comp_uid.
    #[serde(flatten)]
    pub families: BTreeMap<SdkFamily, BTreeMap<ComponentId, ComponentRecord>>,
}

impl StatusDoc {
    /// Installed record for a component, if any.
    pub fn component(&self, family: &SdkFamily, id: &ComponentId) -> Option<&ComponentRecord> {
        self.families.get(family)?.get(id)
    }

    /// Insert or replace a component record.
    pub fn set_component(&mut self, family: &SdkFamily, id: ComponentId, record: ComponentRecord) {
        self.families
            .entry(family.clone())
            .or_default()
            .insert(id, record);
    }

    /// Remove a component record, returning it if it was present.
    pub fn remove_component(
        &mut self,
        family: &SdkFamily,
        id: &ComponentId,
    ) -> Option<ComponentRecord> {
        let fam = self.families.get_mut(family)?;
        let rec = fam.remove(id);
        if fam.is_empty() {
            self.families.remove(family);
        }
        rec
    }

    /// Detected version of a tool, empty if never detected.
    pub fn tool_version(&self, tool: &ToolKey) -> Version {
        self.pre_req
            .get(tool)
            .cloned()
            .unwrap_or_else(|| Version::parse(""))
    }

    /// Record a detected tool version.
    pub fn set_tool(&mut self, tool: ToolKey, version: Version) {
        self.pre_req.insert(tool, version);
    }

    /// Forget a tool's detected version so a future install re-triggers
    /// its provisioning.
    pub fn reset_tool(&mut self, tool: &ToolKey) {
        self.pre_req.remove(tool);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_roundtrips() {
        let json = r#"{
            "preReq": { "java": "11.0.2" },
            "tv": {
                "tv-emulator-v5": {
                    "sdkVersion": "5.0.0",
                    "location": "/home/u/.sdkforge/sdk/tv/v5.0.0",
                    "instanceName": "tv-emulator-v5"
                }
            }
        }"#;
        let doc: StatusDoc = serde_json::from_str(json).unwrap();
        assert_eq!(doc.tool_version(&ToolKey::new("java")), Version::parse("11.0.2"));
        let rec = doc
            .component(&SdkFamily::new("tv"), &ComponentId::new("tv-emulator-v5"))
            .unwrap();
        assert_eq!(rec.instance_name.as_deref(), Some("tv-emulator-v5"));

        let back = serde_json::to_string(&doc).unwrap();
        let reparsed: StatusDoc = serde_json::from_str(&back).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn unknown_tool_reads_as_empty_version() {
        let doc = StatusDoc::default();
        assert!(doc.tool_version(&ToolKey::new("vbox")).is_empty());
    }

    #[test]
    fn removing_last_component_drops_the_family_key() {
        let mut doc = StatusDoc::default();
        let fam = SdkFamily::new("tv");
        doc.set_component(
            &fam,
            ComponentId::new("tv-cli"),
            ComponentRecord {
                sdk_version: Version::parse("1.0"),
                location: "/tmp/x".into(),
                instance_name: None,
            },
        );
        assert!(doc.remove_component(&fam, &ComponentId::new("tv-cli")).is_some());
        assert!(doc.families.is_empty());
        // Idempotent: a second removal is a no-op.
        assert!(doc.remove_component(&fam, &ComponentId::new("tv-cli")).is_none());
    }
}
