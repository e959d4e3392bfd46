//! Shared data model for sdkforge: identity newtypes, the version-constraint
//! grammar, and the three JSON documents (catalog, prerequisites, status)
//! exchanged between the engine and its configuration.

pub mod catalog;
pub mod method;
pub mod prereq;
pub mod status;
pub mod types;
pub mod version;

// Re-exports
pub use catalog::{Catalog, Component};
pub use method::{InstallMethod, ToolInstallMethod, UninstallMethod};
pub use prereq::{Distribution, PrereqFile, ToolInfo, DEFAULT_KEY};
pub use status::{ComponentRecord, StatusDoc};
pub use types::{ComponentId, ComponentType, Os, SdkFamily, ToolKey};
pub use version::{Constraint, ConstraintOp, Version};
