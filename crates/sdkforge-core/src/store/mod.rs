//! Persistent stores: the installed-state document and the catalog.

pub mod catalog;
pub mod status;

pub use catalog::CatalogStore;
pub use status::StatusStore;

use crate::error::StoreError;
use crate::paths::Paths;
use sdkforge_schema::PrereqFile;

/// Load the read-only prerequisite document.
pub fn load_prereq(paths: &Paths) -> Result<PrereqFile, StoreError> {
    let path = paths.prereq_file();
    let json = std::fs::read_to_string(&path)?;
    PrereqFile::from_json(&json).map_err(|source| StoreError::Malformed {
        path: path.display().to_string(),
        source,
    })
}
