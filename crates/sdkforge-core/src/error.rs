//! Domain-specific errors for install/uninstall operations.

use crate::io::download::DownloadError;
use crate::process::ProcessError;
use sdkforge_schema::ToolKey;
use thiserror::Error;

/// Errors surfaced by the orchestrator, the installers, and the uninstall
/// handler.
///
/// Enqueue-time kinds (`Unsatisfiable`, `InsufficientDiskSpace`, `Busy`,
/// `PrivilegeRequired`) are raised before any filesystem mutation;
/// mid-pipeline kinds always follow best-effort cleanup of the partial
/// component directory.
#[derive(Error, Debug)]
pub enum InstallError {
    /// No distribution satisfies a required version constraint.
    #[error("no distribution of '{tool}' satisfies '{constraint}'")]
    Unsatisfiable {
        /// The tool whose constraint cannot be met.
        tool: ToolKey,
        /// The unmet constraint string.
        constraint: String,
    },

    /// The install root does not have enough free space.
    #[error("insufficient disk space: need {required_mb} MB, {available_mb} MB available")]
    InsufficientDiskSpace {
        /// Required MB including the safety margin.
        required_mb: u64,
        /// Free MB on the install root.
        available_mb: u64,
    },

    /// A required tool is already mid-install for another request.
    #[error("tool '{0}' is already being installed")]
    Busy(ToolKey),

    /// Download failed after retries. Network errors, timeouts, and
    /// exhausted retries all fold into this kind.
    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    /// Archive extraction failed.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// A shelled-out command exited non-zero or its binary is missing.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// A VM instance with the target name already exists.
    #[error("instance '{0}' already exists")]
    InstanceAlreadyExists(String),

    /// Elevation check failed before any mutation.
    #[error("administrator privileges required: {0}")]
    PrivilegeRequired(String),

    /// Component or configuration lookup failed.
    #[error("{0}")]
    NotFound(String),

    /// Status/catalog store I/O failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Plain I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InstallError {
    /// True for user-initiated cancellation, which is reported with an
    /// empty message instead of an error string.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Download(DownloadError::Cancelled))
    }
}

/// Errors from the catalog and status stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing a document failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A document is not valid JSON of the expected shape.
    #[error("malformed document {path}: {source}")]
    Malformed {
        /// Path of the offending file.
        path: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}
