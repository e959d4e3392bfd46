//! Method-specific install procedures.
//!
//! Every install method follows the same four-phase shape: download,
//! unpack or execute, register with the status store, expose (shortcut,
//! env var, VM registration). The orchestrator dispatches on the method
//! tag; each procedure reports its phases through the shared [`Reporter`]
//! and writes its result to the status store before returning.

mod component;
mod tool;

pub use component::install_component;
pub use tool::install_tool;

pub(crate) use component::archive_url;

use crate::io::download::CancelHandle;
use crate::paths::Paths;
use crate::process::shortcut::Shortcuts;
use crate::reporter::Reporter;
use reqwest::Client;
use std::sync::Arc;

/// Shared resources handed to every install procedure.
pub struct InstallContext<'a> {
    /// Filesystem layout.
    pub paths: &'a Paths,
    /// Shared HTTP client.
    pub client: &'a Client,
    /// Progress sink.
    pub reporter: Arc<dyn Reporter>,
    /// Cooperative stop signal for the active download.
    pub cancel: &'a CancelHandle,
    /// Launcher directory; `None` on machines without one.
    pub shortcuts: Option<&'a Shortcuts>,
}

impl std::fmt::Debug for InstallContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallContext")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}
