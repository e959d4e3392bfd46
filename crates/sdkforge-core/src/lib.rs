//! sdkforge-core: the dependency-resolution and install-orchestration engine.
//!
//! The engine is driven through [`queue::Orchestrator`]: requests are
//! checked (`plan`), confirmed by the caller, enqueued, and drained one at
//! a time. Progress flows out through the [`Reporter`] trait; nothing in
//! this crate renders UI.

pub mod error;
pub mod installers;
pub mod io;
pub mod paths;
pub mod process;
pub mod queue;
pub mod reporter;
pub mod resolver;
pub mod store;
pub mod uninstall;

pub use error::InstallError;
pub use paths::Paths;
pub use queue::{Orchestrator, Planned};
pub use reporter::{Event, EventCommand, NullReporter, Reporter, Step};

/// User Agent string for engine HTTP requests.
pub const USER_AGENT: &str = concat!("sdkforge-core/", env!("CARGO_PKG_VERSION"));
