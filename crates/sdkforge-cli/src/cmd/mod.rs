//! Command implementations, one module per subcommand.

pub mod check;
pub mod install;
pub mod list;
pub mod remove;
pub mod status;
pub mod update;
