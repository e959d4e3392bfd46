//! sdkforge - SDK provisioning CLI
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Installs, upgrades and removes SDK components and their prerequisite
//! tools. All engine work lives in `sdkforge-core`; this crate parses
//! arguments, renders progress, and asks for confirmation.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.sdkforge/
//! ├── catalog.json   # installable components per SDK family
//! ├── prereq.json    # tool requirements and distributions
//! ├── status.json    # what is actually installed
//! ├── sdk/           # component install root, one dir per family
//! ├── tools/         # component-local tool installs
//! ├── tmp/           # download staging
//! └── logs/
//! ```

pub mod cmd;
pub mod ui;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sdkforge_core::Paths;
use sdkforge_schema::{ComponentId, ComponentType, SdkFamily};

#[derive(Debug, Parser)]
#[command(name = "sdkforge")]
#[command(author, version, about = "sdkforge - SDK component provisioning")]
pub struct Cli {
    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Emit progress as JSON event lines instead of styled output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a component: sdkforge install <family>/<type>/<id>
    Install {
        /// Target as family/type/id, e.g. tv/tv-emulator/tv-emulator-v5
        target: String,
    },
    /// Remove an installed component
    Remove {
        /// Target as family/id (the type is looked up in the catalog)
        target: String,
    },
    /// List catalog components with installed markers
    List {
        /// Restrict the listing to one SDK family
        family: Option<String>,
    },
    /// Show installed components and detected tools
    Status,
    /// Print the prerequisite resolution for a component without installing
    Check {
        /// Target as family/type/id
        target: String,
    },
    /// Fetch release feeds and append newly discovered component versions
    Update,
}

/// A parsed `family/type/id` (or `family/id`) command-line target.
#[derive(Debug, Clone)]
pub struct Target {
    pub family: SdkFamily,
    pub ctype: Option<ComponentType>,
    pub id: ComponentId,
}

impl Target {
    /// Parse `family/type/id` or `family/id`.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split('/').filter(|p| !p.is_empty()).collect();
        match parts.as_slice() {
            [family, ctype, id] => Ok(Self {
                family: SdkFamily::new(*family),
                ctype: Some(ComponentType::new(*ctype)),
                id: ComponentId::new(*id),
            }),
            [family, id] => Ok(Self {
                family: SdkFamily::new(*family),
                ctype: None,
                id: ComponentId::new(*id),
            }),
            _ => bail!("expected <family>/<type>/<id>, got '{raw}'"),
        }
    }
}

/// Resolve the sdkforge home layout or fail with a usable message.
pub fn resolve_paths() -> Result<Paths> {
    Paths::resolve().context("cannot determine a home directory; set SDKFORGE_HOME")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_parses_both_shapes() {
        let t = Target::parse("tv/tv-emulator/tv-emulator-v5").unwrap();
        assert_eq!(t.family, "tv");
        assert_eq!(t.ctype.unwrap(), "tv-emulator");
        assert_eq!(t.id, "tv-emulator-v5");

        let t = Target::parse("tv/tv-cli").unwrap();
        assert!(t.ctype.is_none());
        assert_eq!(t.id, "tv-cli");

        assert!(Target::parse("tv").is_err());
        assert!(Target::parse("a/b/c/d").is_err());
    }
}
