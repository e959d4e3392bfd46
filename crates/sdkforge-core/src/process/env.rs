//! Environment-variable persistence across shell profile files.
//!
//! Installs need to export variables like `TV_SDK_HOME` so the tools work
//! in new shells. On unix we append an `export` line to every profile file
//! that exists (and `.profile` regardless); on Windows we call `setx`.
//! Appending is idempotent: a line that is already present is skipped.

use crate::process::ProcessError;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, warn};

const PROFILE_FILES: &[&str] = &[".profile", ".bashrc", ".zshrc"];

/// Persist `key=value` for future shells.
pub async fn persist_var(key: &str, value: &str) -> Result<(), ProcessError> {
    if cfg!(target_os = "windows") {
        crate::process::run("setx", &[key, value], None).await?;
        return Ok(());
    }
    persist_unix(key, value);
    Ok(())
}

fn persist_unix(key: &str, value: &str) {
    let Some(home) = dirs::home_dir() else {
        warn!("no home directory; cannot persist {key}");
        return;
    };

    let line = format!("export {key}=\"{value}\"");
    for (i, name) in PROFILE_FILES.iter().enumerate() {
        let path = home.join(name);
        // .profile is created if missing; the shell-specific files are
        // only touched when the user already has them.
        if i > 0 && !path.exists() {
            continue;
        }
        if let Err(e) = append_once(&path, &line) {
            warn!("could not update {}: {e}", path.display());
        }
    }
}

fn append_once(path: &PathBuf, line: &str) -> std::io::Result<()> {
    let current = std::fs::read_to_string(path).unwrap_or_default();
    if current.lines().any(|l| l.trim() == line) {
        debug!("{} already exports the variable", path.display());
        return Ok(());
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    if !current.is_empty() && !current.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{line}")?;
    debug!("appended export to {}", path.display());
    Ok(())
}
