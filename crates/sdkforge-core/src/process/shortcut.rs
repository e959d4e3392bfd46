//! Desktop launcher provisioning.
//!
//! Launcher-class components get an OS-appropriate shortcut: a `.desktop`
//! entry on Linux, a PowerShell-created `.lnk` on Windows, a symlink into
//! `~/Applications` on macOS. Removal tolerates the shortcut already being
//! absent.

use crate::process::ProcessError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where shortcuts are written. Injectable so tests run in a temp dir.
#[derive(Debug, Clone)]
pub struct Shortcuts {
    dir: PathBuf,
}

impl Shortcuts {
    /// Shortcut directory for the current user.
    pub fn for_user() -> Option<Self> {
        let dir = if cfg!(target_os = "macos") {
            dirs::home_dir()?.join("Applications")
        } else if cfg!(target_os = "windows") {
            dirs::desktop_dir()?
        } else {
            dirs::data_dir()?.join("applications")
        };
        Some(Self { dir })
    }

    /// Shortcut directory rooted at an explicit path.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry_path(&self, name: &str) -> PathBuf {
        if cfg!(target_os = "windows") {
            self.dir.join(format!("{name}.lnk"))
        } else if cfg!(target_os = "macos") {
            self.dir.join(name)
        } else {
            self.dir.join(format!("{name}.desktop"))
        }
    }

    /// Create a launcher named `name` pointing at `target`.
    pub async fn create(&self, name: &str, target: &Path) -> Result<(), ProcessError> {
        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        let entry = self.entry_path(name);

        if cfg!(target_os = "windows") {
            let ps = format!(
                "$s=(New-Object -ComObject WScript.Shell).CreateShortcut('{}');$s.TargetPath='{}';$s.Save()",
                entry.display(),
                target.display()
            );
            crate::process::run("powershell", &["-NoProfile", "-Command", &ps], None).await?;
        } else if cfg!(target_os = "macos") {
            #[cfg(unix)]
            {
                let _ = std::fs::remove_file(&entry);
                std::os::unix::fs::symlink(target, &entry).map_err(io_err)?;
            }
        } else {
            let body = format!(
                "[Desktop Entry]\nType=Application\nName={name}\nExec={}\nTerminal=false\n",
                target.display()
            );
            std::fs::write(&entry, body).map_err(io_err)?;
        }
        debug!(name, "created launcher at {}", entry.display());
        Ok(())
    }

    /// Remove the launcher if it exists. Absence is success.
    pub fn remove(&self, name: &str) -> std::io::Result<()> {
        let entry = self.entry_path(name);
        match std::fs::remove_file(&entry) {
            Ok(()) => {
                debug!(name, "removed launcher");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

fn io_err(e: std::io::Error) -> ProcessError {
    ProcessError::Spawn {
        program: "shortcut".to_string(),
        source: e,
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn creates_desktop_entry() {
        let tmp = tempdir().unwrap();
        let s = Shortcuts::in_dir(tmp.path());
        s.create("TV Simulator", Path::new("/opt/sdk/simulator/run"))
            .await
            .unwrap();

        let body =
            std::fs::read_to_string(tmp.path().join("TV Simulator.desktop")).unwrap();
        assert!(body.contains("Exec=/opt/sdk/simulator/run"));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let tmp = tempdir().unwrap();
        let s = Shortcuts::in_dir(tmp.path());
        s.create("X", Path::new("/bin/true")).await.unwrap();
        s.remove("X").unwrap();
        s.remove("X").unwrap();
    }
}
