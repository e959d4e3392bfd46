//! Platform process adapter.
//!
//! The only layer that shells out. Everything above it (installers,
//! uninstall handler, VM manager) goes through [`run`] / [`run_elevated`]
//! so command execution, elevation, and error mapping live in one place.

pub mod env;
pub mod shortcut;
pub mod vm;

use std::path::Path;
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors from shelled-out commands.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The binary to execute is not on PATH.
    #[error("binary '{0}' not found on PATH")]
    MissingBinary(String),

    /// The process could not be spawned.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The process exited with a non-zero status.
    #[error("'{program}' exited with {code}: {stderr}")]
    NonZeroExit {
        /// Program that failed.
        program: String,
        /// Exit code, or -1 when terminated by signal.
        code: i32,
        /// Trailing stderr output, trimmed.
        stderr: String,
    },
}

fn check_output(program: &str, output: Output) -> Result<String, ProcessError> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Keep the tail; installer stderr can run to megabytes.
        let stderr = stderr.lines().rev().take(5).collect::<Vec<_>>();
        Err(ProcessError::NonZeroExit {
            program: program.to_string(),
            code: output.status.code().unwrap_or(-1),
            stderr: stderr.into_iter().rev().collect::<Vec<_>>().join("\n"),
        })
    }
}

/// Run a command, capturing stdout. Fails if the binary is missing or the
/// exit status is non-zero.
pub async fn run(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
) -> Result<String, ProcessError> {
    let resolved = which::which(program)
        .map_err(|_| ProcessError::MissingBinary(program.to_string()))?;
    debug!(program, ?args, "running command");

    let mut cmd = Command::new(resolved);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    let output = cmd.output().await.map_err(|source| ProcessError::Spawn {
        program: program.to_string(),
        source,
    })?;
    check_output(program, output)
}

/// Run a shell snippet (`sh -c` / `cmd /C`). Used for package-manager
/// install scripts that come as one line in the distribution table.
pub async fn run_shell(script: &str, cwd: Option<&Path>) -> Result<String, ProcessError> {
    debug!(script, "running shell snippet");
    let (shell, flag) = if cfg!(target_os = "windows") {
        ("cmd", "/C")
    } else {
        ("sh", "-c")
    };
    let mut cmd = Command::new(shell);
    cmd.arg(flag).arg(script);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    let output = cmd.output().await.map_err(|source| ProcessError::Spawn {
        program: shell.to_string(),
        source,
    })?;
    check_output(shell, output)
}

/// Run a command with elevated privileges.
///
/// Unix: `sudo -n` first (non-interactive, so a missing sudo ticket fails
/// fast instead of hanging a headless session), then `pkexec` as the
/// desktop fallback. Windows: `Start-Process -Verb RunAs -Wait`.
pub async fn run_elevated(program: &str, args: &[&str]) -> Result<String, ProcessError> {
    if cfg!(target_os = "windows") {
        let arg_list = args
            .iter()
            .map(|a| format!("'{a}'"))
            .collect::<Vec<_>>()
            .join(",");
        let ps = format!(
            "Start-Process -FilePath '{program}' -ArgumentList {arg_list} -Verb RunAs -Wait"
        );
        return run("powershell", &["-NoProfile", "-Command", &ps], None).await;
    }

    let mut sudo_args = vec!["-n", program];
    sudo_args.extend_from_slice(args);
    match run("sudo", &sudo_args, None).await {
        Ok(out) => Ok(out),
        Err(ProcessError::MissingBinary(_)) | Err(ProcessError::NonZeroExit { .. }) => {
            let mut pk_args = vec![program];
            pk_args.extend_from_slice(args);
            run("pkexec", &pk_args, None).await
        }
        Err(e) => Err(e),
    }
}

/// Whether [`run_elevated`] can proceed without an interactive prompt.
///
/// Checked before an install that needs elevation mutates anything.
/// Unix: a cached sudo ticket (`sudo -n true`) or `pkexec` on PATH.
/// Windows: always true, the UAC prompt comes from `Start-Process`
/// itself.
pub fn elevation_available() -> bool {
    if cfg!(target_os = "windows") {
        return true;
    }
    let sudo_ok = std::process::Command::new("sudo")
        .args(["-n", "true"])
        .output()
        .is_ok_and(|out| out.status.success());
    sudo_ok || which::which("pkexec").is_ok()
}

/// Probe whether a tool binary exists and report its version via
/// `--version`, returning None when the binary is absent.
pub async fn probe_version(binary: &str) -> Option<String> {
    match run(binary, &["--version"], None).await {
        Ok(out) => out.lines().next().map(|l| l.trim().to_string()),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_its_own_kind() {
        let err = run("definitely-not-a-real-binary-xyz", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::MissingBinary(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_stdout_on_success() {
        let out = run("echo", &["hello"], None).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_carries_code() {
        let err = run_shell("exit 3", None).await.unwrap_err();
        match err {
            ProcessError::NonZeroExit { code, .. } => assert_eq!(code, 3),
            other => panic!("unexpected error: {other}"),
        }
    }
}
