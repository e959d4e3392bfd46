//! Resumable, retryable, cancellable artifact downloads.
//!
//! One transfer runs per requested item. A leftover `.part` file is
//! offered back to the server with a `Range` request; a `206` answer
//! appends to it and a plain `200` restarts the transfer from zero.
//! Progress is throttled to at most one update per
//! second. Cancellation is cooperative: the in-flight chunk loop checks a
//! [`CancelHandle`] and fails with the distinct [`DownloadError::Cancelled`]
//! so callers can suppress user-facing error text.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::reporter::{Reporter, Step};
use sdkforge_schema::ComponentId;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Errors from the download manager.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Network error, timeout, or exhausted retries. Deliberately one
    /// kind: callers only distinguish failure from cancellation.
    #[error("{0}")]
    Failed(String),

    /// The transfer was stopped by the user.
    #[error("download cancelled")]
    Cancelled,

    /// Local filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact's checksum does not match the distribution record.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Declared SHA-256.
        expected: String,
        /// Computed SHA-256.
        actual: String,
    },
}

/// Cooperative stop signal shared between the orchestrator and the
/// in-flight transfer.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// A fresh, un-cancelled handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the in-flight transfer to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Re-arm the handle for the next transfer.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One download operation.
pub struct DownloadRequest<'a, R: Reporter> {
    /// Shared HTTP client.
    pub client: &'a Client,
    /// Component the progress events are attributed to.
    pub comp_uid: &'a ComponentId,
    /// Source URL.
    pub url: &'a str,
    /// Directory the artifact lands in.
    pub dest_dir: &'a Path,
    /// Optional SHA-256 to verify after completion.
    pub expected_sha256: Option<&'a str>,
    /// Progress sink.
    pub reporter: &'a R,
    /// Cooperative stop signal.
    pub cancel: &'a CancelHandle,
}

impl<R: Reporter> std::fmt::Debug for DownloadRequest<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("url", &self.url)
            .field("dest_dir", &self.dest_dir)
            .finish_non_exhaustive()
    }
}

/// File name an artifact URL downloads to. A URL with no path segment
/// (just scheme and host) falls back to `artifact`.
pub fn artifact_name(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme
        .split_once('/')
        .map_or("", |(_host, path)| path);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|n| n.split('?').next())
        .filter(|n| !n.is_empty())
        .unwrap_or("artifact")
        .to_string()
}

impl<R: Reporter> DownloadRequest<'_, R> {
    /// Run the download to completion, retrying transient failures.
    ///
    /// Returns the path of the finished artifact.
    pub async fn execute(&self) -> Result<PathBuf, DownloadError> {
        tokio::fs::create_dir_all(self.dest_dir).await?;
        let name = artifact_name(self.url);
        let final_path = self.dest_dir.join(&name);
        let part_path = self.dest_dir.join(format!("{name}.part"));

        let mut attempt = 0u32;
        loop {
            match self.transfer(&part_path).await {
                Ok(()) => break,
                Err(DownloadError::Cancelled) => {
                    let _ = tokio::fs::remove_file(&part_path).await;
                    return Err(DownloadError::Cancelled);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        return Err(DownloadError::Failed(format!(
                            "failed after {MAX_RETRIES} attempts: {e}"
                        )));
                    }
                    warn!(url = self.url, attempt, "download failed, retrying: {e}");
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }

        if let Some(expected) = self.expected_sha256 {
            if let Err(e) = verify_sha256(&part_path, expected).await {
                // A corrupt artifact must not survive to seed a resume.
                let _ = tokio::fs::remove_file(&part_path).await;
                return Err(e);
            }
        }
        tokio::fs::rename(&part_path, &final_path).await?;
        self.reporter.progress(self.comp_uid, 100);
        Ok(final_path)
    }

    /// One transfer attempt into the `.part` file, resuming if possible.
    ///
    /// A leftover partial is offered with a `Range` request; the server's
    /// answer decides. `206 Partial Content` appends to the partial, a
    /// plain `200` means no range support and restarts from zero.
    async fn transfer(&self, part_path: &Path) -> Result<(), DownloadError> {
        if self.cancel.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        let partial_len = tokio::fs::metadata(part_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);

        let mut request = self
            .client
            .get(self.url)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT);
        if partial_len > 0 {
            debug!(url = self.url, partial_len, "offering partial for resume");
            request = request.header(reqwest::header::RANGE, format!("bytes={partial_len}-"));
        }

        let response = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DownloadError::Failed(e.to_string()))?;

        let resumed = partial_len > 0 && response.status() == reqwest::StatusCode::PARTIAL_CONTENT;
        let (mut file, resume_from, total_size): (File, u64, u64) = if resumed {
            let remaining = response.content_length().unwrap_or(0);
            let file = OpenOptions::new().append(true).open(part_path).await?;
            (file, partial_len, partial_len + remaining)
        } else {
            if partial_len > 0 {
                debug!(url = self.url, "server ignored the range, restarting");
            }
            let total = response.content_length().unwrap_or(0);
            (File::create(part_path).await?, 0, total)
        };

        let mut downloaded = resume_from;
        let mut last_emit = Instant::now() - PROGRESS_INTERVAL;
        let mut stream = response.bytes_stream();

        self.reporter
            .component_step(self.comp_uid, Step::Downloading, &artifact_name(self.url));

        while let Some(chunk) = stream.next().await {
            if self.cancel.is_cancelled() {
                return Err(DownloadError::Cancelled);
            }
            let chunk = chunk.map_err(|e| DownloadError::Failed(e.to_string()))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if last_emit.elapsed() >= PROGRESS_INTERVAL {
                last_emit = Instant::now();
                self.reporter.progress(self.comp_uid, percent(downloaded, total_size));
            }
        }
        file.flush().await?;
        Ok(())
    }
}

fn percent(downloaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((downloaded.saturating_mul(100)) / total).min(100) as u8
}

async fn verify_sha256(path: &Path, expected: &str) -> Result<(), DownloadError> {
    let path = path.to_path_buf();
    let expected = expected.to_lowercase();
    let actual = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
        use std::io::Read;
        let mut hasher = Sha256::new();
        let mut file = std::fs::File::open(&path)?;
        let mut buf = [0u8; 8192];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hex::encode(hasher.finalize()))
    })
    .await
    .map_err(|e| DownloadError::Failed(e.to_string()))??;

    if actual != expected {
        return Err(DownloadError::ChecksumMismatch {
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::NullReporter;
    use tempfile::tempdir;

    fn client() -> Client {
        Client::new()
    }

    #[test]
    fn artifact_name_strips_path_and_query() {
        assert_eq!(artifact_name("https://x.org/a/b/jre.tar.gz"), "jre.tar.gz");
        assert_eq!(artifact_name("https://x.org/a/b/jre.zip?sig=abc"), "jre.zip");
        // The host is never mistaken for a file name.
        assert_eq!(artifact_name("https://x.org/"), "artifact");
        assert_eq!(artifact_name("https://x.org"), "artifact");
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(50, 200), 25);
        assert_eq!(percent(400, 200), 100);
    }

    #[tokio::test]
    async fn downloads_to_named_artifact() {
        let mut server = mockito::Server::new_async().await;
        let _get = server
            .mock("GET", "/pkg/tool.bin")
            .with_body("hello")
            .create_async()
            .await;

        let tmp = tempdir().unwrap();
        let url = format!("{}/pkg/tool.bin", server.url());
        let cancel = CancelHandle::new();
        let req = DownloadRequest {
            client: &client(),
            comp_uid: &ComponentId::new("c"),
            url: &url,
            dest_dir: tmp.path(),
            expected_sha256: None,
            reporter: &NullReporter,
            cancel: &cancel,
        };

        let path = req.execute().await.unwrap();
        assert!(path.ends_with("tool.bin"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }

    #[tokio::test]
    async fn resumes_partial_when_server_accepts_ranges() {
        let mut server = mockito::Server::new_async().await;
        let get = server
            .mock("GET", "/pkg/tool.bin")
            .match_header("range", "bytes=4-")
            .with_status(206)
            .with_body("56789!")
            .create_async()
            .await;

        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("tool.bin.part"), "0123").unwrap();

        let url = format!("{}/pkg/tool.bin", server.url());
        let cancel = CancelHandle::new();
        let req = DownloadRequest {
            client: &client(),
            comp_uid: &ComponentId::new("c"),
            url: &url,
            dest_dir: tmp.path(),
            expected_sha256: None,
            reporter: &NullReporter,
            cancel: &cancel,
        };

        let path = req.execute().await.unwrap();
        get.assert_async().await;
        assert_eq!(std::fs::read_to_string(path).unwrap(), "012356789!");
    }

    #[tokio::test]
    async fn full_status_restarts_instead_of_appending() {
        // The partial is offered but the server answers 200 with the
        // whole body, so the stale bytes must not survive.
        let mut server = mockito::Server::new_async().await;
        let _get = server
            .mock("GET", "/pkg/tool.bin")
            .with_body("fresh-body")
            .create_async()
            .await;

        let tmp = tempdir().unwrap();
        std::fs::write(tmp.path().join("tool.bin.part"), "stale").unwrap();

        let url = format!("{}/pkg/tool.bin", server.url());
        let cancel = CancelHandle::new();
        let req = DownloadRequest {
            client: &client(),
            comp_uid: &ComponentId::new("c"),
            url: &url,
            dest_dir: tmp.path(),
            expected_sha256: None,
            reporter: &NullReporter,
            cancel: &cancel,
        };

        let path = req.execute().await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "fresh-body");
    }

    #[tokio::test]
    async fn cancelled_handle_fails_with_distinct_kind() {
        let server = mockito::Server::new_async().await;
        let tmp = tempdir().unwrap();
        let url = format!("{}/pkg/tool.bin", server.url());
        let cancel = CancelHandle::new();
        cancel.cancel();

        let req = DownloadRequest {
            client: &client(),
            comp_uid: &ComponentId::new("c"),
            url: &url,
            dest_dir: tmp.path(),
            expected_sha256: None,
            reporter: &NullReporter,
            cancel: &cancel,
        };

        let err = req.execute().await.unwrap_err();
        assert!(matches!(err, DownloadError::Cancelled));
        assert!(!tmp.path().join("tool.bin").exists());
        assert!(!tmp.path().join("tool.bin.part").exists());
    }

    #[tokio::test]
    async fn checksum_mismatch_fails_the_download() {
        let mut server = mockito::Server::new_async().await;
        let _get = server
            .mock("GET", "/pkg/tool.bin")
            .with_body("hello")
            .create_async()
            .await;

        let tmp = tempdir().unwrap();
        let url = format!("{}/pkg/tool.bin", server.url());
        let cancel = CancelHandle::new();
        let req = DownloadRequest {
            client: &client(),
            comp_uid: &ComponentId::new("c"),
            url: &url,
            dest_dir: tmp.path(),
            expected_sha256: Some("00"),
            reporter: &NullReporter,
            cancel: &cancel,
        };

        let err = req.execute().await.unwrap_err();
        assert!(matches!(err, DownloadError::ChecksumMismatch { .. }));
        // The corrupt artifact is gone in both its forms.
        assert!(!tmp.path().join("tool.bin").exists());
        assert!(!tmp.path().join("tool.bin.part").exists());
    }
}
