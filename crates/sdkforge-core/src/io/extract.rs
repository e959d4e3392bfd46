//! Archive extraction for downloaded artifacts.

use crate::error::InstallError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Archive kind recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// `.zip`
    Zip,
    /// `.tar.gz` / `.tgz`
    TarGz,
    /// Anything else; handed to the install method as-is.
    Raw,
}

/// Detect the archive kind of an artifact path.
pub fn detect_kind(path: &Path) -> ArchiveKind {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.ends_with(".zip") {
        ArchiveKind::Zip
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        ArchiveKind::TarGz
    } else {
        ArchiveKind::Raw
    }
}

/// Extract an archive into `dest`, creating it if needed.
///
/// Raw artifacts are copied into `dest` unchanged. Extraction runs on the
/// blocking pool; the async caller stays responsive for progress events.
pub async fn extract(artifact: &Path, dest: &Path) -> Result<(), InstallError> {
    let kind = detect_kind(artifact);
    debug!(?kind, "extracting {} -> {}", artifact.display(), dest.display());

    let artifact = artifact.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || extract_blocking(kind, &artifact, &dest))
        .await
        .map_err(|e| InstallError::Extraction(format!("task panic: {e}")))?
}

fn extract_blocking(kind: ArchiveKind, artifact: &Path, dest: &PathBuf) -> Result<(), InstallError> {
    std::fs::create_dir_all(dest)?;
    match kind {
        ArchiveKind::Zip => {
            let file = std::fs::File::open(artifact)?;
            let mut archive = zip::ZipArchive::new(file)
                .map_err(|e| InstallError::Extraction(e.to_string()))?;
            archive
                .extract(dest)
                .map_err(|e| InstallError::Extraction(e.to_string()))?;
        }
        ArchiveKind::TarGz => {
            let file = std::fs::File::open(artifact)?;
            let decoder = flate2::read::GzDecoder::new(file);
            let mut archive = tar::Archive::new(decoder);
            archive
                .unpack(dest)
                .map_err(|e| InstallError::Extraction(e.to_string()))?;
        }
        ArchiveKind::Raw => {
            let name = artifact
                .file_name()
                .ok_or_else(|| InstallError::Extraction("artifact has no file name".into()))?;
            std::fs::copy(artifact, dest.join(name))?;
        }
    }
    Ok(())
}
