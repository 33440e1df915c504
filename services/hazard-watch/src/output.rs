//! Atomic publication of overlay files.
//!
//! Each file is written to a uniquely named temp file in the target
//! directory and persisted over the destination, so a reader never sees a
//! half-written PNG or sidecar. The PNG is published before the sidecar
//! that describes it.

use std::io::Write;
use std::path::{Path, PathBuf};

use hazard_common::{HazardError, HazardResult};
use renderer::OverlayMetadata;
use tempfile::NamedTempFile;
use tracing::debug;

/// Write `bytes` to `path` via a temp file in the same directory.
///
/// Concurrent writers to the same `path` never share a temp file; the last
/// one to persist wins.
pub async fn write_atomic(path: &Path, bytes: Vec<u8>) -> HazardResult<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic_blocking(&path, &bytes))
        .await
        .map_err(|e| HazardError::Io(format!("write task failed: {}", e)))?
}

fn write_atomic_blocking(path: &Path, bytes: &[u8]) -> HazardResult<()> {
    let mut tmp = NamedTempFile::new_in(parent_dir(path))?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| HazardError::from(e.error))?;
    Ok(())
}

/// Publish an encoded overlay and its placement sidecar.
pub async fn publish_overlay(
    png_path: &Path,
    metadata_path: &Path,
    png: Vec<u8>,
    metadata: &OverlayMetadata,
) -> HazardResult<()> {
    tokio::fs::create_dir_all(parent_dir(png_path)).await?;
    tokio::fs::create_dir_all(parent_dir(metadata_path)).await?;

    let sidecar = serde_json::to_vec_pretty(metadata)?;
    let bytes = png.len();
    write_atomic(png_path, png).await?;
    write_atomic(metadata_path, sidecar).await?;

    debug!(
        png = %png_path.display(),
        bytes,
        generation = metadata.generation,
        "Published overlay"
    );
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
