//! Publish content stage - atomically replaces output files
//!
//! Content is written to a temporary file next to the destination and then
//! renamed over it, so readers only ever see a complete file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::errors::{PipelineError, PipelineResult};
use crate::utils::human_format::{format_bytes, format_duration};

/// Temporary sibling used while writing `path`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `content` to `path` atomically, creating the parent directory if needed
pub async fn publish(path: &Path, content: &[u8]) -> PipelineResult<()> {
    let started = Instant::now();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PipelineError::output_write(path, e))?;
    }

    let temp_path = temp_path_for(path);
    if let Err(e) = write_and_rename(&temp_path, path, content).await {
        if let Err(cleanup) = tokio::fs::remove_file(&temp_path).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to remove temporary file {}: {}",
                    temp_path.display(),
                    cleanup
                );
            }
        }
        return Err(PipelineError::output_write(path, e));
    }

    debug!(
        "Published {} to {} in {}",
        format_bytes(content.len()),
        path.display(),
        format_duration(started.elapsed())
    );
    Ok(())
}

async fn write_and_rename(temp_path: &Path, path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(temp_path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(temp_path, path).await
}
