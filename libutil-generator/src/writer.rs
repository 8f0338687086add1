//! Checksum-gated writer.
//!
//! ## `write_if_changed` — per-task protocol
//!
//! 1. If the destination does not exist, write.
//! 2. `Overwrite::Never` → skip.
//! 3. Read the current content; `Overwrite::When(p)` → skip unless `p(current)`.
//! 4. CRC-32 of new == CRC-32 of current → leave the file (and its mtime) alone.
//! 5. Write to `<path>.libutil.tmp`, rename over the destination.
//!
//! The extra exists + read costs two filesystem calls per write; in exchange
//! unchanged files are never touched.

use std::path::Path;

use libutil_core::{checksum, fs::tmp_path, WriteResult};

use crate::error::{io_err, GenerateError};
use crate::generator::Overwrite;

/// Write `content` to `path` unless the policy or an unchanged checksum says
/// otherwise.
pub async fn write_if_changed(
    path: &Path,
    content: &str,
    overwrite: &Overwrite,
) -> Result<WriteResult, GenerateError> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|e| io_err(path, e))?;

    if exists {
        if matches!(overwrite, Overwrite::Never) {
            tracing::debug!("exists, not overwriting: {}", path.display());
            return Ok(WriteResult::Skipped {
                path: path.to_path_buf(),
            });
        }

        let current = tokio::fs::read(path).await.map_err(|e| io_err(path, e))?;

        if let Overwrite::When(allow) = overwrite {
            if !allow(&String::from_utf8_lossy(&current)) {
                tracing::debug!("overwrite predicate declined: {}", path.display());
                return Ok(WriteResult::Skipped {
                    path: path.to_path_buf(),
                });
            }
        }

        if checksum(content) == checksum(&current) {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
    }

    write_atomic(path, content).await?;
    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

async fn write_atomic(path: &Path, content: &str) -> Result<(), GenerateError> {
    write_atomic_with_tmp(path, content, &tmp_path(path)).await
}

async fn write_atomic_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| io_err(parent, e))?;
    }
    tokio::fs::write(tmp, content)
        .await
        .map_err(|e| io_err(tmp, e))?;

    if let Err(e) = tokio::fs::rename(tmp, path).await {
        let _ = tokio::fs::remove_file(tmp).await;
        return Err(io_err(path, e));
    }
    Ok(())
}
