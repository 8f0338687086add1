//! Domain types shared by the bundler, renderer and generator.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ResolvedFile
// ---------------------------------------------------------------------------

/// One file discovered by a bundler scan.
///
/// Serialised with camelCase keys: templates read `file.relativePath`,
/// `file.importName` and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFile {
    /// Path relative to the scan root, `/`-separated, extension stripped,
    /// filename replacements applied.
    pub name: String,
    /// `name` without its folder prefix.
    pub basename: String,
    /// Absolute filesystem path.
    pub path: PathBuf,
    /// Path relative to the scan root, extension retained.
    pub relative_path: String,
    /// Owning configured folder, or empty.
    pub folder: String,
    /// Identifier-safe name, unique per `path`.
    pub import_name: String,
    /// Module specifier for import statements.
    pub import_path: String,
}

// ---------------------------------------------------------------------------
// WriteResult
// ---------------------------------------------------------------------------

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was left alone: new content has the same checksum as the old.
    Unchanged { path: PathBuf },
    /// File exists and the overwrite policy refused to replace it.
    Skipped { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::Skipped { path } => path,
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }
}
