//! Bundle context — the payload handed to bundler templates.

use serde::Serialize;

use libutil_core::ResolvedFile;

/// Flat file list plus one group per configured folder.
///
/// Templates iterate `files` for everything, or `folders` for per-folder
/// sections. A file with an empty `folder` appears only in `files`.
#[derive(Debug, Clone, Serialize)]
pub struct Context {
    pub files: Vec<ResolvedFile>,
    pub folders: Vec<ContextFolder>,
}

/// Files belonging to one configured folder.
#[derive(Debug, Clone, Serialize)]
pub struct ContextFolder {
    pub folder: String,
    pub files: Vec<ResolvedFile>,
}

impl Context {
    /// Group `files` by `folders`, keeping configuration order. A configured
    /// folder with no files still gets an (empty) group.
    pub fn from_files(files: Vec<ResolvedFile>, folders: &[String]) -> Self {
        let folders = folders
            .iter()
            .map(|folder| ContextFolder {
                folder: folder.clone(),
                files: files
                    .iter()
                    .filter(|f| &f.folder == folder)
                    .cloned()
                    .collect(),
            })
            .collect();
        Context { files, folders }
    }
}
