//! Atomic file writes.
//!
//! Content goes to `<path>.libutil.tmp` first and is renamed over `path`, so
//! readers and watchers never observe a half-written file.

use std::io;
use std::path::{Path, PathBuf};

/// Temp path used while writing `path`.
pub fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.libutil.tmp", path.display()))
}

/// Write `content` to `path`, creating parent directories as needed.
///
/// On rename failure the temp file is removed and the original (if any) is
/// left intact.
pub fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    std::fs::write(&tmp, content)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a").join("b").join("out.ts");
        write_atomic(&path, "export {};\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "export {};\n");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.ts");
        write_atomic(&path, "data").unwrap();
        assert!(!tmp_path(&path).exists(), ".libutil.tmp must be cleaned up");
    }

    #[test]
    fn overwrites_existing_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.txt");
        write_atomic(&path, "v1").unwrap();
        write_atomic(&path, "v2").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "v2");
    }
}
