//! Path helpers.
//!
//! [`resolve`] mirrors `path.resolve(base, path)`: join, then lexically
//! normalise `.` and `..` without touching the filesystem.

use std::path::{Component, Path, PathBuf};

use path_absolutize::Absolutize;

/// Join `path` onto `base` and normalise the result.
///
/// An absolute `path` replaces `base`. A relative `base` is anchored at the
/// current directory.
pub fn resolve(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let joined = base.join(path);
    match joined.absolutize() {
        Ok(p) => p.into_owned(),
        Err(_) => joined,
    }
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            Component::ParentDir => Some("..".into()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
