//! File discovery for one bundler entry.
//!
//! 1. Glob the base pattern under the root; each matching directory is a
//!    scan root.
//! 2. Glob the entry's file patterns under each scan root, once per
//!    configured folder when folders are set.
//! 3. Drop ignored paths and the entry's own outfile.
//! 4. Derive name, folder and import metadata; optionally copy the file.
//! 5. Sort everything by `name`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde::Serialize;

use libutil_core::{
    checksum,
    config::apply_all,
    fs::write_atomic,
    paths::{resolve, to_slash},
    BundleEntry, Replacement, ResolvedFile,
};
use libutil_render::{render, RenderOptions};

use crate::error::{resolve_err, write_err, BundleError};

/// Wildcards never cross `/` and never match a leading `.`.
const MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Drop the last `.suffix` (a dot followed by at least one non-dot char up
/// to the end). The suffix may contain `/`: `a.b/c` becomes `a`.
fn strip_extension(s: &str) -> String {
    match s.rfind('.') {
        Some(idx) if idx + 1 < s.len() => s[..idx].to_string(),
        _ => s.to_string(),
    }
}

/// Replace every non-word character with `_`.
fn sanitize_identifier(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

// ---------------------------------------------------------------------------
// Globbing
// ---------------------------------------------------------------------------

fn has_magic(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{'])
}

/// Expand `{a,b}` alternation, which `glob` does not understand, into one
/// pattern per alternative. Groups may nest. A `{` inside a `[...]` class,
/// an unclosed group, or a group without a comma is left as written.
fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = find_open_brace(pattern) else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut commas = Vec::new();
    let mut close = None;
    for (i, c) in pattern[open..].char_indices().map(|(i, c)| (i + open, c)) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            ',' if depth == 1 => commas.push(i),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };
    if commas.is_empty() {
        let (head, tail) = pattern.split_at(close + 1);
        return expand_braces(tail)
            .into_iter()
            .map(|t| format!("{head}{t}"))
            .collect();
    }

    let (prefix, suffix) = (&pattern[..open], &pattern[close + 1..]);
    let mut bounds = vec![open];
    bounds.extend(&commas);
    bounds.push(close);

    let mut out = Vec::new();
    for pair in bounds.windows(2) {
        let alt = &pattern[pair[0] + 1..pair[1]];
        for expanded in expand_braces(&format!("{prefix}{alt}{suffix}")) {
            if !out.contains(&expanded) {
                out.push(expanded);
            }
        }
    }
    out
}

/// Byte index of the first `{` outside a `[...]` character class.
fn find_open_brace(pattern: &str) -> Option<usize> {
    let mut in_class = false;
    for (i, c) in pattern.char_indices() {
        match c {
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '{' if !in_class => return Some(i),
            _ => {}
        }
    }
    None
}

fn glob_paths(pattern: &str) -> Result<Vec<PathBuf>, BundleError> {
    let paths = glob::glob_with(pattern, MATCH).map_err(|source| BundleError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;
    paths
        .map(|entry| {
            entry.map_err(|e| {
                let path = e.path().to_path_buf();
                resolve_err(path, std::io::Error::from(e))
            })
        })
        .collect()
}

/// Escaped `dir` followed by `/` and the (unescaped) `tail` pattern.
fn anchored(dir: &Path, tail: &str) -> String {
    format!("{}/{}", Pattern::escape(&dir.to_string_lossy()), tail)
}

/// Directories under `root` matching `base_pattern`.
fn scan_roots(root: &Path, base_pattern: &str) -> Result<Vec<PathBuf>, BundleError> {
    let mut dirs = Vec::new();
    for pattern in expand_braces(base_pattern) {
        let found = if has_magic(&pattern) {
            glob_paths(&anchored(root, &pattern))?
        } else {
            vec![resolve(root, &pattern)]
        };
        for dir in found.into_iter().filter(|p| p.is_dir()) {
            let dir = resolve(root, dir);
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
    }
    Ok(dirs)
}

struct IgnoreSet(Vec<Pattern>);

impl IgnoreSet {
    fn compile(patterns: &[String]) -> Result<Self, BundleError> {
        patterns
            .iter()
            .flat_map(|p| expand_braces(p))
            .map(|p| {
                Pattern::new(&p).map_err(|source| BundleError::Pattern { pattern: p, source })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(IgnoreSet)
    }

    /// True when any pattern matches `relative` or one of its ancestor
    /// directories (an ignored directory hides its contents).
    fn is_ignored(&self, relative: &str) -> bool {
        let mut prefix = relative;
        loop {
            if self.0.iter().any(|p| p.matches_with(prefix, MATCH)) {
                return true;
            }
            match prefix.rfind('/') {
                Some(idx) => prefix = &prefix[..idx],
                None => return false,
            }
        }
    }
}

/// Files under `scan_root` matching the entry's patterns, minus ignored
/// ones. Duplicates across patterns are dropped.
fn match_files(
    scan_root: &Path,
    entry: &BundleEntry,
    ignore: &IgnoreSet,
) -> Result<Vec<PathBuf>, BundleError> {
    let mut patterns = Vec::new();
    for pattern in entry.patterns.iter().flat_map(|p| expand_braces(p)) {
        if entry.folders.is_empty() {
            patterns.push(anchored(scan_root, &pattern));
        } else {
            for folder in &entry.folders {
                patterns.push(anchored(scan_root, &format!("{folder}/{pattern}")));
            }
        }
    }

    let mut seen = HashSet::new();
    let mut matches = Vec::new();
    for pattern in patterns {
        for path in glob_paths(&pattern)? {
            if !path.is_file() {
                continue;
            }
            let relative = to_slash(path.strip_prefix(scan_root).unwrap_or(&path));
            if ignore.is_ignored(&relative) {
                tracing::debug!("ignored: {}", path.display());
                continue;
            }
            if seen.insert(path.clone()) {
                matches.push(path);
            }
        }
    }
    Ok(matches)
}

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// Build the [`ResolvedFile`] for `path` found under `scan_root`.
pub fn describe(root: &Path, scan_root: &Path, path: PathBuf, entry: &BundleEntry) -> ResolvedFile {
    let relative_path = to_slash(path.strip_prefix(scan_root).unwrap_or(&path));
    let name = apply_all(strip_extension(&relative_path), &entry.filename_replacements);

    let folder = entry
        .folders
        .iter()
        .find(|f| name.starts_with(&format!("{f}/")))
        .cloned()
        .unwrap_or_default();

    let basename = if folder.is_empty() {
        name.clone()
    } else {
        name[folder.len() + 1..].to_string()
    };

    let path_str = path.to_string_lossy().into_owned();
    let import_name = format!(
        "_{}_{}",
        sanitize_identifier(&name),
        checksum(&path_str)
    );
    let import_path = match &entry.import_base {
        Some(base) => strip_extension(&path_str.replacen(&*root.to_string_lossy(), base, 1)),
        None => format!("./{name}"),
    };

    ResolvedFile {
        name,
        basename,
        path,
        relative_path,
        folder,
        import_name,
        import_path,
    }
}

// ---------------------------------------------------------------------------
// Copy
// ---------------------------------------------------------------------------

/// Variables available to a `copyTo` template.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CopyTarget<'a> {
    path: &'a Path,
    relative_path: &'a str,
    folder: &'a str,
    name: &'a str,
    basename: &'a str,
}

/// Copy `file` to the rendered `copy_to` target. Content is read as UTF-8,
/// with invalid sequences replaced, before the replacements run.
fn copy_file(
    root: &Path,
    file: &ResolvedFile,
    copy_to: &str,
    replacements: &[Replacement],
) -> Result<PathBuf, BundleError> {
    let target = CopyTarget {
        path: &file.path,
        relative_path: &file.relative_path,
        folder: &file.folder,
        name: &file.name,
        basename: &file.basename,
    };
    let dst = resolve(root, render(copy_to, &target, RenderOptions::default())?);

    let bytes = std::fs::read(&file.path).map_err(|e| resolve_err(&file.path, e))?;
    let content = apply_all(String::from_utf8_lossy(&bytes).into_owned(), replacements);

    write_atomic(&dst, &content).map_err(|e| write_err(&dst, e))?;
    tracing::info!("copied: {} -> {}", file.path.display(), dst.display());
    Ok(dst)
}

// ---------------------------------------------------------------------------
// resolve_files
// ---------------------------------------------------------------------------

/// Discover every file `entry` selects under directories matching
/// `base_pattern` (relative to `root`).
///
/// The entry's own outfile is never returned. With `copy_to` set, each file
/// is also copied; any copy failure aborts the whole resolution.
pub fn resolve_files(
    root: &Path,
    base_pattern: &str,
    entry: &BundleEntry,
) -> Result<Vec<ResolvedFile>, BundleError> {
    let outfile = entry.outfile.as_ref().map(|f| resolve(root, f));
    let ignore = IgnoreSet::compile(&entry.ignore)?;

    let mut files = Vec::new();
    for scan_root in scan_roots(root, base_pattern)? {
        for path in match_files(&scan_root, entry, &ignore)? {
            if outfile.as_deref() == Some(path.as_path()) {
                tracing::debug!("skipping own outfile: {}", path.display());
                continue;
            }
            let file = describe(root, &scan_root, path, entry);
            if let Some(copy_to) = &entry.copy_to {
                copy_file(root, &file, copy_to, &entry.content_replacements)?;
            }
            files.push(file);
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn entry(patterns: &[&str]) -> BundleEntry {
        BundleEntry {
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    fn names(files: &[ResolvedFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[rstest]
    #[case("index.ts", "index")]
    #[case("routes/users.page.ts", "routes/users.page")]
    #[case("Makefile", "Makefile")]
    #[case("trailing.", "trailing.")]
    fn strip_extension_drops_last_suffix(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_extension(input), expected);
    }

    #[rstest]
    #[case("_hidden.txt", true)]
    #[case("a.txt", false)]
    #[case("sub/_private/a.txt", true)]
    #[case("sub/a_b.txt", false)]
    fn default_ignore_hides_underscore_segments(#[case] rel: &str, #[case] ignored: bool) {
        let set = IgnoreSet::compile(&["**/_*".to_string()]).unwrap();
        assert_eq!(set.is_ignored(rel), ignored);
    }

    #[rstest]
    #[case("**/*.ts", &["**/*.ts"])]
    #[case("**/*.{ts,tsx}", &["**/*.ts", "**/*.tsx"])]
    #[case("{a,b}/{c,d}", &["a/c", "a/d", "b/c", "b/d"])]
    #[case("x.{a,{b,c}}", &["x.a", "x.b", "x.c"])]
    #[case("{same,same}", &["same"])]
    #[case("[{]*", &["[{]*"])]
    #[case("{single}.{a,b}", &["{single}.a", "{single}.b"])]
    #[case("open{a,b", &["open{a,b"])]
    fn brace_groups_expand(#[case] pattern: &str, #[case] expected: &[&str]) {
        assert_eq!(expand_braces(pattern), expected);
    }

    #[rstest]
    #[case("**/*.{ts,tsx}", &["a", "b", "c"])]
    #[case("{a,c}.*", &["a", "c"])]
    #[case("*.ts", &["a", "c"])]
    fn brace_file_patterns_select_every_alternative(
        #[case] pattern: &str,
        #[case] expected: &[&str],
    ) {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/a.ts", "");
        touch(tmp.path(), "src/b.tsx", "");
        touch(tmp.path(), "src/c.ts", "");
        touch(tmp.path(), "src/d.js", "");

        let files = resolve_files(tmp.path(), "src", &entry(&[pattern])).unwrap();
        assert_eq!(names(&files), expected);
    }

    #[rstest]
    #[case("**/*.{spec,test}.ts", &["lib/util", "main", "vendor/dep"])]
    #[case("{lib,vendor}", &["main", "main.spec", "main.test"])]
    fn brace_ignore_patterns_hide_every_alternative(
        #[case] ignore: &str,
        #[case] expected: &[&str],
    ) {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/main.ts", "");
        touch(tmp.path(), "src/main.spec.ts", "");
        touch(tmp.path(), "src/main.test.ts", "");
        touch(tmp.path(), "src/lib/util.ts", "");
        touch(tmp.path(), "src/vendor/dep.ts", "");

        let mut e = entry(&["**/*.ts"]);
        e.ignore = vec![ignore.to_string()];
        let files = resolve_files(tmp.path(), "src", &e).unwrap();
        assert_eq!(names(&files), expected);
    }

    #[test]
    fn brace_base_pattern_selects_each_directory() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "app/a.ts", "");
        touch(tmp.path(), "lib/b.ts", "");
        touch(tmp.path(), "other/c.ts", "");

        let files = resolve_files(tmp.path(), "{app,lib}", &entry(&["*.ts"])).unwrap();
        assert_eq!(names(&files), vec!["a", "b"]);
    }

    #[test]
    fn copy_to_tolerates_non_utf8_sources() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/raw.ts"), b"ok \xff end\n").unwrap();

        let mut e = entry(&["*.ts"]);
        e.copy_to = Some("out/{{ relativePath }}".into());
        let files = resolve_files(tmp.path(), "src", &e).unwrap();

        assert_eq!(names(&files), vec!["raw"]);
        let copied = fs::read_to_string(tmp.path().join("out/raw.ts")).unwrap();
        assert_eq!(copied, "ok \u{fffd} end\n");
    }

    #[test]
    fn underscore_files_excluded_and_sorted() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/b.txt", "");
        touch(tmp.path(), "src/a.txt", "");
        touch(tmp.path(), "src/_hidden.txt", "");

        let files = resolve_files(tmp.path(), "src", &entry(&["**/*.txt"])).unwrap();
        assert_eq!(names(&files), vec!["a", "b"]);
        assert_eq!(files[0].relative_path, "a.txt");
        assert_eq!(files[0].import_path, "./a");
        assert!(files[0].folder.is_empty());
        assert_eq!(files[0].basename, "a");
    }

    #[test]
    fn outfile_is_excluded_from_its_own_inputs() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/a.ts", "");
        touch(tmp.path(), "src/index.ts", "");

        let mut e = entry(&["*.ts"]);
        e.outfile = Some(PathBuf::from("src/index.ts"));
        let files = resolve_files(tmp.path(), "src", &e).unwrap();
        assert_eq!(names(&files), vec!["a"]);
    }

    #[test]
    fn folders_prefix_patterns_and_split_basename() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "app/pages/home.ts", "");
        touch(tmp.path(), "app/api/users.ts", "");
        touch(tmp.path(), "app/other/skip.ts", "");

        let mut e = entry(&["**/*.ts"]);
        e.folders = vec!["pages".into(), "api".into()];
        let files = resolve_files(tmp.path(), "app", &e).unwrap();

        assert_eq!(names(&files), vec!["api/users", "pages/home"]);
        assert_eq!(files[0].folder, "api");
        assert_eq!(files[0].basename, "users");
        assert_eq!(files[1].folder, "pages");
        assert_eq!(files[1].basename, "home");
    }

    #[test]
    fn filename_replacements_apply_after_extension_strip() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/users/index.page.ts", "");

        let mut e = entry(&["**/*.ts"]);
        e.filename_replacements = vec![
            Replacement::new(r"\.page$", "").unwrap(),
            Replacement::new("/index$", "").unwrap(),
        ];
        let files = resolve_files(tmp.path(), "src", &e).unwrap();
        assert_eq!(names(&files), vec!["users"]);
        assert_eq!(files[0].relative_path, "users/index.page.ts");
    }

    #[test]
    fn import_names_unique_for_colliding_identifiers() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/a-b.ts", "");
        touch(tmp.path(), "src/a_b.ts", "");

        let files = resolve_files(tmp.path(), "src", &entry(&["*.ts"])).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].import_name.starts_with("_a_b_"));
        assert!(files[1].import_name.starts_with("_a_b_"));
        assert_ne!(files[0].import_name, files[1].import_name);
    }

    #[test]
    fn import_base_rewrites_root_and_strips_extension() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "lib/util.ts", "");

        let mut e = entry(&["*.ts"]);
        e.import_base = Some("@app".into());
        let files = resolve_files(tmp.path(), "lib", &e).unwrap();
        assert_eq!(files[0].import_path, "@app/lib/util");
    }

    #[test]
    fn glob_base_pattern_spans_directories_and_sorts_globally() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "packages/zed/c.ts", "");
        touch(tmp.path(), "packages/alpha/d.ts", "");
        touch(tmp.path(), "packages/zed/a.ts", "");
        touch(tmp.path(), "packages/not-a-dir.ts", "");

        let files = resolve_files(tmp.path(), "packages/*", &entry(&["*.ts"])).unwrap();
        assert_eq!(names(&files), vec!["a", "c", "d"]);
    }

    #[test]
    fn missing_base_directory_yields_nothing() {
        let tmp = TempDir::new().unwrap();
        let files = resolve_files(tmp.path(), "nope", &entry(&["*.ts"])).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn copy_to_writes_rewritten_content() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "src/pages/home.ts", "import x from '~/lib';\nimport y from '~/lib';\n");

        let mut e = entry(&["**/*.ts"]);
        e.folders = vec!["pages".into()];
        e.copy_to = Some("dist/{{ folder }}/{{ basename }}.js".into());
        e.content_replacements = vec![Replacement::new("~/", "../").unwrap()];
        resolve_files(tmp.path(), "src", &e).unwrap();

        let copied = fs::read_to_string(tmp.path().join("dist/pages/home.js")).unwrap();
        assert_eq!(copied, "import x from '../lib';\nimport y from '~/lib';\n");
    }

    #[test]
    fn invalid_ignore_pattern_is_reported() {
        let tmp = TempDir::new().unwrap();
        let mut e = entry(&["*.ts"]);
        e.ignore = vec!["[".into()];
        let err = resolve_files(tmp.path(), "src", &e).unwrap_err();
        assert!(matches!(err, BundleError::Pattern { .. }), "got: {err}");
    }
}
