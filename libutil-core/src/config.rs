//! Bundler configuration (`file-bundler.toml`).
//!
//! # Layout
//!
//! ```toml
//! # Each top-level key is a base glob pattern, matched against directories
//! # under the config file's directory. The value is one entry table or an
//! # array of entry tables.
//! [src]
//! pattern = "routes/**/*.ts"
//! template = "templates/routes.tera"
//! outfile = "src/routes.ts"
//!
//! [["packages/*"]]
//! pattern = ["**/*.vue", "**/*.ts"]
//! folders = ["components", "pages"]
//! filenameReplacements = [["\\.page$", ""]]
//! ```
//!
//! Groups keep document order; the pipeline processes them in that order.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use crate::error::ConfigError;

/// Pattern used when an entry does not set `pattern`.
pub const DEFAULT_PATTERN: &str = "**/*.ts";

/// Ignore pattern used when an entry does not set `defaultIgnore`: any path
/// segment starting with `_`.
pub const DEFAULT_IGNORE: &str = "**/_*";

// ---------------------------------------------------------------------------
// Raw TOML shape
// ---------------------------------------------------------------------------

/// A string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}

/// One entry table exactly as written in the config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub pattern: Option<OneOrMany>,
    pub template: Option<PathBuf>,
    pub outfile: Option<PathBuf>,
    pub import_base: Option<String>,
    #[serde(default)]
    pub folders: Vec<String>,
    #[serde(default)]
    pub filename_replacements: Vec<(String, String)>,
    #[serde(default)]
    pub content_replacements: Vec<(String, String)>,
    pub ignore: Option<OneOrMany>,
    pub default_ignore: Option<OneOrMany>,
    pub copy_to: Option<String>,
}

// `Many` first: a table never parses as a sequence, but an empty array
// would otherwise be accepted as an all-default `Entry`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntrySet {
    Many(Vec<Entry>),
    One(Entry),
}

// ---------------------------------------------------------------------------
// Resolved shape
// ---------------------------------------------------------------------------

/// A compiled `[regex, replacement]` pair.
///
/// Only the first match is replaced. Replacement strings use regex-crate
/// syntax (`$1`, `${name}`). Applying the same rules twice is idempotent
/// only when the rules are no-ops on already transformed input.
#[derive(Debug, Clone)]
pub struct Replacement {
    pub pattern: Regex,
    pub replacement: String,
}

impl Replacement {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Replacement {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    pub fn apply<'a>(&self, input: &'a str) -> Cow<'a, str> {
        self.pattern.replace(input, self.replacement.as_str())
    }
}

/// Apply `rules` in declaration order.
pub fn apply_all(input: String, rules: &[Replacement]) -> String {
    rules
        .iter()
        .fold(input, |acc, rule| rule.apply(&acc).into_owned())
}

/// An [`Entry`] with defaults merged and regexes compiled.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    /// File glob patterns, relative to each scan root (or folder).
    pub patterns: Vec<String>,
    pub template: Option<PathBuf>,
    pub outfile: Option<PathBuf>,
    pub import_base: Option<String>,
    pub folders: Vec<String>,
    pub filename_replacements: Vec<Replacement>,
    pub content_replacements: Vec<Replacement>,
    /// Explicit `ignore` followed by `defaultIgnore`.
    pub ignore: Vec<String>,
    pub copy_to: Option<String>,
}

impl Default for BundleEntry {
    fn default() -> Self {
        BundleEntry {
            patterns: vec![DEFAULT_PATTERN.to_string()],
            template: None,
            outfile: None,
            import_base: None,
            folders: Vec::new(),
            filename_replacements: Vec::new(),
            content_replacements: Vec::new(),
            ignore: vec![DEFAULT_IGNORE.to_string()],
            copy_to: None,
        }
    }
}

impl Entry {
    /// Merge defaults and compile replacement regexes.
    ///
    /// `group` is only used to label errors.
    pub fn resolve(self, group: &str) -> Result<BundleEntry, ConfigError> {
        let compile = |pairs: Vec<(String, String)>| {
            pairs
                .into_iter()
                .map(|(pattern, replacement)| {
                    Replacement::new(&pattern, replacement).map_err(|source| {
                        ConfigError::InvalidRegex {
                            group: group.to_string(),
                            pattern,
                            source,
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let mut ignore = self.ignore.map(OneOrMany::into_vec).unwrap_or_default();
        ignore.extend(
            self.default_ignore
                .map(OneOrMany::into_vec)
                .unwrap_or_else(|| vec![DEFAULT_IGNORE.to_string()]),
        );

        Ok(BundleEntry {
            patterns: self
                .pattern
                .map(OneOrMany::into_vec)
                .unwrap_or_else(|| vec![DEFAULT_PATTERN.to_string()]),
            template: self.template,
            outfile: self.outfile,
            import_base: self.import_base,
            folders: self.folders,
            filename_replacements: compile(self.filename_replacements)?,
            content_replacements: compile(self.content_replacements)?,
            ignore,
            copy_to: self.copy_to,
        })
    }
}

/// All entries configured under one base pattern.
#[derive(Debug, Clone)]
pub struct BundleGroup {
    /// Base glob pattern, matched against directories under the root.
    pub base: String,
    pub entries: Vec<BundleEntry>,
}

/// A loaded `file-bundler.toml`.
#[derive(Debug, Clone)]
pub struct BundlerConfig {
    /// Directory containing the config file; every relative path in the
    /// config resolves against it.
    pub root: PathBuf,
    pub groups: Vec<BundleGroup>,
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Parse config text. `path` labels errors and its parent becomes the root.
pub fn parse_config(contents: &str, path: &Path) -> Result<BundlerConfig, ConfigError> {
    let raw: IndexMap<String, EntrySet> =
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut groups = Vec::with_capacity(raw.len());
    for (base, set) in raw {
        let entries = match set {
            EntrySet::One(entry) => vec![entry],
            EntrySet::Many(entries) => entries,
        };
        let entries = entries
            .into_iter()
            .map(|e| e.resolve(&base))
            .collect::<Result<Vec<_>, _>>()?;
        groups.push(BundleGroup { base, entries });
    }

    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    Ok(BundlerConfig { root, groups })
}

/// Load the config at `path`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with
/// path + line context) if malformed TOML.
pub fn load_config(path: &Path) -> Result<BundlerConfig, ConfigError> {
    let path = crate::paths::resolve(Path::new("."), path);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = parse_config(&contents, &path)?;
    tracing::debug!(
        root = %config.root.display(),
        groups = config.groups.len(),
        "loaded bundler config"
    );
    Ok(config)
}
