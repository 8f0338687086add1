//! Bundler pipeline: config → resolve → context → render → write.
//!
//! Groups run in config order and entries in array order, one at a time.
//! The first failure aborts the run; nothing after it is attempted.

use std::path::{Path, PathBuf};

use libutil_core::{
    config::{load_config, BundlerConfig},
    paths::resolve,
    BundleEntry, WriteResult,
};
use libutil_render::{render_to_file, Context, RenderToFileOptions};

use crate::error::{resolve_err, BundleError};
use crate::resolver::resolve_files;

/// Template used when an entry has no `template`.
pub const TEMPLATE_PLACEHOLDER: &str = "no template provided";

/// Outcome of running one entry.
#[derive(Debug, Clone)]
pub struct GroupReport {
    /// Base pattern of the group the entry belongs to.
    pub base: String,
    /// Number of files the entry resolved.
    pub files: usize,
    /// Rendered output, if the entry has an outfile.
    pub output: Option<WriteResult>,
}

fn load_template(root: &Path, template: Option<&Path>) -> Result<String, BundleError> {
    match template {
        Some(t) => {
            let path = resolve(root, t);
            std::fs::read_to_string(&path).map_err(|e| resolve_err(path, e))
        }
        None => Ok(TEMPLATE_PLACEHOLDER.to_string()),
    }
}

/// Run a single entry of the group keyed by `base`.
pub fn run_entry(root: &Path, base: &str, entry: &BundleEntry) -> Result<GroupReport, BundleError> {
    let files = resolve_files(root, base, entry)?;
    tracing::debug!(group = base, files = files.len(), "resolved files");

    let template = load_template(root, entry.template.as_deref())?;
    let count = files.len();
    let context = Context::from_files(files, &entry.folders);

    let output = match &entry.outfile {
        Some(outfile) => {
            let outfile: PathBuf = resolve(root, outfile);
            Some(render_to_file(
                &outfile,
                &template,
                &context,
                &RenderToFileOptions::default(),
            )?)
        }
        None => None,
    };

    Ok(GroupReport {
        base: base.to_string(),
        files: count,
        output,
    })
}

/// Run every entry of every group in `config`.
pub fn run(config: &BundlerConfig) -> Result<Vec<GroupReport>, BundleError> {
    let mut reports = Vec::new();
    for group in &config.groups {
        for entry in &group.entries {
            reports.push(run_entry(&config.root, &group.base, entry)?);
        }
    }
    Ok(reports)
}

/// Load the config at `path` and run it.
pub fn run_file(path: &Path) -> Result<Vec<GroupReport>, BundleError> {
    let config = load_config(path)?;
    run(&config)
}
