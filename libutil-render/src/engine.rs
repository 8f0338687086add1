//! Tera rendering helpers — [`render`] and [`render_to_file`].
//!
//! Templates are compiled on every call. Output depends only on the template,
//! the context and the options, so callers may cache compiled templates
//! themselves without changing results.
//!
//! Escaping is off by default ([`RenderOptions::no_escape`] = `true`): these
//! helpers generate source code, not HTML. Pass `no_escape: false` when the
//! output is markup and interpolated values are untrusted.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tera::Tera;

use libutil_core::{checksum, fs::write_atomic, WriteResult};

use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Options recognised by [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Disable HTML-escaping of interpolated values.
    pub no_escape: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions { no_escape: true }
    }
}

/// Post-render transform: takes the current content and the target path,
/// returns the new content.
pub type Formatter = Arc<dyn Fn(&str, &Path) -> String + Send + Sync>;

/// Run `formatters` over `content` in order.
pub fn apply_formatters(content: String, formatters: &[Formatter], file: &Path) -> String {
    formatters.iter().fold(content, |acc, f| f(&acc, file))
}

/// Options recognised by [`render_to_file`].
#[derive(Clone)]
pub struct RenderToFileOptions {
    pub render: RenderOptions,
    /// When `false`, an existing file is left untouched.
    pub overwrite: bool,
    pub formatters: Vec<Formatter>,
}

impl Default for RenderToFileOptions {
    fn default() -> Self {
        RenderToFileOptions {
            render: RenderOptions::default(),
            overwrite: true,
            formatters: Vec::new(),
        }
    }
}

impl fmt::Debug for RenderToFileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderToFileOptions")
            .field("render", &self.render)
            .field("overwrite", &self.overwrite)
            .field("formatters", &self.formatters.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

/// Compile `template` and render it against `context`.
///
/// `context` must serialise to a map (struct or JSON object).
pub fn render<C>(template: &str, context: &C, options: RenderOptions) -> Result<String, RenderError>
where
    C: Serialize + ?Sized,
{
    let value = serde_json::to_value(context)?;
    let tera_ctx = tera::Context::from_value(value)?;
    let content = Tera::one_off(template, &tera_ctx, !options.no_escape)?;
    Ok(content)
}

/// Render `template` and write the result to `file`.
///
/// Parent directories are created. With `overwrite: false` an existing file
/// is skipped before rendering. A file whose checksum already matches the
/// output is left untouched.
pub fn render_to_file<C>(
    file: &Path,
    template: &str,
    context: &C,
    options: &RenderToFileOptions,
) -> Result<WriteResult, RenderError>
where
    C: Serialize + ?Sized,
{
    if !options.overwrite && file.exists() {
        tracing::debug!("exists, not overwriting: {}", file.display());
        return Ok(WriteResult::Skipped {
            path: file.to_path_buf(),
        });
    }

    let content = render(template, context, options.render)?;
    let content = apply_formatters(content, &options.formatters, file);

    if let Ok(current) = std::fs::read(file) {
        if checksum(&current) == checksum(&content) {
            tracing::debug!("unchanged: {}", file.display());
            return Ok(WriteResult::Unchanged {
                path: file.to_path_buf(),
            });
        }
    }

    write_atomic(file, &content).map_err(|source| RenderError::Write {
        path: file.to_path_buf(),
        source,
    })?;

    tracing::info!("wrote: {}", file.display());
    Ok(WriteResult::Written {
        path: file.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
