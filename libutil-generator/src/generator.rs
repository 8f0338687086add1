//! [`FileGenerator`] — per-instance write queue over a base directory.
//!
//! Each generator owns its queue table, so two generators never block each
//! other, even on the same path.
//!
//! # Failure policy
//!
//! When a write fails, its own caller gets the error and every write still
//! queued for that path fails with [`GenerateError::Aborted`]. Later
//! submissions start a fresh queue. A path is recorded in
//! [`FileGenerator::generated_files`] only after a drain in which every write
//! succeeded.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use libutil_core::{paths::resolve, WriteResult};
use libutil_render::{apply_formatters, render, Formatter, RenderOptions};

use crate::error::GenerateError;
use crate::queue::{DrainGuard, Job, Slot, WriteQueue};
use crate::writer::write_if_changed;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A template plus the context to render it with.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub template: String,
    pub context: serde_json::Value,
    pub options: RenderOptions,
}

impl RenderRequest {
    pub fn new(template: impl Into<String>, context: serde_json::Value) -> Self {
        RenderRequest {
            template: template.into(),
            context,
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

/// What a write produces: literal text or a template to render.
#[derive(Debug, Clone)]
pub enum Content {
    Literal(String),
    Render(RenderRequest),
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Literal(s)
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Literal(s.to_owned())
    }
}

impl From<RenderRequest> for Content {
    fn from(r: RenderRequest) -> Self {
        Content::Render(r)
    }
}

/// Whether an existing destination may be replaced.
#[derive(Clone, Default)]
pub enum Overwrite {
    /// Replace whenever the content differs.
    #[default]
    Always,
    /// Never touch an existing file.
    Never,
    /// Replace only if the predicate accepts the current content.
    When(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Overwrite {
    pub fn when(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Overwrite::When(Arc::new(predicate))
    }
}

impl From<bool> for Overwrite {
    fn from(overwrite: bool) -> Self {
        if overwrite {
            Overwrite::Always
        } else {
            Overwrite::Never
        }
    }
}

impl fmt::Debug for Overwrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Overwrite::Always => f.write_str("Always"),
            Overwrite::Never => f.write_str("Never"),
            Overwrite::When(_) => f.write_str("When(..)"),
        }
    }
}

/// Per-call options for [`FileGenerator::generate_file`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub overwrite: Overwrite,
}

impl GenerateOptions {
    pub fn overwrite(overwrite: impl Into<Overwrite>) -> Self {
        GenerateOptions {
            overwrite: overwrite.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// FileGenerator
// ---------------------------------------------------------------------------

/// Writes generated files under `base`, serialising writes per path.
pub struct FileGenerator {
    base: PathBuf,
    formatters: Vec<Formatter>,
    queue: WriteQueue,
    generated: Mutex<BTreeSet<PathBuf>>,
}

impl FileGenerator {
    pub fn new(base: impl AsRef<Path>) -> Self {
        FileGenerator {
            base: resolve(Path::new("."), base),
            formatters: Vec::new(),
            queue: WriteQueue::default(),
            generated: Mutex::new(BTreeSet::new()),
        }
    }

    /// Append a formatter. Formatters run in the order added, after
    /// rendering and before the checksum comparison.
    pub fn with_formatter(
        mut self,
        formatter: impl Fn(&str, &Path) -> String + Send + Sync + 'static,
    ) -> Self {
        self.formatters.push(Arc::new(formatter));
        self
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Absolute paths whose queues drained without error so far.
    pub fn generated_files(&self) -> BTreeSet<PathBuf> {
        self.generated
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Write `content` to `outfile` (relative to the base directory).
    ///
    /// If another write for the same path is in flight, this one waits its
    /// turn and resolves once it has run. The first caller for an idle path
    /// also runs everything queued behind it before returning.
    pub async fn generate_file(
        &self,
        outfile: impl AsRef<Path>,
        content: impl Into<Content>,
        options: GenerateOptions,
    ) -> Result<WriteResult, GenerateError> {
        let file = resolve(&self.base, outfile);
        let job = Job {
            content: content.into(),
            options,
        };

        let job = match self.queue.submit(&file, job) {
            Slot::Claimed(job) => job,
            Slot::Queued(rx) => {
                tracing::debug!("queued behind running write: {}", file.display());
                return match rx.await {
                    Ok(result) => result,
                    Err(_) => Err(GenerateError::Cancelled { path: file }),
                };
            }
        };

        let guard = DrainGuard::new(&self.queue, &file);
        let first = self.execute(&file, job).await;
        let drained = match &first {
            Ok(_) => self.drain(&file).await,
            Err(err) => {
                self.abort_pending(&file, err);
                false
            }
        };
        guard.disarm();

        if drained {
            self.generated
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(file);
        }
        first
    }

    /// Run queued writes for `file` until the queue is empty. Returns
    /// `false` if one of them failed.
    async fn drain(&self, file: &Path) -> bool {
        while let Some(pending) = self.queue.next(file) {
            match self.execute(file, pending.job).await {
                Ok(result) => {
                    let _ = pending.respond_to.send(Ok(result));
                }
                Err(err) => {
                    self.abort_pending(file, &err);
                    let _ = pending.respond_to.send(Err(err));
                    return false;
                }
            }
        }
        true
    }

    fn abort_pending(&self, file: &Path, cause: &GenerateError) {
        let pending = self.queue.take(file);
        if pending.is_empty() {
            return;
        }
        tracing::warn!(
            aborted = pending.len(),
            "write failed, aborting queued writes for {}: {cause}",
            file.display()
        );
        let reason = cause.to_string();
        for p in pending {
            let _ = p.respond_to.send(Err(GenerateError::Aborted {
                path: file.to_path_buf(),
                reason: reason.clone(),
            }));
        }
    }

    async fn execute(&self, file: &Path, job: Job) -> Result<WriteResult, GenerateError> {
        let rendered = match job.content {
            Content::Literal(text) => text,
            Content::Render(req) => render(&req.template, &req.context, req.options)?,
        };
        let formatted = apply_formatters(rendered, &self.formatters, file);
        write_if_changed(file, &formatted, &job.options.overwrite).await
    }
}

impl fmt::Debug for FileGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileGenerator")
            .field("base", &self.base)
            .field("formatters", &self.formatters.len())
            .finish_non_exhaustive()
    }
}
