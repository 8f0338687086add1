//! # libutil-bundler
//!
//! File discovery and template bundling.
//!
//! [`resolve_files`] expands one config entry into [`ResolvedFile`]s;
//! [`pipeline::run`] walks every group of a loaded config, renders each
//! entry's template over the discovered files and writes the output.
//!
//! [`ResolvedFile`]: libutil_core::ResolvedFile

pub mod error;
pub mod pipeline;
pub mod resolver;

pub use error::BundleError;
pub use pipeline::{run, run_entry, run_file, GroupReport, TEMPLATE_PLACEHOLDER};
pub use resolver::resolve_files;
