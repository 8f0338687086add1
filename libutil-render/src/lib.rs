//! # libutil-render
//!
//! Tera-backed template helpers for code generation, plus the [`Context`]
//! handed to bundler templates.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use libutil_render::{render, RenderOptions};
//! use serde_json::json;
//!
//! fn greet() -> Result<String, libutil_render::RenderError> {
//!     render("export const name = \"{{ name }}\";", &json!({ "name": "<app>" }), RenderOptions::default())
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{Context, ContextFolder};
pub use engine::{
    apply_formatters, render, render_to_file, Formatter, RenderOptions, RenderToFileOptions,
};
pub use error::RenderError;
