//! # libutil-generator
//!
//! Deduplicating file writer for code generators.
//!
//! [`FileGenerator::generate_file`] writes literal or template-rendered
//! content under a base directory. Writes to the same resolved path are
//! serialised in submission order; a write whose content matches what is
//! already on disk is skipped so file watchers stay quiet.
//!
//! ```rust,no_run
//! use libutil_generator::{FileGenerator, GenerateOptions, RenderRequest};
//! use serde_json::json;
//!
//! # async fn demo() -> Result<(), libutil_generator::GenerateError> {
//! let generator = FileGenerator::new("src/generated");
//! generator
//!     .generate_file("version.ts", "export const version = 1;\n", GenerateOptions::default())
//!     .await?;
//! generator
//!     .generate_file(
//!         "routes.ts",
//!         RenderRequest::new("export const routes = {{ routes | json_encode() }};", json!({ "routes": ["/"] })),
//!         GenerateOptions::default(),
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
mod queue;
pub mod writer;

pub use error::GenerateError;
pub use generator::{Content, FileGenerator, GenerateOptions, Overwrite, RenderRequest};
pub use libutil_core::WriteResult;
