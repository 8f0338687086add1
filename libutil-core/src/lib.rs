//! libutil core — shared types, config loading, checksum and path helpers.
//!
//! Public API surface:
//! - [`types`] — [`ResolvedFile`] and [`WriteResult`]
//! - [`config`] — bundler TOML config, [`BundleEntry`] defaults
//! - [`checksum`] — CRC-32 change detection
//! - [`paths`] — `path.resolve`-style joins and slash rendering
//! - [`fs`] — atomic temp-file + rename writes
//! - [`error`] — [`ConfigError`]

pub mod checksum;
pub mod config;
pub mod error;
pub mod fs;
pub mod paths;
pub mod types;

pub use checksum::checksum;
pub use config::{BundleEntry, BundleGroup, BundlerConfig, Replacement};
pub use error::ConfigError;
pub use types::{ResolvedFile, WriteResult};
