//! file-bundler — generate index files from globbed sources.
//!
//! # Usage
//!
//! ```text
//! file-bundler [-c|--config <path>]
//! ```
//!
//! Logging goes to stderr; set `RUST_LOG=debug` for per-file detail.

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::bundle::BundleArgs;

#[derive(Parser, Debug)]
#[command(
    name = "file-bundler",
    version,
    about = "Render index files from globbed source files, driven by file-bundler.toml",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    bundle: BundleArgs,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    cli.bundle.run()
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
