//! Default command: load the config and run every group.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use libutil_bundler::{pipeline, GroupReport};
use libutil_core::{paths::resolve, WriteResult};

/// Arguments for `file-bundler`.
#[derive(Args, Debug)]
pub struct BundleArgs {
    /// Path to the config file, relative to the current directory.
    #[arg(short, long, default_value = "./file-bundler.toml")]
    pub config: PathBuf,
}

impl BundleArgs {
    pub fn run(self) -> Result<()> {
        let cwd = std::env::current_dir().context("could not determine current directory")?;
        let config = resolve(&cwd, &self.config);
        let reports = pipeline::run_file(&config)
            .with_context(|| format!("bundling failed for {}", config.display()))?;

        if reports.is_empty() {
            println!("No groups configured in {}", config.display());
        }
        for report in &reports {
            print_report(report);
        }
        Ok(())
    }
}

fn print_report(report: &GroupReport) {
    println!("{}", format_report(report));
}

fn format_report(report: &GroupReport) -> String {
    let files = match report.files {
        1 => "1 file".to_string(),
        n => format!("{n} files"),
    };
    match &report.output {
        Some(WriteResult::Written { path }) => {
            format!("✎  {} ({files}) → {}", report.base, path.display())
        }
        Some(WriteResult::Unchanged { path }) => {
            format!("·  {} ({files}) → {} unchanged", report.base, path.display())
        }
        Some(WriteResult::Skipped { path }) => {
            format!("~  {} ({files}) → {} kept, overwrite disabled", report.base, path.display())
        }
        None => format!("·  {} ({files})", report.base),
    }
}
