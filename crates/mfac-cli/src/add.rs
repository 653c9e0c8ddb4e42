//! # Add Subcommand
//!
//! Adds schema files and directories of schema files to the workspace,
//! then prints one line per schema file, every module that failed to load,
//! and the keys now registered.
//!
//! ```bash
//! mfac add person.idl address.idl
//! mfac add schemas/ --strict
//! ```

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mfac_loader::{AddReport, Factory};

/// Arguments for the add subcommand.
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Schema files or directories of schema files.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Exit with status 1 if any file or module failed.
    #[arg(long)]
    pub strict: bool,
}

/// Execute the add subcommand.
pub fn run_add(args: &AddArgs, factory: &mut Factory, out: &mut impl Write) -> Result<u8> {
    let (dirs, files): (Vec<&PathBuf>, Vec<&PathBuf>) =
        args.paths.iter().partition(|p| p.is_dir());

    let mut reports = Vec::new();
    if !files.is_empty() {
        reports.push(factory.add_files(&files).context("failed to add schema files")?);
    }
    for dir in dirs {
        let report = factory
            .add_directory(dir)
            .with_context(|| format!("failed to add directory {}", dir.display()))?;
        reports.push(report);
    }

    let complete = print_reports(&reports, out)?;
    let keys = factory.keys();
    writeln!(out, "Registered keys ({}):", keys.len())?;
    for key in keys {
        writeln!(out, "  {key}")?;
    }

    Ok(u8::from(args.strict && !complete))
}

// Every load pass covers the whole workspace, so only the last report's
// module failures are current.
fn print_reports(reports: &[AddReport], out: &mut impl Write) -> Result<bool> {
    let mut complete = true;
    for outcome in reports.iter().flat_map(|r| &r.outcomes) {
        match &outcome.status {
            Ok(module) => writeln!(out, "  ok      {} -> {module}", outcome.schema.display())?,
            Err(e) => {
                complete = false;
                writeln!(out, "  FAILED  {}: {e}", outcome.schema.display())?;
            }
        }
    }
    if let Some(last) = reports.last() {
        for failure in &last.load_failures {
            complete = false;
            writeln!(out, "  module  {}: {}", failure.module, failure.error)?;
        }
    }
    Ok(complete)
}
