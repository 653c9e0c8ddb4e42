//! # Inspection Subcommands
//!
//! `list`, `show`, and `describe` never compile anything. Each one first
//! reloads whatever generated modules are already in the workspace.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use mfac_core::DEFAULT_INDENT;
use mfac_loader::Factory;

/// Arguments for the show subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Registry key of the message type.
    pub key: String,

    /// Spaces per indentation level.
    #[arg(long, default_value_t = DEFAULT_INDENT)]
    pub indent: usize,
}

/// Arguments for the describe subcommand.
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Registry key of the message type.
    pub key: String,
}

fn reload(factory: &mut Factory) -> Result<()> {
    let failures = factory.refresh().context("failed to load workspace")?;
    if !failures.is_empty() {
        tracing::warn!(count = failures.len(), "some generated modules failed to load");
    }
    Ok(())
}

/// Execute the list subcommand: one registered key per line.
pub fn run_list(factory: &mut Factory, out: &mut impl Write) -> Result<u8> {
    reload(factory)?;
    for key in factory.keys() {
        writeln!(out, "{key}")?;
    }
    Ok(0)
}

/// Execute the show subcommand: the prototype of a key as JSON.
pub fn run_show(args: &ShowArgs, factory: &mut Factory, out: &mut impl Write) -> Result<u8> {
    reload(factory)?;
    let prototype = factory.try_prototype(&args.key)?;
    let json = mfac_core::to_json(&prototype, args.indent).context("failed to serialize prototype")?;
    writeln!(out, "{json}")?;
    Ok(0)
}

/// Execute the describe subcommand: the message type descriptor as YAML.
pub fn run_describe(args: &DescribeArgs, factory: &mut Factory, out: &mut impl Write) -> Result<u8> {
    reload(factory)?;
    let message_type = factory
        .message_class(&args.key)
        .with_context(|| format!("no message type registered under '{}'", args.key))?;
    let yaml = serde_yaml::to_string(message_type.as_ref()).context("failed to serialize descriptor")?;
    write!(out, "{yaml}")?;
    Ok(0)
}
