//! # mfac-cli — Message Factory Command-Line Interface
//!
//! Provides the `mfac` binary, a thin front-end over
//! [`mfac_loader::Factory`].
//!
//! ## Subcommands
//!
//! - `mfac add <PATH>...` — stage, compile, and load schema files or
//!   directories of schema files.
//! - `mfac list` — load the existing workspace and print registered keys.
//! - `mfac show <KEY>` — print a default-constructed prototype as JSON.
//! - `mfac describe <KEY>` — print a message type descriptor as YAML.
//!
//! ```bash
//! mfac --workspace /var/tmp/mfac add schemas/
//! mfac --workspace /var/tmp/mfac --naming file show person --indent 2
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers live in library modules
//!   so they can be tested against any [`SchemaCompiler`].
//! - Handlers write to a caller-supplied writer and return an exit code.
//!
//! [`SchemaCompiler`]: mfac_loader::SchemaCompiler

pub mod add;
pub mod inspect;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use mfac_core::NamingPolicy;
use mfac_loader::{Factory, FactoryConfig};

/// Options shared by every subcommand. Flags override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// YAML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace root (defaults to the system temporary directory).
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Registry key policy: `message` or `file`.
    #[arg(long, global = true)]
    pub naming: Option<NamingPolicy>,

    /// External schema compiler program.
    #[arg(long, global = true)]
    pub compiler: Option<PathBuf>,
}

/// Merge the config file (if any) with command-line overrides.
pub fn resolve_config(options: &GlobalOptions) -> Result<FactoryConfig> {
    let mut config = match &options.config {
        Some(path) => FactoryConfig::from_file(path)?,
        None => FactoryConfig::default(),
    };
    if let Some(workspace) = &options.workspace {
        config.workspace = Some(workspace.clone());
    }
    if let Some(naming) = options.naming {
        config.naming = naming;
    }
    if let Some(program) = &options.compiler {
        config.compiler.program = program.clone();
    }
    Ok(config)
}

/// Build the factory the subcommands operate on.
pub fn build_factory(options: &GlobalOptions) -> Result<Factory> {
    let config = resolve_config(options)?;
    tracing::debug!(?config, "resolved configuration");
    Factory::new(&config).context("failed to open workspace")
}
