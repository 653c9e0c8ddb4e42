//! # Factory Configuration
//!
//! [`FactoryConfig`] collects everything needed to build a
//! [`Factory`](crate::Factory): where the workspace lives, how the registry
//! is keyed, and how to invoke the external schema compiler. It can be
//! read from YAML:
//!
//! ```yaml
//! workspace: /var/tmp/mfac
//! naming: file
//! compiler:
//!   program: idlc
//!   include_flag: --include
//!   output_flag: --out
//!   args: ["--strict"]
//! ```
//!
//! Every key is optional; missing keys take the [`Default`] values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mfac_core::NamingPolicy;

use crate::error::FactoryError;

/// Compiler program used when none is configured.
pub const DEFAULT_COMPILER: &str = "idlc";

/// Top-level factory configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactoryConfig {
    /// Workspace root. `None` selects the system temporary directory.
    pub workspace: Option<PathBuf>,
    /// Registry key policy.
    pub naming: NamingPolicy,
    /// External compiler invocation.
    pub compiler: CompilerConfig,
}

/// How to invoke the external schema compiler.
///
/// The compiler is run as
/// `<program> <args>... <include_flag> <schema_dir> <output_flag> <module_dir> <schema>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Program name or path.
    pub program: PathBuf,
    /// Flag introducing the import search directory.
    pub include_flag: String,
    /// Flag introducing the output directory.
    pub output_flag: String,
    /// Extra arguments placed before the standard ones.
    pub args: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_COMPILER),
            include_flag: "--include".to_string(),
            output_flag: "--out".to_string(),
            args: Vec::new(),
        }
    }
}

impl FactoryConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Read and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Config`] if the file cannot be read or is not
    /// a valid configuration.
    pub fn from_file(path: &Path) -> Result<Self, FactoryError> {
        let config_error = |reason: String| FactoryError::Config {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error(format!("cannot read file: {e}")))?;
        Self::from_yaml_str(&content).map_err(|e| config_error(format!("invalid YAML: {e}")))
    }
}
