//! # Schema Compiler
//!
//! Turns one staged schema file into one generated module by running the
//! external compiler. The compiler is opaque: it is handed the schema
//! directory (for resolving its own imports), the module directory (for
//! output), and the single schema to compile.
//!
//! The generated module's path is a pure function of the schema name:
//! `person.idl` becomes `generated/person_idl.gen`, whose module name is
//! `person_idl`. [`SchemaCompiler::compile`] reports launch failures and
//! non-zero exits but does not check that the output exists; the factory
//! does that before rewriting.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::workspace::{Workspace, MODULE_EXTENSION};

/// Suffix appended to a schema stem to form its module name.
pub const MODULE_NAME_SUFFIX: &str = "_idl";

/// Module name generated for a schema file, e.g. `person.idl` → `person_idl`.
pub fn module_name(schema: &Path) -> Option<String> {
    let stem = schema.file_stem()?.to_str()?;
    Some(format!("{stem}{MODULE_NAME_SUFFIX}"))
}

/// Path of the module the compiler will emit for `schema`.
pub fn module_path(schema: &Path, workspace: &Workspace) -> Result<PathBuf, CompileError> {
    let name = module_name(schema).ok_or_else(|| CompileError::InvalidSchemaPath {
        schema: schema.display().to_string(),
    })?;
    Ok(workspace.module_dir().join(format!("{name}.{MODULE_EXTENSION}")))
}

/// Something that compiles a staged schema file into a generated module.
pub trait SchemaCompiler {
    /// Compile `schema` (a file inside `workspace.schema_dir()`) and return
    /// the path the generated module is expected at.
    fn compile(&self, schema: &Path, workspace: &Workspace) -> Result<PathBuf, CompileError>;
}

/// Runs the external compiler as a blocking subprocess.
#[derive(Debug, Clone, Default)]
pub struct ProcessCompiler {
    config: CompilerConfig,
}

impl ProcessCompiler {
    /// Wrap a compiler configuration.
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    /// The program and flags this compiler runs with.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    fn command(&self, schema: &Path, workspace: &Workspace) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .arg(&self.config.include_flag)
            .arg(workspace.schema_dir())
            .arg(&self.config.output_flag)
            .arg(workspace.module_dir())
            .arg(schema);
        command
    }
}

impl SchemaCompiler for ProcessCompiler {
    fn compile(&self, schema: &Path, workspace: &Workspace) -> Result<PathBuf, CompileError> {
        let expected = module_path(schema, workspace)?;
        tracing::debug!(
            program = %self.config.program.display(),
            schema = %schema.display(),
            "invoking schema compiler"
        );

        let output = self
            .command(schema, workspace)
            .output()
            .map_err(|e| CompileError::Spawn {
                program: self.config.program.display().to_string(),
                schema: schema.display().to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(CompileError::Failed {
                schema: schema.display().to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(expected)
    }
}
