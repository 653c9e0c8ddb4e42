//! # Error Types — Compile/Load Pipeline Errors
//!
//! Every failure the pipeline can hit, from workspace setup through
//! compilation, import rewriting, module execution, and prototype
//! construction. Per-file and per-module failures are collected into
//! reports rather than aborting a batch; only [`FactoryError`] values
//! that stop a whole pass are returned as `Err` from the factory.

use std::io;

use thiserror::Error;

use mfac_core::ConstructionError;

/// Top-level error for the factory and its components.
#[derive(Error, Debug)]
pub enum FactoryError {
    /// The workspace root is missing, not a directory, or its
    /// subdirectories cannot be created.
    #[error("invalid workspace '{path}': {reason}")]
    InvalidWorkspace {
        /// Requested workspace root.
        path: String,
        /// Reason the workspace is unusable.
        reason: String,
    },

    /// A schema file could not be copied into the workspace.
    #[error("cannot stage schema '{path}': {source}")]
    Staging {
        /// Source schema path.
        path: String,
        /// Underlying copy failure.
        #[source]
        source: io::Error,
    },

    /// The external compiler failed for one schema file.
    #[error("compile failure: {0}")]
    CompileFailure(#[from] CompileError),

    /// A generated module does not have the shape the rewriter expects.
    #[error("malformed generated module '{path}': {reason}")]
    MalformedGeneratedModule {
        /// Generated module path.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A generated module could not be loaded.
    #[error("load failure: {0}")]
    Load(#[from] LoadError),

    /// A directory could not be listed.
    #[error("cannot read directory '{path}': {source}")]
    ReadDir {
        /// Directory path.
        path: String,
        /// Underlying listing failure.
        #[source]
        source: io::Error,
    },

    /// A configuration file could not be read or parsed.
    #[error("invalid configuration '{path}': {reason}")]
    Config {
        /// Configuration file path.
        path: String,
        /// Reason it was rejected.
        reason: String,
    },

    /// IO error outside the cases above.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Failure compiling one schema file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// The compiler process could not be started.
    #[error("cannot launch compiler '{program}' for '{schema}': {reason}")]
    Spawn {
        /// Compiler program.
        program: String,
        /// Schema being compiled.
        schema: String,
        /// OS-level reason.
        reason: String,
    },

    /// The compiler exited unsuccessfully.
    #[error("compiler exited with {status} for '{schema}': {stderr}")]
    Failed {
        /// Schema being compiled.
        schema: String,
        /// Exit status, as displayed by the OS.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The compiler reported success but the expected module is absent.
    #[error("compiler produced no output for '{schema}' (expected '{module}')")]
    MissingOutput {
        /// Schema being compiled.
        schema: String,
        /// Expected generated module path.
        module: String,
    },

    /// The schema path has no usable file stem.
    #[error("schema path '{schema}' has no file name")]
    InvalidSchemaPath {
        /// Offending path.
        schema: String,
    },
}

/// Failure executing one generated module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A relative import names a module not yet loaded in this pass.
    /// The loader requeues the module; this never reaches callers.
    #[error("module '{module}' imports '{dependency}', which is not loaded yet")]
    MissingDependency {
        /// Importing module.
        module: String,
        /// Imported module.
        dependency: String,
    },

    /// A full rotation of the work queue made no progress; the module's
    /// dependency is absent or part of a cycle.
    #[error("module '{module}' depends on '{dependency}', which never became loadable")]
    UnresolvedDependency {
        /// Stuck module.
        module: String,
        /// The import it was waiting for.
        dependency: String,
    },

    /// A line could not be parsed.
    #[error("{module}:{line}: {reason}")]
    Syntax {
        /// Module being parsed.
        module: String,
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// A field refers to a type that is not bound.
    #[error("{module}:{line}: unknown type '{type_name}'")]
    UnknownType {
        /// Module being executed.
        module: String,
        /// 1-based line number.
        line: usize,
        /// The unresolved type reference.
        type_name: String,
    },

    /// An import was left absolute; only package-relative imports resolve.
    #[error("{module}:{line}: absolute import of '{import}' cannot be resolved")]
    AbsoluteImport {
        /// Module being executed.
        module: String,
        /// 1-based line number.
        line: usize,
        /// Imported module name.
        import: String,
    },

    /// The module never declares which schema file it came from.
    #[error("module '{module}' declares no file descriptor")]
    MissingDescriptor {
        /// Module being executed.
        module: String,
    },

    /// The module file could not be read.
    #[error("cannot read module '{path}': {reason}")]
    Read {
        /// Module path.
        path: String,
        /// OS-level reason.
        reason: String,
    },
}

impl LoadError {
    /// Whether the loader should retry the module later in the same pass.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }
}

/// Failure producing a prototype.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrototypeError {
    /// No message type is registered under the key.
    #[error("no message type registered under '{0}'")]
    UnknownKey(String),

    /// The type exists but cannot be default-constructed.
    #[error("cannot construct '{key}': {source}")]
    Construction {
        /// Registry key.
        key: String,
        /// Why construction failed.
        #[source]
        source: ConstructionError,
    },
}
