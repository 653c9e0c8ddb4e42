//! # Factory
//!
//! The public facade. Adding schema files runs the whole pipeline:
//!
//! ```text
//! stage every file → compile → rewrite imports   (per file)
//! load every generated module → rebuild registry   (once per call)
//! ```
//!
//! A file that fails any per-file step is reported in the returned
//! [`AddReport`] and the batch continues. The load pass always covers the
//! entire module directory, so types added by earlier calls stay
//! available and a dependency added later lets a previously stuck module
//! load.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mfac_core::{Message, MessageType, NamingPolicy, SCHEMA_EXTENSION};

use crate::compiler::{self, ProcessCompiler, SchemaCompiler};
use crate::config::FactoryConfig;
use crate::error::{CompileError, FactoryError, PrototypeError};
use crate::loader::{self, ModuleFailure};
use crate::registry::MessageRegistry;
use crate::rewrite;
use crate::workspace::{self, Workspace};

/// Suffix of a generated module moved aside while its schema recompiles.
const PREVIOUS_SUFFIX: &str = ".prev";

/// Outcome of adding one schema file.
#[derive(Debug)]
pub struct FileOutcome {
    /// The schema path as given by the caller.
    pub schema: PathBuf,
    /// The generated module's name, or why compiling the file failed.
    ///
    /// An `Err` does not mean the file contributes no types: a module kept
    /// from an earlier compile, or output the rewriter rejected as
    /// malformed, stays in the module directory and is loaded like any
    /// other.
    pub status: Result<String, FactoryError>,
}

impl FileOutcome {
    /// Whether the file compiled and its module loaded.
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

/// Result of one add call.
#[derive(Debug, Default)]
pub struct AddReport {
    /// One entry per schema file, in the order processed.
    pub outcomes: Vec<FileOutcome>,
    /// Every module that failed in the load pass, including modules from
    /// earlier calls.
    pub load_failures: Vec<ModuleFailure>,
}

impl AddReport {
    /// Whether every file was added and every module loaded.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(FileOutcome::is_ok) && self.load_failures.is_empty()
    }

    /// Outcomes of files that failed.
    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// Names of the modules generated by this call.
    pub fn modules(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| o.status.as_deref().ok())
            .collect()
    }

    /// Convert into the first failure, or the generated module names if
    /// the report is complete.
    pub fn into_result(mut self) -> Result<Vec<String>, FactoryError> {
        if let Some(index) = self.outcomes.iter().position(|o| !o.is_ok()) {
            if let Err(e) = self.outcomes.swap_remove(index).status {
                return Err(e);
            }
        }
        if let Some(failure) = self.load_failures.into_iter().next() {
            return Err(FactoryError::Load(failure.error));
        }
        Ok(self
            .outcomes
            .into_iter()
            .filter_map(|o| o.status.ok())
            .collect())
    }
}

/// Compiles schema files at run time and hands out message types and
/// default-constructed prototypes by key.
pub struct Factory {
    workspace: Workspace,
    compiler: Box<dyn SchemaCompiler>,
    registry: MessageRegistry,
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("workspace", &self.workspace)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Factory {
    /// Build a factory that runs the configured external compiler.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::InvalidWorkspace`] if the workspace root is
    /// unusable.
    pub fn new(config: &FactoryConfig) -> Result<Self, FactoryError> {
        Self::with_compiler(
            config.workspace.as_deref(),
            config.naming,
            ProcessCompiler::new(config.compiler.clone()),
        )
    }

    /// Build a factory around any [`SchemaCompiler`].
    pub fn with_compiler(
        root: Option<&Path>,
        naming: NamingPolicy,
        compiler: impl SchemaCompiler + 'static,
    ) -> Result<Self, FactoryError> {
        let workspace = Workspace::open(root)?;
        tracing::info!(root = %workspace.root().display(), naming = %naming, "factory ready");
        Ok(Self {
            workspace,
            compiler: Box::new(compiler),
            registry: MessageRegistry::new(naming),
        })
    }

    /// The workspace this factory compiles into.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// The current key → message type index.
    pub fn registry(&self) -> &MessageRegistry {
        &self.registry
    }

    /// The naming policy keys are built with.
    pub fn naming(&self) -> NamingPolicy {
        self.registry.policy()
    }

    /// Add one schema file.
    pub fn add_file(&mut self, path: impl AsRef<Path>) -> Result<AddReport, FactoryError> {
        self.add_files([path])
    }

    /// Add several schema files, then run one load pass.
    ///
    /// # Errors
    ///
    /// Per-file failures are reported in the [`AddReport`]. Only an
    /// unreadable module directory fails the call.
    pub fn add_files<I, P>(&mut self, paths: I) -> Result<AddReport, FactoryError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        // Stage the whole batch first so the compiler can resolve imports
        // between files of the same batch in any order.
        let staged: Vec<(PathBuf, Result<PathBuf, FactoryError>)> = paths
            .into_iter()
            .map(|path| {
                let path = path.as_ref();
                (path.to_path_buf(), self.workspace.stage(path))
            })
            .collect();

        let prepared: Vec<(PathBuf, Result<String, FactoryError>)> = staged
            .into_iter()
            .map(|(schema, staged)| {
                let status = staged.and_then(|staged| self.compile(&staged));
                if let Err(e) = &status {
                    tracing::warn!(schema = %schema.display(), error = %e, "skipping schema file");
                }
                (schema, status)
            })
            .collect();

        let pass = loader::load_workspace(&self.workspace)?;
        self.registry.rebuild(&pass.loaded);

        let outcomes = prepared
            .into_iter()
            .map(|(schema, status)| {
                let status = status.and_then(|module| match pass.failure_for(&module) {
                    Some(failure) => Err(FactoryError::Load(failure.error.clone())),
                    None => Ok(module),
                });
                FileOutcome { schema, status }
            })
            .collect();

        Ok(AddReport {
            outcomes,
            load_failures: pass.failures,
        })
    }

    /// Add every regular `*.idl` file directly inside `dir`, in file-name
    /// order. Subdirectories and other files are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::ReadDir`] if `dir` cannot be listed.
    pub fn add_directory(&mut self, dir: impl AsRef<Path>) -> Result<AddReport, FactoryError> {
        let schemas = workspace::list_files(dir.as_ref(), SCHEMA_EXTENSION)?;
        tracing::debug!(dir = %dir.as_ref().display(), count = schemas.len(), "adding schema directory");
        self.add_files(schemas)
    }

    /// Rebuild the registry from whatever is already in the module
    /// directory, without compiling anything.
    pub fn refresh(&mut self) -> Result<Vec<ModuleFailure>, FactoryError> {
        let pass = loader::load_workspace(&self.workspace)?;
        self.registry.rebuild(&pass.loaded);
        Ok(pass.failures)
    }

    /// The message type registered under `key`.
    pub fn message_class(&self, key: &str) -> Option<Arc<MessageType>> {
        self.registry.get(key).cloned()
    }

    /// A default-constructed instance of the type registered under `key`.
    ///
    /// Returns `None` both for unknown keys and for types that cannot be
    /// default-constructed; use [`Factory::try_prototype`] to tell them apart.
    pub fn prototype(&self, key: &str) -> Option<Message> {
        self.try_prototype(key).ok()
    }

    /// A default-constructed instance of the type registered under `key`.
    pub fn try_prototype(&self, key: &str) -> Result<Message, PrototypeError> {
        let message_type = self
            .registry
            .get(key)
            .ok_or_else(|| PrototypeError::UnknownKey(key.to_string()))?;
        Message::new(Arc::clone(message_type)).map_err(|source| PrototypeError::Construction {
            key: key.to_string(),
            source,
        })
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.registry.keys()
    }

    // set aside → compile → check output → rewrite. Returns the module name.
    fn compile(&self, staged: &Path) -> Result<String, FactoryError> {
        let expected = compiler::module_path(staged, &self.workspace)?;
        let previous = set_aside(&expected)?;
        let result = self.compile_fresh(staged);
        if let Some(backup) = previous {
            settle_previous(&backup, &expected, result.is_ok());
        }
        result
    }

    fn compile_fresh(&self, staged: &Path) -> Result<String, FactoryError> {
        let module_path = self.compiler.compile(staged, &self.workspace)?;
        if !module_path.is_file() {
            return Err(CompileError::MissingOutput {
                schema: staged.display().to_string(),
                module: module_path.display().to_string(),
            }
            .into());
        }
        rewrite::rewrite_imports(&module_path)?;
        // The loader names modules by file stem.
        let module = module_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| CompileError::InvalidSchemaPath {
                schema: staged.display().to_string(),
            })?;
        tracing::debug!(schema = %staged.display(), module = %module, "schema compiled");
        Ok(module.to_string())
    }
}

// Rewriting runs once per compiler output, so a module left by an earlier
// compile must never reach the rewriter. It is moved aside for the duration
// of the compile.
fn set_aside(module: &Path) -> Result<Option<PathBuf>, FactoryError> {
    if !module.is_file() {
        return Ok(None);
    }
    let mut backup = module.as_os_str().to_owned();
    backup.push(PREVIOUS_SUFFIX);
    let backup = PathBuf::from(backup);
    std::fs::rename(module, &backup)?;
    Ok(Some(backup))
}

// Drop the previous module once the compiler wrote anything in its place,
// otherwise put it back.
fn settle_previous(backup: &Path, module: &Path, compiled: bool) {
    let settled = if compiled || module.is_file() {
        std::fs::remove_file(backup)
    } else {
        std::fs::rename(backup, module)
    };
    if let Err(e) = settled {
        tracing::warn!(
            module = %module.display(),
            backup = %backup.display(),
            error = %e,
            "could not settle previous module"
        );
    }
}
