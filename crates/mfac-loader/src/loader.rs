//! # Dependency Loader
//!
//! Loads every generated module in the workspace, in whatever order the
//! compiler happened to emit them. Instead of computing a topological
//! order up front, the loader keeps a FIFO work queue: a module whose
//! relative import names a module not yet loaded in this pass goes to the
//! back of the queue and is retried after the others.
//!
//! ## Termination
//!
//! The loader counts consecutive requeues since the last module loaded.
//! Once that count reaches the queue length, every remaining module has
//! been retried against the same set of loaded modules and none can make
//! progress; each fails with [`LoadError::UnresolvedDependency`] naming
//! the import it was waiting for. Missing dependencies and import cycles
//! therefore end the pass instead of spinning forever.
//!
//! ## Isolation
//!
//! Modules resolve each other through a [`ResolutionContext`] local to one
//! pass. Nothing outlives the pass except the loaded modules handed back
//! in [`LoadPass::loaded`].

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{FactoryError, LoadError};
use crate::module::{self, LoadedModule, ResolutionContext};
use crate::workspace::Workspace;

/// A module that could not be loaded in a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFailure {
    /// Module name (generated file stem).
    pub module: String,
    /// Generated module path.
    pub path: PathBuf,
    /// Why it failed.
    pub error: LoadError,
}

/// Outcome of one load pass.
#[derive(Debug, Default)]
pub struct LoadPass {
    /// Successfully loaded modules, in load order.
    pub loaded: Vec<Arc<LoadedModule>>,
    /// Modules that failed, in the order they were given up on.
    pub failures: Vec<ModuleFailure>,
}

impl LoadPass {
    /// The failure recorded for `module`, if it failed.
    pub fn failure_for(&self, module: &str) -> Option<&ModuleFailure> {
        self.failures.iter().find(|f| f.module == module)
    }

    /// Names of modules that ended the pass waiting on a dependency.
    pub fn stuck(&self) -> Vec<&str> {
        self.failures
            .iter()
            .filter(|f| matches!(f.error, LoadError::UnresolvedDependency { .. }))
            .map(|f| f.module.as_str())
            .collect()
    }

    /// Names of loaded modules, in load order.
    pub fn loaded_names(&self) -> Vec<&str> {
        self.loaded.iter().map(|m| m.name()).collect()
    }

    /// Whether every module loaded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Pending {
    module: String,
    path: PathBuf,
    source: String,
    waiting_on: Option<String>,
}

/// Load every generated module currently in the workspace.
///
/// # Errors
///
/// Only fails if the module directory cannot be listed; individual module
/// failures are recorded in the returned [`LoadPass`].
pub fn load_workspace(workspace: &Workspace) -> Result<LoadPass, FactoryError> {
    let paths = workspace.generated_modules()?;
    Ok(load_modules(&paths))
}

/// Load the given generated modules as one package.
///
/// Module names are the files' stems. The queue starts in the order given.
pub fn load_modules(paths: &[PathBuf]) -> LoadPass {
    let mut pass = LoadPass::default();
    let mut queue = VecDeque::with_capacity(paths.len());

    for path in paths {
        let Some(module) = module_name_of(path) else {
            tracing::warn!(path = %path.display(), "skipping generated module without a usable name");
            continue;
        };
        match std::fs::read_to_string(path) {
            Ok(source) => queue.push_back(Pending {
                module,
                path: path.clone(),
                source,
                waiting_on: None,
            }),
            Err(e) => record_failure(
                &mut pass,
                module,
                path.clone(),
                LoadError::Read {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                },
            ),
        }
    }

    let mut context = ResolutionContext::new();
    let mut stalled = 0usize;
    while let Some(mut pending) = queue.pop_front() {
        match module::execute(&pending.module, &pending.source, &context) {
            Ok(loaded) => {
                tracing::debug!(module = %pending.module, "loaded generated module");
                let loaded = Arc::new(loaded);
                context.insert(Arc::clone(&loaded));
                pass.loaded.push(loaded);
                stalled = 0;
            }
            Err(LoadError::MissingDependency { dependency, .. }) => {
                tracing::debug!(
                    module = %pending.module,
                    dependency = %dependency,
                    "dependency not loaded yet; requeueing"
                );
                pending.waiting_on = Some(dependency);
                queue.push_back(pending);
                stalled += 1;
                if stalled >= queue.len() {
                    for stuck in queue.drain(..) {
                        let error = LoadError::UnresolvedDependency {
                            module: stuck.module.clone(),
                            dependency: stuck.waiting_on.unwrap_or_default(),
                        };
                        record_failure(&mut pass, stuck.module, stuck.path, error);
                    }
                }
            }
            Err(error) => record_failure(&mut pass, pending.module, pending.path, error),
        }
    }

    tracing::info!(
        loaded = pass.loaded.len(),
        failed = pass.failures.len(),
        "load pass complete"
    );
    pass
}

fn record_failure(pass: &mut LoadPass, module: String, path: PathBuf, error: LoadError) {
    tracing::warn!(module = %module, error = %error, "generated module failed to load");
    pass.failures.push(ModuleFailure {
        module,
        path,
        error,
    });
}

fn module_name_of(path: &Path) -> Option<String> {
    path.file_stem()?.to_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_text(file: &str, imports: &[&str], body: &str) -> String {
        let mut text = format!("module \"{file}\"\n# @@insertion_point(imports)\n");
        for import in imports {
            text.push_str(&format!("import .{import}\n"));
        }
        text.push_str(body);
        text
    }

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(format!("{name}.gen"));
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_loads_in_dependency_order_regardless_of_queue_order() {
        let dir = tempfile::tempdir().unwrap();
        // c imports b imports a, queued as [c, b, a].
        let c = write(dir.path(), "c_idl", &module_text("c.idl", &["b_idl"], "message C {\n  singular b_idl.B b = 1\n}\n"));
        let b = write(dir.path(), "b_idl", &module_text("b.idl", &["a_idl"], "message B {\n  singular a_idl.A a = 1\n}\n"));
        let a = write(dir.path(), "a_idl", &module_text("a.idl", &[], "message A {\n  singular int32 x = 1\n}\n"));

        let pass = load_modules(&[c, b, a]);
        assert!(pass.is_clean(), "failures: {:?}", pass.failures);
        assert_eq!(pass.loaded_names(), ["a_idl", "b_idl", "c_idl"]);
    }

    #[test]
    fn test_missing_dependency_terminates() {
        let dir = tempfile::tempdir().unwrap();
        let orphan = write(dir.path(), "orphan_idl", &module_text("orphan.idl", &["ghost_idl"], ""));
        let fine = write(dir.path(), "fine_idl", &module_text("fine.idl", &[], "message Fine {\n}\n"));

        let pass = load_modules(&[orphan, fine]);
        assert_eq!(pass.loaded_names(), ["fine_idl"]);
        assert_eq!(pass.stuck(), ["orphan_idl"]);
        assert_eq!(
            pass.failure_for("orphan_idl").unwrap().error,
            LoadError::UnresolvedDependency {
                module: "orphan_idl".to_string(),
                dependency: "ghost_idl".to_string(),
            }
        );
    }

    #[test]
    fn test_cycle_terminates_and_spares_unrelated_modules() {
        let dir = tempfile::tempdir().unwrap();
        let x = write(dir.path(), "x_idl", &module_text("x.idl", &["y_idl"], ""));
        let y = write(dir.path(), "y_idl", &module_text("y.idl", &["x_idl"], ""));
        let z = write(dir.path(), "z_idl", &module_text("z.idl", &[], "message Z {\n}\n"));

        let pass = load_modules(&[x, y, z]);
        assert_eq!(pass.loaded_names(), ["z_idl"]);
        let mut stuck = pass.stuck();
        stuck.sort();
        assert_eq!(stuck, ["x_idl", "y_idl"]);
    }

    #[test]
    fn test_dependency_on_broken_module_is_unresolved() {
        let dir = tempfile::tempdir().unwrap();
        let user = write(dir.path(), "user_idl", &module_text("user.idl", &["broken_idl"], ""));
        let broken = write(dir.path(), "broken_idl", "module \"broken.idl\"\nthis is not a statement\n");

        let pass = load_modules(&[user, broken]);
        assert!(pass.loaded.is_empty());
        assert!(matches!(
            pass.failure_for("broken_idl").unwrap().error,
            LoadError::Syntax { .. }
        ));
        assert_eq!(pass.stuck(), ["user_idl"]);
    }

    #[test]
    fn test_unreadable_module_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let pass = load_modules(&[dir.path().join("gone_idl.gen")]);
        assert!(pass.loaded.is_empty());
        assert!(matches!(
            pass.failure_for("gone_idl").unwrap().error,
            LoadError::Read { .. }
        ));
    }

    #[test]
    fn test_empty_input() {
        let pass = load_modules(&[]);
        assert!(pass.is_clean());
        assert!(pass.loaded.is_empty());
    }

    #[test]
    fn test_load_workspace_scans_module_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::open(Some(dir.path())).unwrap();
        write(ws.module_dir(), "b_idl", &module_text("b.idl", &["a_idl"], ""));
        write(ws.module_dir(), "a_idl", &module_text("a.idl", &[], ""));
        std::fs::write(ws.module_dir().join("README.txt"), "ignored").unwrap();

        let pass = load_workspace(&ws).unwrap();
        assert!(pass.is_clean());
        assert_eq!(pass.loaded_names(), ["a_idl", "b_idl"]);
    }
}
