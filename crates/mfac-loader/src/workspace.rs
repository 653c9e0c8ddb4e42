//! # Workspace
//!
//! The on-disk area every pipeline stage shares:
//!
//! ```text
//! <root>/schema/*.idl       copied schema sources
//! <root>/generated/*.gen    compiler output, one module per schema
//! ```
//!
//! The workspace only ever creates files and directories. Nothing here
//! deletes anything, so a workspace can be reopened later and loaded
//! again with [`Workspace::generated_modules`].

use std::fs;
use std::path::{Path, PathBuf};

use mfac_core::SCHEMA_EXTENSION;

use crate::error::FactoryError;

/// Subdirectory holding copied schema files.
pub const SCHEMA_DIR: &str = "schema";
/// Subdirectory holding generated modules.
pub const GENERATED_DIR: &str = "generated";
/// File extension of generated modules.
pub const MODULE_EXTENSION: &str = "gen";

/// The schema and generated-module directories under one root.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    schema_dir: PathBuf,
    module_dir: PathBuf,
}

impl Workspace {
    /// Open a workspace rooted at `root`, or at the system temporary
    /// directory when `root` is `None`, creating the `schema/` and
    /// `generated/` subdirectories if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::InvalidWorkspace`] if the root does not exist,
    /// is not a directory, or a subdirectory cannot be created.
    pub fn open(root: Option<&Path>) -> Result<Self, FactoryError> {
        let requested = root.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        let invalid = |reason: String| FactoryError::InvalidWorkspace {
            path: requested.display().to_string(),
            reason,
        };

        if !requested.is_dir() {
            let reason = if requested.exists() {
                "not a directory"
            } else {
                "directory does not exist"
            };
            return Err(invalid(reason.to_string()));
        }
        let root = fs::canonicalize(&requested)
            .map_err(|e| invalid(format!("cannot resolve path: {e}")))?;

        let schema_dir = root.join(SCHEMA_DIR);
        let module_dir = root.join(GENERATED_DIR);
        for dir in [&schema_dir, &module_dir] {
            fs::create_dir_all(dir)
                .map_err(|e| invalid(format!("cannot create {}: {e}", dir.display())))?;
        }

        tracing::debug!(root = %root.display(), "opened workspace");
        Ok(Self {
            root,
            schema_dir,
            module_dir,
        })
    }

    /// Canonical workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding copied schema files.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Directory holding generated modules.
    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    /// Copy a schema file into the schema directory, silently replacing a
    /// previously staged file of the same name. Returns the staged path.
    ///
    /// Staging a file that already lives at its staged location is a no-op.
    pub fn stage(&self, source: &Path) -> Result<PathBuf, FactoryError> {
        let staging = |e: std::io::Error| FactoryError::Staging {
            path: source.display().to_string(),
            source: e,
        };
        let name = source.file_name().ok_or_else(|| {
            staging(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no file name",
            ))
        })?;
        let target = self.schema_dir.join(name);

        if is_same_file(source, &target) {
            return Ok(target);
        }
        fs::copy(source, &target).map_err(staging)?;
        tracing::debug!(schema = %target.display(), "staged schema file");
        Ok(target)
    }

    /// Every generated module currently on disk, sorted by file name.
    pub fn generated_modules(&self) -> Result<Vec<PathBuf>, FactoryError> {
        list_files(&self.module_dir, MODULE_EXTENSION)
    }

    /// Every staged schema file, sorted by file name.
    pub fn staged_schemas(&self) -> Result<Vec<PathBuf>, FactoryError> {
        list_files(&self.schema_dir, SCHEMA_EXTENSION)
    }
}

/// Regular files directly inside `dir` carrying `extension`, sorted.
pub(crate) fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, FactoryError> {
    let entries = fs::read_dir(dir).map_err(|e| FactoryError::ReadDir {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
