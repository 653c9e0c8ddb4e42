//! # mfac-loader — Compile/Load Pipeline
//!
//! Turns schema files into message types at run time. The [`Factory`]
//! facade drives every stage:
//!
//! ```text
//! schema file ──stage──▶ <ws>/schema/x.idl
//!             ──compile──▶ <ws>/generated/x_idl.gen
//!             ──rewrite imports──▶ package-relative imports
//!             ──load (retry queue)──▶ LoadedModule
//!             ──extract──▶ MessageRegistry[key] = MessageType
//! ```
//!
//! ## Modules
//!
//! - [`workspace`] — the `schema/` and `generated/` directories.
//! - [`compiler`] — the [`SchemaCompiler`] seam and the subprocess
//!   implementation.
//! - [`rewrite`] — marker-delimited absolute → relative import rewriting.
//! - [`module`] — generated-module interpreter and [`ResolutionContext`].
//! - [`loader`] — requeue-on-missing-dependency load pass with
//!   no-progress detection.
//! - [`registry`] — key → message type index under a [`NamingPolicy`].
//! - [`factory`] — the facade and its [`AddReport`].
//! - [`config`] — YAML-readable [`FactoryConfig`].
//!
//! ## Crate Policy
//!
//! - Depends only on `mfac-core` internally.
//! - No process-wide state: each load pass owns its resolution context.
//! - A bad schema file never aborts a batch; failures are reported per
//!   file and per module.
//!
//! [`NamingPolicy`]: mfac_core::NamingPolicy

pub mod compiler;
pub mod config;
pub mod error;
pub mod factory;
pub mod loader;
pub mod module;
pub mod registry;
pub mod rewrite;
pub mod workspace;

// Re-export primary types for ergonomic imports.
pub use compiler::{ProcessCompiler, SchemaCompiler};
pub use config::{CompilerConfig, FactoryConfig};
pub use error::{CompileError, FactoryError, LoadError, PrototypeError};
pub use factory::{AddReport, Factory, FileOutcome};
pub use loader::{LoadPass, ModuleFailure};
pub use module::{Binding, LoadedModule, ResolutionContext};
pub use registry::MessageRegistry;
pub use workspace::Workspace;
