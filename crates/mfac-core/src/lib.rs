//! # mfac-core — Message Descriptor Model
//!
//! Leaf crate of the mfac workspace. Defines the types every other crate
//! shares: the descriptor model extracted from generated modules, the
//! dynamic message values used for prototypes, and the tree conversion
//! that flattens a message into nested mappings.
//!
//! ## Modules
//!
//! - [`descriptor`] — scalar kinds, labels, enum and message types, file
//!   descriptors, and the registry [`NamingPolicy`].
//! - [`message`] — [`Message`] instances with type-checked field writes.
//! - [`tree`] — message → `serde_json::Value` conversion and indented JSON.
//! - [`error`] — descriptor, value, and construction errors.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mfac-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Descriptor types derive `Serialize`/`Deserialize`.

pub mod descriptor;
pub mod error;
pub mod message;
pub mod tree;

// Re-export primary types for ergonomic imports.
pub use descriptor::{
    EnumType, EnumValue, FieldDescriptor, FieldKind, FileDescriptor, Label, MessageRef,
    MessageType, NamingPolicy, ScalarType, SCHEMA_EXTENSION,
};
pub use error::{ConstructionError, DescriptorError, ValueError};
pub use message::{FieldValue, Message, Value};
pub use tree::{to_json, to_tree, DEFAULT_INDENT};
