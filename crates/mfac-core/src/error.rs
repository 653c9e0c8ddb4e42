//! # Error Types — Descriptor and Value Errors
//!
//! Errors raised by the descriptor model and by dynamic message values.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Descriptor errors name the offending token so generated-module
//!   diagnostics can point at the exact declaration.
//! - Value errors name the message type and field that rejected the value.
//! - Construction errors are kept separate from lookup misses so callers
//!   can tell "no such type" apart from "type exists but has no default".

use thiserror::Error;

/// Error parsing a descriptor token (scalar keyword, label, naming policy).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    /// The token is not one of the recognised scalar keywords.
    #[error("unknown scalar type: {0:?}")]
    UnknownScalar(String),

    /// The token is neither `singular` nor `repeated`.
    #[error("unknown field label: {0:?}")]
    UnknownLabel(String),

    /// The token is neither `message` nor `file`.
    #[error("unknown naming policy: {0:?} (expected \"message\" or \"file\")")]
    UnknownNamingPolicy(String),
}

/// Error assigning a value to a field of a dynamic message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The message type declares no field with this name.
    #[error("message '{message}' has no field named '{field}'")]
    UnknownField {
        /// Declared name of the message type.
        message: String,
        /// Requested field name.
        field: String,
    },

    /// The value's kind does not match the field's declared kind.
    #[error("field '{message}.{field}' expects {expected}, got {actual}")]
    TypeMismatch {
        /// Declared name of the message type.
        message: String,
        /// Field name.
        field: String,
        /// Human-readable expected kind.
        expected: String,
        /// Human-readable actual kind.
        actual: String,
    },

    /// A singular operation was used on a repeated field, or vice versa.
    #[error("field '{message}.{field}' is {label}")]
    LabelMismatch {
        /// Declared name of the message type.
        message: String,
        /// Field name.
        field: String,
        /// The field's actual label.
        label: String,
    },
}

/// Error default-constructing a message instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    /// An enum-typed field refers to an enum with no values, so no default exists.
    #[error("field '{message}.{field}' has enum type '{enum_name}' which declares no values")]
    EmptyEnum {
        /// Declared name of the message type.
        message: String,
        /// Field name.
        field: String,
        /// Declared name of the empty enum.
        enum_name: String,
    },
}
