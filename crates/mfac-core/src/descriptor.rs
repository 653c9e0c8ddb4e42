//! # Message Descriptors
//!
//! The type-level model extracted from generated modules: scalar kinds,
//! field labels, enum and message types, and the per-file descriptor that
//! names the schema a module was generated from.
//!
//! Descriptors are immutable once built. Message types are shared as
//! `Arc<MessageType>` by the registry and by every instance created from
//! them. Nested-message fields refer to their target by name and origin
//! file ([`MessageRef`]) rather than by pointer, so self-referential and
//! cross-file types need no reference cycles.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// File extension carried by schema (interface-definition) files.
pub const SCHEMA_EXTENSION: &str = "idl";

/// Scalar field kinds understood by the generated-module format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

impl ScalarType {
    /// Returns every scalar kind in canonical order.
    pub fn all_scalars() -> &'static [ScalarType] {
        &[
            Self::Double,
            Self::Float,
            Self::Int32,
            Self::Int64,
            Self::Uint32,
            Self::Uint64,
            Self::Sint32,
            Self::Sint64,
            Self::Fixed32,
            Self::Fixed64,
            Self::Sfixed32,
            Self::Sfixed64,
            Self::Bool,
            Self::String,
            Self::Bytes,
        ]
    }

    /// Returns the keyword used for this scalar in generated modules.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::Float => "float",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Fixed32 => "fixed32",
            Self::Fixed64 => "fixed64",
            Self::Sfixed32 => "sfixed32",
            Self::Sfixed64 => "sfixed64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScalarType {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all_scalars()
            .iter()
            .copied()
            .find(|scalar| scalar.as_str() == s)
            .ok_or_else(|| DescriptorError::UnknownScalar(s.to_string()))
    }
}

/// Cardinality of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Singular,
    Repeated,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Singular => "singular",
            Self::Repeated => "repeated",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "singular" => Ok(Self::Singular),
            "repeated" => Ok(Self::Repeated),
            other => Err(DescriptorError::UnknownLabel(other.to_string())),
        }
    }
}

/// An enum type declared in a generated module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    /// Declared name.
    pub name: String,
    /// Schema file the enum was declared in (e.g. `"person.idl"`).
    pub file: String,
    /// Declared values, in declaration order.
    pub values: Vec<EnumValue>,
}

/// One named value of an [`EnumType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
}

impl EnumType {
    /// The value a freshly constructed field of this enum type holds: the
    /// first declared value. `None` for an enum without values.
    pub fn default_number(&self) -> Option<i32> {
        self.values.first().map(|v| v.number)
    }

    /// Look up a value's name by number.
    pub fn value_name(&self, number: i32) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.number == number)
            .map(|v| v.name.as_str())
    }
}

/// Reference from a field to the message type it holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    /// Declared name of the target message type.
    pub name: String,
    /// Schema file the target was declared in.
    pub file: String,
}

impl MessageRef {
    /// Whether `message` is the type this reference points at.
    pub fn matches(&self, message: &MessageType) -> bool {
        self.name == message.name && self.file == message.file
    }
}

impl std::fmt::Display for MessageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.file)
    }
}

/// What a field holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FieldKind {
    /// A scalar value.
    Scalar { scalar: ScalarType },
    /// An enum value; the enum type is embedded so defaults need no lookup.
    Enum { enum_type: EnumType },
    /// A nested message.
    Message { message: MessageRef },
}

impl FieldKind {
    /// Whether this field holds nested messages.
    pub fn is_message(&self) -> bool {
        matches!(self, Self::Message { .. })
    }

    /// Short human-readable description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Scalar { scalar } => scalar.to_string(),
            Self::Enum { enum_type } => format!("enum {}", enum_type.name),
            Self::Message { message } => format!("message {}", message.name),
        }
    }
}

/// One declared field of a message type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: u32,
    pub label: Label,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }
}

/// A structured-message type extracted from a generated module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageType {
    /// Declared type name.
    pub name: String,
    /// Schema file the type was declared in (e.g. `"person.idl"`).
    pub file: String,
    /// Declared fields, in declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl MessageType {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Declared field names, in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// A reference to this type, as stored by fields that hold it.
    pub fn to_ref(&self) -> MessageRef {
        MessageRef {
            name: self.name.clone(),
            file: self.file.clone(),
        }
    }
}

/// Self-describing metadata of a generated module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Name of the originating schema file, e.g. `"person.idl"`.
    pub name: String,
}

impl FileDescriptor {
    /// The schema file name with its `.idl` suffix removed.
    pub fn stem(&self) -> &str {
        self.name
            .strip_suffix(SCHEMA_EXTENSION)
            .and_then(|s| s.strip_suffix('.'))
            .unwrap_or(&self.name)
    }
}

/// Rule used to key the message registry.
///
/// Selected once when a factory is built; the two policies are mutually
/// exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamingPolicy {
    /// Key each type by its own declared name.
    #[default]
    #[serde(rename = "message")]
    MessageName,
    /// Key each type by the stem of the schema file it came from. All types
    /// of one file share a key; the last one declared wins.
    #[serde(rename = "file")]
    FileName,
}

impl NamingPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MessageName => "message",
            Self::FileName => "file",
        }
    }
}

impl std::fmt::Display for NamingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamingPolicy {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(Self::MessageName),
            "file" => Ok(Self::FileName),
            other => Err(DescriptorError::UnknownNamingPolicy(other.to_string())),
        }
    }
}
