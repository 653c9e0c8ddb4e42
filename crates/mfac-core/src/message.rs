//! # Dynamic Messages
//!
//! Instances of a [`MessageType`] whose shape is only known at runtime.
//! A message holds one slot per declared field, in declaration order.
//! Scalar and enum slots always carry a value (their default until set);
//! singular nested-message slots start unset; repeated slots start empty.
//!
//! Every write is checked against the field's declared label and kind, so
//! a message can never hold a value its type does not describe.

use std::sync::Arc;

use crate::descriptor::{FieldDescriptor, FieldKind, Label, MessageType, ScalarType};
use crate::error::{ConstructionError, ValueError};

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    /// Enum value, by number.
    Enum(i32),
    Message(Box<Message>),
}

impl Value {
    /// The zero value stored in a freshly constructed scalar slot.
    pub fn default_for(scalar: ScalarType) -> Self {
        match scalar {
            ScalarType::Double => Self::F64(0.0),
            ScalarType::Float => Self::F32(0.0),
            ScalarType::Int32 | ScalarType::Sint32 | ScalarType::Sfixed32 => Self::I32(0),
            ScalarType::Int64 | ScalarType::Sint64 | ScalarType::Sfixed64 => Self::I64(0),
            ScalarType::Uint32 | ScalarType::Fixed32 => Self::U32(0),
            ScalarType::Uint64 | ScalarType::Fixed64 => Self::U64(0),
            ScalarType::Bool => Self::Bool(false),
            ScalarType::String => Self::String(String::new()),
            ScalarType::Bytes => Self::Bytes(Vec::new()),
        }
    }

    /// Short description of the value's kind, for error messages.
    pub fn kind_name(&self) -> String {
        match self {
            Self::Bool(_) => "bool".to_string(),
            Self::I32(_) => "i32".to_string(),
            Self::I64(_) => "i64".to_string(),
            Self::U32(_) => "u32".to_string(),
            Self::U64(_) => "u64".to_string(),
            Self::F32(_) => "f32".to_string(),
            Self::F64(_) => "f64".to_string(),
            Self::String(_) => "string".to_string(),
            Self::Bytes(_) => "bytes".to_string(),
            Self::Enum(_) => "enum".to_string(),
            Self::Message(m) => format!("message {}", m.message_type().name),
        }
    }

    /// Whether this value may be stored in a field of the given kind.
    pub fn fits(&self, kind: &FieldKind) -> bool {
        match (kind, self) {
            (FieldKind::Scalar { scalar }, value) => {
                std::mem::discriminant(&Self::default_for(*scalar))
                    == std::mem::discriminant(value)
            }
            (FieldKind::Enum { .. }, Self::Enum(_)) => true,
            (FieldKind::Message { message }, Self::Message(m)) => {
                message.matches(m.message_type())
            }
            _ => false,
        }
    }
}

/// The content of one field slot.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A singular field holding a value.
    Singular(Value),
    /// A singular nested-message field that has not been set.
    Unset,
    /// A repeated field, in insertion order.
    Repeated(Vec<Value>),
}

/// A dynamic instance of a [`MessageType`].
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    message_type: Arc<MessageType>,
    slots: Vec<FieldValue>,
}

impl Message {
    /// Default-construct an instance of `message_type`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::EmptyEnum`] when a singular enum field's
    /// enum declares no values, leaving the field without a default.
    pub fn new(message_type: Arc<MessageType>) -> Result<Self, ConstructionError> {
        let slots = message_type
            .fields
            .iter()
            .map(|field| default_slot(&message_type, field))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { message_type, slots })
    }

    /// The type this message is an instance of.
    pub fn message_type(&self) -> &Arc<MessageType> {
        &self.message_type
    }

    /// Iterate over `(descriptor, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDescriptor, &FieldValue)> {
        self.message_type.fields.iter().zip(self.slots.iter())
    }

    /// Read a field by name.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.position(field).map(|i| &self.slots[i])
    }

    /// Assign a singular field.
    pub fn set(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        let index = self.checked_index(field, Label::Singular, &value)?;
        self.slots[index] = FieldValue::Singular(value);
        Ok(())
    }

    /// Append to a repeated field.
    pub fn push(&mut self, field: &str, value: Value) -> Result<(), ValueError> {
        let index = self.checked_index(field, Label::Repeated, &value)?;
        if let FieldValue::Repeated(items) = &mut self.slots[index] {
            items.push(value);
        }
        Ok(())
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.message_type.fields.iter().position(|f| f.name == field)
    }

    fn checked_index(&self, field: &str, label: Label, value: &Value) -> Result<usize, ValueError> {
        let index = self.position(field).ok_or_else(|| ValueError::UnknownField {
            message: self.message_type.name.clone(),
            field: field.to_string(),
        })?;
        let descriptor = &self.message_type.fields[index];
        if descriptor.label != label {
            return Err(ValueError::LabelMismatch {
                message: self.message_type.name.clone(),
                field: field.to_string(),
                label: descriptor.label.to_string(),
            });
        }
        if !value.fits(&descriptor.kind) {
            return Err(ValueError::TypeMismatch {
                message: self.message_type.name.clone(),
                field: field.to_string(),
                expected: descriptor.kind.describe(),
                actual: value.kind_name(),
            });
        }
        Ok(index)
    }
}

fn default_slot(
    message_type: &MessageType,
    field: &FieldDescriptor,
) -> Result<FieldValue, ConstructionError> {
    if field.is_repeated() {
        return Ok(FieldValue::Repeated(Vec::new()));
    }
    match &field.kind {
        FieldKind::Scalar { scalar } => Ok(FieldValue::Singular(Value::default_for(*scalar))),
        FieldKind::Enum { enum_type } => enum_type
            .default_number()
            .map(|n| FieldValue::Singular(Value::Enum(n)))
            .ok_or_else(|| ConstructionError::EmptyEnum {
                message: message_type.name.clone(),
                field: field.name.clone(),
                enum_name: enum_type.name.clone(),
            }),
        FieldKind::Message { .. } => Ok(FieldValue::Unset),
    }
}
