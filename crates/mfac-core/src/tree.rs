//! # Message → Tree Conversion
//!
//! Flattens a [`Message`] into a nested `serde_json::Value` keyed by the
//! declared field names, and serializes that tree with a configurable
//! indentation width.
//!
//! - Nested messages become nested mappings; an unset nested message is
//!   an empty mapping.
//! - Repeated fields become ordered sequences, each element converted
//!   recursively.
//! - Scalars are emitted raw. Enums are emitted as their number, bytes as
//!   an array of byte values.

use serde::Serialize;
use serde_json::{Map, Number, Value as Json};

use crate::message::{FieldValue, Message, Value};

/// Indentation used by [`to_json`] callers that have no preference.
pub const DEFAULT_INDENT: usize = 4;

/// Convert a message into a nested mapping of its declared fields.
pub fn to_tree(message: &Message) -> Json {
    let mut map = Map::new();
    for (descriptor, slot) in message.fields() {
        let converted = match slot {
            FieldValue::Singular(value) => value_to_tree(value),
            FieldValue::Unset => Json::Object(Map::new()),
            FieldValue::Repeated(items) => Json::Array(items.iter().map(value_to_tree).collect()),
        };
        map.insert(descriptor.name.clone(), converted);
    }
    Json::Object(map)
}

/// Serialize [`to_tree`] output with `indent` spaces per nesting level.
pub fn to_json(message: &Message, indent: usize) -> Result<String, serde_json::Error> {
    let tree = to_tree(message);
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    tree.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&out).into_owned())
}

fn value_to_tree(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::I32(n) => Json::from(*n),
        Value::I64(n) => Json::from(*n),
        Value::U32(n) => Json::from(*n),
        Value::U64(n) => Json::from(*n),
        Value::F32(f) => float(f64::from(*f)),
        Value::F64(f) => float(*f),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(bytes) => Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
        Value::Enum(n) => Json::from(*n),
        Value::Message(m) => to_tree(m),
    }
}

// NaN and infinities have no JSON representation.
fn float(f: f64) -> Json {
    Number::from_f64(f).map(Json::Number).unwrap_or(Json::Null)
}
