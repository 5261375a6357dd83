//! Conversions from decoded records to JSON.

use baglens_core::{Array, Scalar, Struct, Time, Value};
use baglens_session::{Message, Metadata};
use serde_json::{json, Map};

/// Convert a decoded value to `serde_json::Value`.
///
/// Structs become objects with their fields in declaration order. Non-finite
/// floats become `null`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Empty => serde_json::Value::Array(Vec::new()),
        Value::Scalar(s) => scalar_to_json(s),
        Value::Array(a) => array_to_json(a),
        Value::Time(t) => time_to_json(t),
        Value::Struct(s) => struct_to_json(s),
        Value::StructArray(items) => {
            serde_json::Value::Array(items.iter().map(struct_to_json).collect())
        }
    }
}

fn scalar_to_json(scalar: &Scalar) -> serde_json::Value {
    match scalar {
        Scalar::Bool(b) => (*b).into(),
        Scalar::Int8(n) => (*n).into(),
        Scalar::Int16(n) => (*n).into(),
        Scalar::Int32(n) => (*n).into(),
        Scalar::Int64(n) => (*n).into(),
        Scalar::Uint8(n) => (*n).into(),
        Scalar::Uint16(n) => (*n).into(),
        Scalar::Uint32(n) => (*n).into(),
        Scalar::Uint64(n) => (*n).into(),
        Scalar::Float32(f) => (*f).into(),
        Scalar::Float64(f) => (*f).into(),
        Scalar::String(s) => s.as_str().into(),
    }
}

fn array_to_json(array: &Array) -> serde_json::Value {
    match array {
        Array::Bool(v) => list(v),
        Array::Int8(v) => list(v),
        Array::Int16(v) => list(v),
        Array::Int32(v) => list(v),
        Array::Int64(v) => list(v),
        Array::Uint8(v) => list(v),
        Array::Uint16(v) => list(v),
        Array::Uint32(v) => list(v),
        Array::Uint64(v) => list(v),
        Array::Float32(v) => list(v),
        Array::Float64(v) => list(v),
        Array::String(v) => list(v),
        Array::Time(v) => serde_json::Value::Array(v.iter().map(time_to_json).collect()),
    }
}

fn list<T>(items: &[T]) -> serde_json::Value
where
    T: Clone + Into<serde_json::Value>,
{
    serde_json::Value::Array(items.iter().cloned().map(Into::into).collect())
}

fn time_to_json(time: &Time) -> serde_json::Value {
    json!({
        "sec": time.sec,
        "nsec": time.nsec,
        "time": time.seconds(),
    })
}

fn struct_to_json(s: &Struct) -> serde_json::Value {
    let map: Map<String, serde_json::Value> = s
        .iter()
        .map(|(name, value)| (name.to_string(), value_to_json(value)))
        .collect();
    serde_json::Value::Object(map)
}

pub fn metadata_to_json(meta: &Metadata) -> serde_json::Value {
    json!({
        "channel": meta.channel,
        "timestamp": time_to_json(&meta.timestamp),
        "type_name": meta.type_name,
    })
}

/// One output line: `{"value": ...}` plus `"meta"` when the message has it.
pub fn message_to_json(message: &Message) -> serde_json::Value {
    let mut map = Map::new();
    map.insert("value".to_string(), value_to_json(&message.value));
    if let Some(meta) = &message.meta {
        map.insert("meta".to_string(), metadata_to_json(meta));
    }
    serde_json::Value::Object(map)
}
