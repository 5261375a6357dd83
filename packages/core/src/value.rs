//! The Value type - the decoded record tree.
//!
//! This is what a record looks like once it leaves the decoder. It is
//! host-neutral: a binding maps each variant onto its own numeric arrays,
//! strings and structs.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::BaseKind;

/// A `time` or `duration` primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Time {
    pub sec: u32,
    pub nsec: u32,
}

impl Time {
    pub fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    /// Seconds in the low four bytes, nanoseconds in the high four, both
    /// little-endian.
    pub fn from_le_bytes(bytes: [u8; 8]) -> Self {
        let [s0, s1, s2, s3, n0, n1, n2, n3] = bytes;
        Self {
            sec: u32::from_le_bytes([s0, s1, s2, s3]),
            nsec: u32::from_le_bytes([n0, n1, n2, n3]),
        }
    }

    /// `sec + nsec * 1e-9` in double precision.
    pub fn seconds(&self) -> f64 {
        f64::from(self.sec) + 1e-9 * f64::from(self.nsec)
    }
}

/// A single decoded primitive.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
}

impl Scalar {
    pub fn kind(&self) -> BaseKind {
        match self {
            Scalar::Bool(_) => BaseKind::Bool,
            Scalar::Int8(_) => BaseKind::Int8,
            Scalar::Int16(_) => BaseKind::Int16,
            Scalar::Int32(_) => BaseKind::Int32,
            Scalar::Int64(_) => BaseKind::Int64,
            Scalar::Uint8(_) => BaseKind::Uint8,
            Scalar::Uint16(_) => BaseKind::Uint16,
            Scalar::Uint32(_) => BaseKind::Uint32,
            Scalar::Uint64(_) => BaseKind::Uint64,
            Scalar::Float32(_) => BaseKind::Float32,
            Scalar::Float64(_) => BaseKind::Float64,
            Scalar::String(_) => BaseKind::String,
        }
    }
}

/// A homogeneous array of decoded primitives.
#[derive(Clone, Debug, PartialEq)]
pub enum Array {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
    Uint64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    String(Vec<String>),
    /// Elements of either `time` or `duration`.
    Time(Vec<Time>),
}

impl Array {
    /// Element kind. Time arrays report [`BaseKind::Time`] for durations too.
    pub fn kind(&self) -> BaseKind {
        match self {
            Array::Bool(_) => BaseKind::Bool,
            Array::Int8(_) => BaseKind::Int8,
            Array::Int16(_) => BaseKind::Int16,
            Array::Int32(_) => BaseKind::Int32,
            Array::Int64(_) => BaseKind::Int64,
            Array::Uint8(_) => BaseKind::Uint8,
            Array::Uint16(_) => BaseKind::Uint16,
            Array::Uint32(_) => BaseKind::Uint32,
            Array::Uint64(_) => BaseKind::Uint64,
            Array::Float32(_) => BaseKind::Float32,
            Array::Float64(_) => BaseKind::Float64,
            Array::String(_) => BaseKind::String,
            Array::Time(_) => BaseKind::Time,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Array::Bool(v) => v.len(),
            Array::Int8(v) => v.len(),
            Array::Int16(v) => v.len(),
            Array::Int32(v) => v.len(),
            Array::Int64(v) => v.len(),
            Array::Uint8(v) => v.len(),
            Array::Uint16(v) => v.len(),
            Array::Uint32(v) => v.len(),
            Array::Uint64(v) => v.len(),
            Array::Float32(v) => v.len(),
            Array::Float64(v) => v.len(),
            Array::String(v) => v.len(),
            Array::Time(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A decoded composite: values in declaration order.
///
/// The field names are shared between every struct decoded from the same
/// field, so an array of structs carries one layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Struct {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl Struct {
    /// Pair a layout with its values. Both must have the same length.
    pub(crate) fn from_parts(names: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.names.iter().position(|n| n == name)?;
        self.values.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Whether two structs share the same layout allocation.
    pub fn shares_layout(&self, other: &Struct) -> bool {
        Arc::ptr_eq(&self.names, &other.names)
    }
}

/// A decoded record or field.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A field that held no instances (an empty array of composites).
    Empty,
    Scalar(Scalar),
    Array(Array),
    Time(Time),
    Struct(Struct),
    StructArray(Vec<Struct>),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<&Time> {
        match self {
            Value::Time(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Struct> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct_array(&self) -> Option<&[Struct]> {
        match self {
            Value::StructArray(s) => Some(s),
            _ => None,
        }
    }

    /// Field of a struct value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.as_struct()?.get(name)
    }
}

// Conversion from common types

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::Scalar(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Value::Array(v)
    }
}

impl From<Time> for Value {
    fn from(v: Time) -> Self {
        Value::Time(v)
    }
}

impl From<Struct> for Value {
    fn from(v: Struct) -> Self {
        Value::Struct(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(names: &[&str]) -> Arc<[String]> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn time_seconds() {
        let t = Time::from_le_bytes([1, 0, 0, 0, 200, 0, 0, 0]);
        assert_eq!(t, Time::new(1, 200));
        assert!((t.seconds() - 1.0000002).abs() < 1e-12);
    }

    #[test]
    fn time_high_bytes() {
        let t = Time::from_le_bytes([0, 0, 0, 1, 0xff, 0xc9, 0x9a, 0x3b]);
        assert_eq!(t.sec, 1 << 24);
        assert_eq!(t.nsec, 999_999_999);
    }

    #[test]
    fn struct_lookup_and_order() {
        let s = Struct::from_parts(
            layout(&["b", "a"]),
            vec![
                Value::Scalar(Scalar::Int8(1)),
                Value::Scalar(Scalar::String("x".to_string())),
            ],
        );
        let names: Vec<&str> = s.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(s.get("a"), Some(&Value::Scalar(Scalar::String("x".into()))));
        assert_eq!(s.get("c"), None);

        let value = Value::from(s);
        assert_eq!(value.get("b"), Some(&Value::Scalar(Scalar::Int8(1))));
        assert!(value.as_array().is_none());
    }

    #[test]
    fn array_kind_and_len() {
        let a = Array::Time(vec![Time::new(1, 0), Time::new(2, 0)]);
        assert_eq!(a.kind(), BaseKind::Time);
        assert_eq!(a.len(), 2);
        assert!(Array::Float32(Vec::new()).is_empty());
        assert_eq!(Scalar::Uint64(7).kind(), BaseKind::Uint64);
    }
}
