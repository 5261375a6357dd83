//! The decoder: `RecordInstance` -> `Value`.
//!
//! Builtin instances are decoded buffer by buffer according to their
//! primitive kind. Composite instances recurse through their fields; a
//! field's value is decided by how many instances it holds and whether its
//! element type is builtin.

use std::sync::Arc;

use bytes::Bytes;

use crate::{
    Array, BaseKind, DecodeError, FieldDef, RecordInstance, Scalar, Struct, Time, TypeKind, Value,
};

/// Decode a record instance into a value tree.
///
/// Any error aborts the whole decode; no partial value is returned.
pub fn decode(instance: &RecordInstance<'_>) -> Result<Value, DecodeError> {
    match instance.ty().kind() {
        TypeKind::Builtin(base_type) => decode_builtin(base_type, instance),
        TypeKind::Composite(defs) => {
            let names = layout(defs);
            Ok(Value::Struct(decode_struct(&names, defs, instance)?))
        }
    }
}

fn decode_builtin(base_type: &str, instance: &RecordInstance<'_>) -> Result<Value, DecodeError> {
    let buffers = instance
        .buffers()
        .ok_or_else(|| DecodeError::ShapeMismatch {
            type_name: instance.ty().name().to_string(),
        })?;
    let kind = BaseKind::from_name(base_type).ok_or_else(|| DecodeError::UnknownPrimitiveKind {
        name: base_type.to_string(),
    })?;

    let value = match kind {
        BaseKind::Bool => {
            let elems = buffers
                .iter()
                .map(|b| fixed(b, kind).map(|[byte]: [u8; 1]| byte != 0))
                .collect::<Result<Vec<_>, _>>()?;
            collapse(elems, Scalar::Bool, Array::Bool)
        }
        BaseKind::Int8 => numeric(buffers, kind, i8::from_ne_bytes, Scalar::Int8, Array::Int8)?,
        BaseKind::Int16 => numeric(buffers, kind, i16::from_ne_bytes, Scalar::Int16, Array::Int16)?,
        BaseKind::Int32 => numeric(buffers, kind, i32::from_ne_bytes, Scalar::Int32, Array::Int32)?,
        BaseKind::Int64 => numeric(buffers, kind, i64::from_ne_bytes, Scalar::Int64, Array::Int64)?,
        BaseKind::Uint8 => numeric(buffers, kind, u8::from_ne_bytes, Scalar::Uint8, Array::Uint8)?,
        BaseKind::Uint16 => {
            numeric(buffers, kind, u16::from_ne_bytes, Scalar::Uint16, Array::Uint16)?
        }
        BaseKind::Uint32 => {
            numeric(buffers, kind, u32::from_ne_bytes, Scalar::Uint32, Array::Uint32)?
        }
        BaseKind::Uint64 => {
            numeric(buffers, kind, u64::from_ne_bytes, Scalar::Uint64, Array::Uint64)?
        }
        BaseKind::Float32 => {
            numeric(buffers, kind, f32::from_ne_bytes, Scalar::Float32, Array::Float32)?
        }
        BaseKind::Float64 => {
            numeric(buffers, kind, f64::from_ne_bytes, Scalar::Float64, Array::Float64)?
        }
        BaseKind::Time | BaseKind::Duration => {
            let mut times = buffers
                .iter()
                .map(|b| fixed(b, kind).map(Time::from_le_bytes))
                .collect::<Result<Vec<_>, _>>()?;
            if times.len() == 1 {
                Value::Time(times.swap_remove(0))
            } else {
                Value::Array(Array::Time(times))
            }
        }
        BaseKind::String => {
            // A lone string collapses to a scalar; anything else is an array.
            let strings = buffers
                .iter()
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .collect();
            collapse(strings, Scalar::String, Array::String)
        }
    };
    Ok(value)
}

/// Reinterpret every buffer as one `N`-byte primitive.
fn numeric<T, const N: usize>(
    buffers: &[Bytes],
    kind: BaseKind,
    convert: fn([u8; N]) -> T,
    scalar: fn(T) -> Scalar,
    array: fn(Vec<T>) -> Array,
) -> Result<Value, DecodeError> {
    let elems = buffers
        .iter()
        .map(|b| fixed(b, kind).map(convert))
        .collect::<Result<Vec<T>, _>>()?;
    Ok(collapse(elems, scalar, array))
}

fn fixed<const N: usize>(buffer: &[u8], kind: BaseKind) -> Result<[u8; N], DecodeError> {
    buffer
        .try_into()
        .map_err(|_| DecodeError::MalformedBuffer {
            kind,
            expected: N,
            actual: buffer.len(),
        })
}

fn collapse<T>(mut elems: Vec<T>, scalar: fn(T) -> Scalar, array: fn(Vec<T>) -> Array) -> Value {
    if elems.len() == 1 {
        Value::Scalar(scalar(elems.swap_remove(0)))
    } else {
        Value::Array(array(elems))
    }
}

fn layout(defs: &[FieldDef]) -> Arc<[String]> {
    defs.iter().map(|def| def.name.clone()).collect()
}

fn decode_struct(
    names: &Arc<[String]>,
    defs: &[FieldDef],
    instance: &RecordInstance<'_>,
) -> Result<Struct, DecodeError> {
    if instance.fields().is_none() {
        return Err(DecodeError::ShapeMismatch {
            type_name: instance.ty().name().to_string(),
        });
    }

    let mut values = Vec::with_capacity(defs.len());
    for (index, def) in defs.iter().enumerate() {
        let field = instance
            .field(&def.name, index)
            .ok_or_else(|| DecodeError::MissingField {
                type_name: instance.ty().name().to_string(),
                field: def.name.clone(),
            })?;
        values.push(decode_field(&def.name, field.instances())?);
    }
    Ok(Struct::from_parts(Arc::clone(names), values))
}

fn decode_field(name: &str, instances: &[RecordInstance<'_>]) -> Result<Value, DecodeError> {
    let Some(first) = instances.first() else {
        return Ok(Value::Empty);
    };

    match first.ty().kind() {
        TypeKind::Builtin(_) => {
            if instances.len() != 1 {
                return Err(DecodeError::MultipleBuiltinArrayInstances {
                    field: name.to_string(),
                    count: instances.len(),
                });
            }
            decode(first)
        }
        TypeKind::Composite(defs) => {
            // Every instance of a field shares the declared type, so the
            // first one's layout serves them all.
            let names = layout(defs);
            let mut structs = instances
                .iter()
                .map(|instance| decode_struct(&names, defs, instance))
                .collect::<Result<Vec<_>, _>>()?;
            if structs.len() == 1 {
                Ok(Value::Struct(structs.swap_remove(0)))
            } else {
                Ok(Value::StructArray(structs))
            }
        }
    }
}
