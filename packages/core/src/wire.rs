//! Wire materializer: payload bytes + descriptor -> `RecordInstance`.
//!
//! Record layout, with length prefixes and counts little-endian:
//! - fixed-width primitives occupy their width (`time`/`duration`: 8) and
//!   are passed through unswapped; the decoder reads numerics in host byte
//!   order, so numeric payloads must be written in the reading host's order
//!   (little-endian on every supported target)
//! - `string`: `u32` byte length, then the bytes
//! - `Variable` array: `u32` element count, then the elements
//! - `Fixed(n)` array: `n` elements, no prefix
//! - composite: its fields in declaration order
//!
//! Buffers are zero-copy slices of the payload.
//!
//! Element counts are checked against the bytes left before anything is
//! allocated. Elements that encode to zero bytes can't be checked that way,
//! so arrays of them are capped at [`MAX_ZERO_WIDTH_ELEMENTS`].

use bytes::Bytes;

use crate::{ArrayLen, BaseKind, DecodeError, Field, FieldDef, RecordInstance, TypeDescriptor, TypeKind};

/// Most elements an array of zero-width composites may declare.
pub const MAX_ZERO_WIDTH_ELEMENTS: usize = 1 << 16;

/// Split a record payload along its descriptor.
///
/// The whole payload must be consumed; leftover bytes are an error.
pub fn materialize(ty: &TypeDescriptor, payload: Bytes) -> Result<RecordInstance<'_>, DecodeError> {
    let mut cursor = Cursor { buf: payload, pos: 0 };
    let instance = read_instance(ty, &mut cursor)?;
    match cursor.remaining() {
        0 => Ok(instance),
        count => Err(DecodeError::Trailing { count }),
    }
}

struct Cursor {
    buf: Bytes,
    pos: usize,
}

impl Cursor {
    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, needed: usize) -> Result<Bytes, DecodeError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(DecodeError::Truncated { needed, remaining });
        }
        let out = self.buf.slice(self.pos..self.pos + needed);
        self.pos += needed;
        Ok(out)
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

fn read_instance<'t>(
    ty: &'t TypeDescriptor,
    cursor: &mut Cursor,
) -> Result<RecordInstance<'t>, DecodeError> {
    match ty.kind() {
        TypeKind::Builtin(base_type) => {
            let kind = resolve(base_type)?;
            Ok(RecordInstance::builtin(ty, vec![read_element(kind, cursor)?]))
        }
        TypeKind::Composite(defs) => {
            let fields = defs
                .iter()
                .map(|def| Ok(Field::new(&def.name, read_field(def, cursor)?)))
                .collect::<Result<Vec<_>, DecodeError>>()?;
            Ok(RecordInstance::composite(ty, fields))
        }
    }
}

fn read_field<'t>(
    def: &'t FieldDef,
    cursor: &mut Cursor,
) -> Result<Vec<RecordInstance<'t>>, DecodeError> {
    let count = match def.array {
        None => return Ok(vec![read_instance(&def.ty, cursor)?]),
        Some(ArrayLen::Fixed(n)) => n,
        Some(ArrayLen::Variable) => cursor.read_u32()? as usize,
    };

    match min_width(&def.ty) {
        0 if count > MAX_ZERO_WIDTH_ELEMENTS => {
            return Err(DecodeError::TooManyElements {
                field: def.name.clone(),
                count,
                limit: MAX_ZERO_WIDTH_ELEMENTS,
            })
        }
        0 => {}
        width => {
            let needed = count.saturating_mul(width);
            let remaining = cursor.remaining();
            if needed > remaining {
                return Err(DecodeError::Truncated { needed, remaining });
            }
        }
    }

    match def.ty.kind() {
        // Primitive arrays are one instance with a buffer per element.
        TypeKind::Builtin(base_type) => {
            let kind = resolve(base_type)?;
            let mut buffers = Vec::with_capacity(count);
            for _ in 0..count {
                buffers.push(read_element(kind, cursor)?);
            }
            Ok(vec![RecordInstance::builtin(&def.ty, buffers)])
        }
        TypeKind::Composite(_) => {
            let mut instances = Vec::with_capacity(count);
            for _ in 0..count {
                instances.push(read_instance(&def.ty, cursor)?);
            }
            Ok(instances)
        }
    }
}

/// Fewest bytes one element of `ty` can encode to.
///
/// Unknown primitives count as zero; reading them fails anyway.
fn min_width(ty: &TypeDescriptor) -> usize {
    match ty.kind() {
        TypeKind::Builtin(base_type) => match BaseKind::from_name(base_type) {
            Some(kind) => kind.width().unwrap_or(4),
            None => 0,
        },
        TypeKind::Composite(defs) => defs
            .iter()
            .map(|def| match def.array {
                None => min_width(&def.ty),
                Some(ArrayLen::Fixed(n)) => n.saturating_mul(min_width(&def.ty)),
                Some(ArrayLen::Variable) => 4,
            })
            .fold(0, usize::saturating_add),
    }
}

fn resolve(base_type: &str) -> Result<BaseKind, DecodeError> {
    BaseKind::from_name(base_type).ok_or_else(|| DecodeError::UnknownPrimitiveKind {
        name: base_type.to_string(),
    })
}

fn read_element(kind: BaseKind, cursor: &mut Cursor) -> Result<Bytes, DecodeError> {
    match kind.width() {
        Some(width) => cursor.take(width),
        None => {
            let len = cursor.read_u32()? as usize;
            cursor.take(len)
        }
    }
}
