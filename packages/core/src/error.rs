//! Error types for the core layer.

use thiserror::Error;

use crate::schema::BaseKind;

/// Errors raised while validating a schema, splitting a payload, or decoding
/// a record instance.
///
/// Any of these aborts the decode of the enclosing record; no partial value
/// is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A buffer's length does not match the fixed width of its primitive.
    #[error("malformed {kind} buffer: expected {expected} bytes, got {actual}")]
    MalformedBuffer {
        kind: BaseKind,
        expected: usize,
        actual: usize,
    },

    /// The schema names a primitive this decoder does not recognise.
    #[error("unknown primitive kind: {name}")]
    UnknownPrimitiveKind { name: String },

    /// A builtin-typed field held more than one instance.
    #[error("field '{field}' holds {count} builtin array instances, expected exactly one")]
    MultipleBuiltinArrayInstances { field: String, count: usize },

    /// The instance body does not fit its descriptor (buffers on a composite
    /// type, or fields on a builtin type).
    #[error("instance of '{type_name}' does not match its descriptor")]
    ShapeMismatch { type_name: String },

    /// A composite instance lacks a field its descriptor declares.
    #[error("instance of '{type_name}' is missing field '{field}'")]
    MissingField { type_name: String, field: String },

    /// A composite descriptor declares the same field name twice.
    #[error("type '{type_name}' declares field '{field}' more than once")]
    DuplicateField { type_name: String, field: String },

    /// The payload ended before the record was complete.
    #[error("payload truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// An array of zero-width elements declared more elements than allowed.
    #[error("field '{field}' declares {count} zero-width elements (limit {limit})")]
    TooManyElements {
        field: String,
        count: usize,
        limit: usize,
    },

    /// Bytes were left over after the record was complete.
    #[error("{count} trailing bytes after record")]
    Trailing { count: usize },
}
