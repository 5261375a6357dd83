//! Core baglens: schema-driven record decoding
//!
//! This layer turns the raw payload of a log record into a structured value:
//! - `TypeDescriptor`: the schema of a record, primitive or composite
//! - `RecordInstance`: a record split into per-element byte buffers
//! - `Value`: the decoded, host-neutral value tree
//! - `materialize`: payload bytes + descriptor -> `RecordInstance`
//! - `decode`: `RecordInstance` -> `Value`
//!
//! # Example
//!
//! ```rust
//! use baglens_core::{decode, materialize, FieldDef, Scalar, TypeDescriptor, Value};
//!
//! let point = TypeDescriptor::composite(
//!     "geometry/Point2",
//!     vec![
//!         FieldDef::scalar("x", TypeDescriptor::builtin("int32")),
//!         FieldDef::scalar("y", TypeDescriptor::builtin("int32")),
//!     ],
//! )
//! .unwrap();
//!
//! let mut payload = Vec::new();
//! payload.extend_from_slice(&3i32.to_le_bytes());
//! payload.extend_from_slice(&4i32.to_le_bytes());
//!
//! let instance = materialize(&point, payload.into()).unwrap();
//! let value = decode(&instance).unwrap();
//! assert_eq!(value.get("y"), Some(&Value::Scalar(Scalar::Int32(4))));
//! ```

pub use bytes::Bytes;

mod decode;
mod error;
mod instance;
mod schema;
mod value;
mod wire;

pub use decode::decode;
pub use error::DecodeError;
pub use instance::{Body, Field, RecordInstance};
pub use schema::{ArrayLen, BaseKind, FieldDef, TypeDescriptor, TypeKind};
pub use value::{Array, Scalar, Struct, Time, Value};
pub use wire::{materialize, MAX_ZERO_WIDTH_ELEMENTS};
