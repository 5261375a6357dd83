//! Type descriptors - the schema a record payload is decoded against.
//!
//! A descriptor is either a builtin primitive or a composite of named,
//! ordered fields. Descriptors are owned trees: a composite owns the
//! descriptors of its fields, so a type can never contain itself.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::DecodeError;

/// The primitive kinds a builtin descriptor can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BaseKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Time,
    Duration,
    String,
}

impl BaseKind {
    /// Resolve a primitive name as written in a schema.
    ///
    /// `byte` and `char` are the legacy spellings of `int8` and `uint8`.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => BaseKind::Bool,
            "int8" | "byte" => BaseKind::Int8,
            "int16" => BaseKind::Int16,
            "int32" => BaseKind::Int32,
            "int64" => BaseKind::Int64,
            "uint8" | "char" => BaseKind::Uint8,
            "uint16" => BaseKind::Uint16,
            "uint32" => BaseKind::Uint32,
            "uint64" => BaseKind::Uint64,
            "float32" => BaseKind::Float32,
            "float64" => BaseKind::Float64,
            "time" => BaseKind::Time,
            "duration" => BaseKind::Duration,
            "string" => BaseKind::String,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical schema name.
    pub fn name(&self) -> &'static str {
        match self {
            BaseKind::Bool => "bool",
            BaseKind::Int8 => "int8",
            BaseKind::Int16 => "int16",
            BaseKind::Int32 => "int32",
            BaseKind::Int64 => "int64",
            BaseKind::Uint8 => "uint8",
            BaseKind::Uint16 => "uint16",
            BaseKind::Uint32 => "uint32",
            BaseKind::Uint64 => "uint64",
            BaseKind::Float32 => "float32",
            BaseKind::Float64 => "float64",
            BaseKind::Time => "time",
            BaseKind::Duration => "duration",
            BaseKind::String => "string",
        }
    }

    /// Encoded width of one element in bytes; `None` for strings.
    pub fn width(&self) -> Option<usize> {
        match self {
            BaseKind::Bool | BaseKind::Int8 | BaseKind::Uint8 => Some(1),
            BaseKind::Int16 | BaseKind::Uint16 => Some(2),
            BaseKind::Int32 | BaseKind::Uint32 | BaseKind::Float32 => Some(4),
            BaseKind::Int64 | BaseKind::Uint64 | BaseKind::Float64 => Some(8),
            BaseKind::Time | BaseKind::Duration => Some(8),
            BaseKind::String => None,
        }
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Array shape of a composite field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayLen {
    /// Exactly `n` elements, no length prefix on the wire.
    Fixed(usize),
    /// A `u32` element count precedes the elements.
    Variable,
}

/// A named member of a composite type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// `None` for a scalar field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array: Option<ArrayLen>,
}

impl FieldDef {
    pub fn scalar(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            array: None,
        }
    }

    pub fn fixed(name: impl Into<String>, ty: TypeDescriptor, len: usize) -> Self {
        Self {
            name: name.into(),
            ty,
            array: Some(ArrayLen::Fixed(len)),
        }
    }

    pub fn variable(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            array: Some(ArrayLen::Variable),
        }
    }
}

/// What a descriptor describes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// A primitive, by schema name. Resolved with [`BaseKind::from_name`].
    Builtin(String),
    /// Named fields in declaration order.
    Composite(Vec<FieldDef>),
}

/// Schema of a primitive or composite record type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
}

impl TypeDescriptor {
    /// A builtin descriptor for the named primitive.
    ///
    /// The name is not checked here; an unknown primitive fails when a
    /// record of this type is decoded.
    pub fn builtin(base_type: impl Into<String>) -> Self {
        let base_type = base_type.into();
        Self {
            name: base_type.clone(),
            kind: TypeKind::Builtin(base_type),
        }
    }

    /// A composite descriptor. Field names must be unique.
    pub fn composite(name: impl Into<String>, fields: Vec<FieldDef>) -> Result<Self, DecodeError> {
        let descriptor = Self {
            name: name.into(),
            kind: TypeKind::Composite(fields),
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check field-name uniqueness throughout the tree.
    ///
    /// Descriptors built with [`TypeDescriptor::composite`] are already
    /// valid; deserialized ones are not checked until this is called.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if let TypeKind::Composite(fields) = &self.kind {
            let mut seen = BTreeSet::new();
            for field in fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(DecodeError::DuplicateField {
                        type_name: self.name.clone(),
                        field: field.name.clone(),
                    });
                }
                field.ty.validate()?;
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.kind, TypeKind::Builtin(_))
    }

    /// The primitive kind, if this is a builtin with a recognised name.
    pub fn base_kind(&self) -> Option<BaseKind> {
        match &self.kind {
            TypeKind::Builtin(base_type) => BaseKind::from_name(base_type),
            TypeKind::Composite(_) => None,
        }
    }

    /// Declared fields in order; empty for builtins.
    pub fn fields(&self) -> &[FieldDef] {
        match &self.kind {
            TypeKind::Builtin(_) => &[],
            TypeKind::Composite(fields) => fields,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> TypeDescriptor {
        TypeDescriptor::composite(
            "std/Header",
            vec![
                FieldDef::scalar("seq", TypeDescriptor::builtin("uint32")),
                FieldDef::scalar("stamp", TypeDescriptor::builtin("time")),
                FieldDef::scalar("frame_id", TypeDescriptor::builtin("string")),
            ],
        )
        .unwrap()
    }

    #[test]
    fn legacy_aliases_resolve() {
        assert_eq!(BaseKind::from_name("byte"), Some(BaseKind::Int8));
        assert_eq!(BaseKind::from_name("char"), Some(BaseKind::Uint8));
        assert_eq!(BaseKind::from_name("float"), None);
    }

    #[test]
    fn names_round_trip() {
        for name in [
            "bool", "int8", "int16", "int32", "int64", "uint8", "uint16", "uint32", "uint64",
            "float32", "float64", "time", "duration", "string",
        ] {
            assert_eq!(BaseKind::from_name(name).unwrap().name(), name);
        }
    }

    #[test]
    fn widths() {
        assert_eq!(BaseKind::Bool.width(), Some(1));
        assert_eq!(BaseKind::Uint16.width(), Some(2));
        assert_eq!(BaseKind::Float32.width(), Some(4));
        assert_eq!(BaseKind::Duration.width(), Some(8));
        assert_eq!(BaseKind::String.width(), None);
    }

    #[test]
    fn builtin_accessors() {
        let ty = TypeDescriptor::builtin("float64");
        assert!(ty.is_builtin());
        assert_eq!(ty.name(), "float64");
        assert_eq!(ty.base_kind(), Some(BaseKind::Float64));
        assert!(ty.fields().is_empty());

        let unknown = TypeDescriptor::builtin("quaternion");
        assert!(unknown.is_builtin());
        assert_eq!(unknown.base_kind(), None);
    }

    #[test]
    fn composite_preserves_field_order() {
        let ty = header();
        assert!(!ty.is_builtin());
        assert_eq!(ty.base_kind(), None);
        let names: Vec<&str> = ty.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["seq", "stamp", "frame_id"]);
    }

    #[test]
    fn duplicate_field_rejected() {
        let err = TypeDescriptor::composite(
            "Bad",
            vec![
                FieldDef::scalar("a", TypeDescriptor::builtin("int8")),
                FieldDef::scalar("a", TypeDescriptor::builtin("int16")),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DecodeError::DuplicateField {
                type_name: "Bad".to_string(),
                field: "a".to_string(),
            }
        );
    }

    #[test]
    fn validate_checks_nested_deserialized_types() {
        let json = serde_json::json!({
            "name": "Outer",
            "kind": {"composite": [
                {"name": "inner", "type": {
                    "name": "Inner",
                    "kind": {"composite": [
                        {"name": "x", "type": {"name": "int8", "kind": {"builtin": "int8"}}},
                        {"name": "x", "type": {"name": "int8", "kind": {"builtin": "int8"}}}
                    ]}
                }}
            ]}
        });
        let ty: TypeDescriptor = serde_json::from_value(json).unwrap();
        assert!(matches!(
            ty.validate(),
            Err(DecodeError::DuplicateField { ref type_name, .. }) if type_name == "Inner"
        ));
    }

    #[test]
    fn serde_shape() {
        let ty = TypeDescriptor::composite(
            "Scan",
            vec![
                FieldDef::scalar("header", header()),
                FieldDef::variable("ranges", TypeDescriptor::builtin("float32")),
                FieldDef::fixed("covariance", TypeDescriptor::builtin("float64"), 9),
            ],
        )
        .unwrap();

        let json = serde_json::to_value(&ty).unwrap();
        assert_eq!(json["kind"]["composite"][1]["array"], "variable");
        assert_eq!(json["kind"]["composite"][2]["array"]["fixed"], 9);
        assert!(json["kind"]["composite"][0].get("array").is_none());

        let back: TypeDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, ty);
    }
}
