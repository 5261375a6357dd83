//! Record instances - a payload split along its schema.

use bytes::Bytes;

use crate::TypeDescriptor;

/// An instantiated value of a [`TypeDescriptor`].
///
/// Instances borrow their descriptor, so they live no longer than the
/// schema that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordInstance<'t> {
    ty: &'t TypeDescriptor,
    body: Body<'t>,
}

/// The data held by an instance.
#[derive(Clone, Debug, PartialEq)]
pub enum Body<'t> {
    /// One buffer per primitive element. A scalar has one buffer; an
    /// N-element primitive array has N.
    Buffers(Vec<Bytes>),
    /// One [`Field`] per declared field.
    Fields(Vec<Field<'t>>),
}

/// The instances of one composite member.
///
/// A builtin-typed field holds exactly one instance (its array dimension
/// lives in that instance's buffers). A composite-typed field holds one
/// instance per array element, and none for an empty array.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<'t> {
    name: &'t str,
    instances: Vec<RecordInstance<'t>>,
}

impl<'t> RecordInstance<'t> {
    pub fn builtin(ty: &'t TypeDescriptor, buffers: Vec<Bytes>) -> Self {
        Self {
            ty,
            body: Body::Buffers(buffers),
        }
    }

    pub fn composite(ty: &'t TypeDescriptor, fields: Vec<Field<'t>>) -> Self {
        Self {
            ty,
            body: Body::Fields(fields),
        }
    }

    pub fn ty(&self) -> &'t TypeDescriptor {
        self.ty
    }

    pub fn body(&self) -> &Body<'t> {
        &self.body
    }

    pub fn buffers(&self) -> Option<&[Bytes]> {
        match &self.body {
            Body::Buffers(buffers) => Some(buffers),
            Body::Fields(_) => None,
        }
    }

    pub fn fields(&self) -> Option<&[Field<'t>]> {
        match &self.body {
            Body::Buffers(_) => None,
            Body::Fields(fields) => Some(fields),
        }
    }

    /// Look up a field, trying `hint` as its position first.
    pub fn field(&self, name: &str, hint: usize) -> Option<&Field<'t>> {
        let fields = self.fields()?;
        match fields.get(hint) {
            Some(field) if field.name == name => Some(field),
            _ => fields.iter().find(|field| field.name == name),
        }
    }
}

impl<'t> Field<'t> {
    pub fn new(name: &'t str, instances: Vec<RecordInstance<'t>>) -> Self {
        Self { name, instances }
    }

    pub fn empty(name: &'t str) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn name(&self) -> &'t str {
        self.name
    }

    pub fn instances(&self) -> &[RecordInstance<'t>] {
        &self.instances
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
