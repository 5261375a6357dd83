//! In-memory log.

use std::collections::BTreeMap;

use baglens_core::{Bytes, Time, TypeDescriptor};

use crate::{EntryHeader, Log, LogError};

/// A log whose entries and type descriptors are held in memory.
///
/// Entries can only be appended, and only with a type that was defined
/// first.
///
/// # Example
///
/// ```rust
/// use baglens_core::{Time, TypeDescriptor};
/// use baglens_log::{Log, MemoryLog};
///
/// let mut log = MemoryLog::new();
/// log.define_type(TypeDescriptor::builtin("uint8")).unwrap();
/// log.push("/count", Time::new(1, 0), "uint8", vec![42u8]).unwrap();
///
/// assert_eq!(log.len(), 1);
/// assert_eq!(log.header(0).unwrap().channel, "/count");
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryLog {
    types: BTreeMap<String, TypeDescriptor>,
    entries: Vec<(EntryHeader, Bytes)>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record type under its descriptor name, replacing any
    /// previous definition.
    pub fn define_type(&mut self, descriptor: TypeDescriptor) -> Result<(), LogError> {
        descriptor.validate()?;
        self.types
            .insert(descriptor.name().to_string(), descriptor);
        Ok(())
    }

    /// Append an entry, returning its index.
    pub fn push(
        &mut self,
        channel: impl Into<String>,
        time: Time,
        type_name: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Result<usize, LogError> {
        let type_name = type_name.into();
        if !self.types.contains_key(&type_name) {
            return Err(LogError::UnknownType { type_name });
        }

        self.entries.push((
            EntryHeader {
                channel: channel.into(),
                time,
                type_name,
            },
            payload.into(),
        ));
        Ok(self.entries.len() - 1)
    }
}

impl Log for MemoryLog {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn header(&self, index: usize) -> Option<&EntryHeader> {
        self.entries.get(index).map(|(header, _)| header)
    }

    fn descriptor(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }

    fn payload(&self, index: usize) -> Result<Bytes, LogError> {
        self.entries
            .get(index)
            .map(|(_, payload)| payload.clone())
            .ok_or(LogError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }
}
