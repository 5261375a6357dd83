//! Core traits: Log, LogOpener.

use std::collections::BTreeSet;

use baglens_core::{Bytes, Time, TypeDescriptor};
use serde::{Deserialize, Serialize};

use crate::LogError;

/// Per-entry data stored by the log itself, outside the payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryHeader {
    pub channel: String,
    pub time: Time,
    pub type_name: String,
}

/// An ordered, read-only sequence of log entries.
///
/// Entries are indexed `0..len()` in the order they were appended.
///
/// # Object Safety
///
/// This trait is object-safe: sessions hold a `Box<dyn Log>`.
pub trait Log: Send {
    /// Number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Header of the entry at `index`, or `None` past the end.
    fn header(&self, index: usize) -> Option<&EntryHeader>;

    /// Descriptor for a record type named by an entry header.
    fn descriptor(&self, type_name: &str) -> Option<&TypeDescriptor>;

    /// Raw payload of the entry at `index`.
    fn payload(&self, index: usize) -> Result<Bytes, LogError>;

    /// Every channel that has at least one entry.
    fn channels(&self) -> BTreeSet<String> {
        (0..self.len())
            .filter_map(|index| self.header(index))
            .map(|header| header.channel.clone())
            .collect()
    }
}

/// Opens logs from user-supplied paths.
pub trait LogOpener: Send {
    fn open(&self, path: &str) -> Result<Box<dyn Log>, LogError>;
}

impl<T: Log + ?Sized> Log for Box<T> {
    fn len(&self) -> usize {
        self.as_ref().len()
    }

    fn header(&self, index: usize) -> Option<&EntryHeader> {
        self.as_ref().header(index)
    }

    fn descriptor(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.as_ref().descriptor(type_name)
    }

    fn payload(&self, index: usize) -> Result<Bytes, LogError> {
        self.as_ref().payload(index)
    }

    fn channels(&self) -> BTreeSet<String> {
        self.as_ref().channels()
    }
}
