//! # baglens-log
//!
//! Access to append-only logs of timestamped, channel-tagged records.
//!
//! The session layer only sees the [`Log`] trait: an ordered sequence of
//! entries, each with a header (channel, time, type name) and an opaque
//! payload, plus the descriptors of the types the entries use.
//!
//! ## Implementations
//!
//! - [`MemoryLog`] - entries held in memory, built with `define_type`/`push`
//! - [`open_json_lines`] - loads a JSON-lines log file into a `MemoryLog`
//!
//! [`LogOpener`] turns a user-supplied path into an open log;
//! [`JsonLinesOpener`] expands `~` and `$VAR` before opening.

mod error;
mod expand;
mod json_lines;
mod memory;
mod traits;

pub use error::LogError;
pub use expand::{expand_path, expand_with};
pub use json_lines::{open_json_lines, JsonLinesOpener};
pub use memory::MemoryLog;
pub use traits::{EntryHeader, Log, LogOpener};
