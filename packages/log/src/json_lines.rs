//! JSON-lines log files.
//!
//! Each non-blank line is one JSON object tagged by `kind`:
//!
//! ```text
//! {"kind":"type","descriptor":{"name":"uint8","kind":{"builtin":"uint8"}}}
//! {"kind":"entry","channel":"/count","time":{"sec":1,"nsec":0},"type_name":"uint8","payload":"Kg=="}
//! ```
//!
//! Payloads are base64. A type line must come before the first entry that
//! uses it.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use base64::Engine;
use baglens_core::{Time, TypeDescriptor};
use serde::Deserialize;

use crate::{expand_path, Log, LogError, LogOpener, MemoryLog};

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Line {
    Type {
        descriptor: TypeDescriptor,
    },
    Entry {
        channel: String,
        time: Time,
        type_name: String,
        payload: String,
    },
}

/// Load a JSON-lines log file.
pub fn open_json_lines(path: &Path) -> Result<MemoryLog, LogError> {
    let io_error = |source: io::Error| LogError::Io {
        path: path.to_path_buf(),
        source,
    };

    log::debug!("Reading {}...", path.display());
    let file = fs::File::open(path).map_err(io_error)?;
    let reader = io::BufReader::new(file);

    let mut log = MemoryLog::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error)?;
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let parsed: Line = serde_json::from_str(&line).map_err(|source| LogError::Parse {
            line: number,
            source,
        })?;
        match parsed {
            Line::Type { descriptor } => log.define_type(descriptor)?,
            Line::Entry {
                channel,
                time,
                type_name,
                payload,
            } => {
                let payload = base64::engine::general_purpose::STANDARD
                    .decode(payload)
                    .map_err(|source| LogError::Payload {
                        line: number,
                        source,
                    })?;
                log.push(channel, time, type_name, payload)?;
            }
        }
    }

    log::debug!("Loaded {} entries from {}", log.len(), path.display());
    Ok(log)
}

/// Opens JSON-lines logs after shell-style path expansion.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonLinesOpener;

impl LogOpener for JsonLinesOpener {
    fn open(&self, path: &str) -> Result<Box<dyn Log>, LogError> {
        let expanded = expand_path(path)?;
        Ok(Box::new(open_json_lines(&expanded)?))
    }
}
