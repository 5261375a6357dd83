use std::path::PathBuf;

use baglens_core::DecodeError;

#[derive(thiserror::Error, Debug)]
pub enum LogError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: invalid payload encoding: {source}")]
    Payload {
        line: usize,
        #[source]
        source: base64::DecodeError,
    },

    #[error("unknown record type: {type_name}")]
    UnknownType { type_name: String },

    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    #[error("entry {index} out of range (log has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("schema error: {0}")]
    Schema(#[from] DecodeError),
}
