//! # baglens-cli
//!
//! Reads a log through the command protocol and prints each record as one
//! line of JSON.

use std::io::Write;

use baglens_session::{dispatch, HostArg, Message, Multiplexer, Reply, SessionError};
use thiserror::Error;

pub mod render;

pub use render::{message_to_json, metadata_to_json, value_to_json};

/// Errors from a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("write error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected reply to '{command}': {reply:?}")]
    UnexpectedReply { command: &'static str, reply: Reply },
}

/// What to read and how to print it.
#[derive(Clone, Debug, Default)]
pub struct Options {
    pub log: String,
    /// Channels to read; all channels in the log when empty.
    pub channels: Vec<String>,
    pub meta: bool,
    pub limit: Option<usize>,
}

/// Print the records selected by `options` to `out`, one JSON object per
/// line. Returns the number of records printed.
///
/// The session is closed before returning, whether or not reading
/// succeeded.
pub fn run<W: Write>(mux: &mut Multiplexer, options: &Options, out: &mut W) -> Result<usize, CliError> {
    let handle = match dispatch(
        mux,
        &[0u64.into(), "construct".into(), options.log.as_str().into()],
    )? {
        Reply::Handle(handle) => handle,
        reply => {
            return Err(CliError::UnexpectedReply {
                command: "construct",
                reply,
            })
        }
    };

    let result = print_records(mux, handle, options, out);
    dispatch(mux, &[0u64.into(), "destruct".into(), handle.into(), false.into()])?;
    result
}

fn print_records<W: Write>(
    mux: &mut Multiplexer,
    handle: u64,
    options: &Options,
    out: &mut W,
) -> Result<usize, CliError> {
    let channels = if options.channels.is_empty() {
        match dispatch(mux, &[handle.into(), "channels".into()])? {
            Reply::Strings(all) => all,
            reply => {
                return Err(CliError::UnexpectedReply {
                    command: "channels",
                    reply,
                })
            }
        }
    } else {
        options.channels.clone()
    };
    log::debug!("Reading channels {:?}", channels);
    dispatch(mux, &[handle.into(), "reset_view".into(), HostArg::StrList(channels)])?;

    let mut printed = 0;
    while options.limit.map_or(true, |limit| printed < limit) {
        match dispatch(mux, &[handle.into(), "has_next".into()])? {
            Reply::Bool(true) => {}
            Reply::Bool(false) => break,
            reply => {
                return Err(CliError::UnexpectedReply {
                    command: "has_next",
                    reply,
                })
            }
        }

        let message = read_one(mux, handle, options.meta)?;
        serde_json::to_writer(&mut *out, &message_to_json(&message))?;
        writeln!(out)?;
        printed += 1;
    }
    out.flush()?;
    Ok(printed)
}

fn read_one(mux: &mut Multiplexer, handle: u64, meta: bool) -> Result<Message, CliError> {
    match dispatch(mux, &[handle.into(), "read_one".into(), meta.into()])? {
        Reply::Message(message) => Ok(message),
        reply => Err(CliError::UnexpectedReply {
            command: "read_one",
            reply,
        }),
    }
}
