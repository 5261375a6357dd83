//! The command protocol between a host and the [`Multiplexer`].
//!
//! A call is a flat argument list: a handle, a command name, then the
//! command's own arguments.
//!
//! | handle | command | args | reply |
//! |---|---|---|---|
//! | 0 | `construct` | path | `Handle` |
//! | 0 | `destruct` | handle, check_exists? (default true) | `None` |
//! | h | `reset_view` / `resetView` | channels | `None` |
//! | h | `read_one` / `readMessage` | want_metadata | `Message` |
//! | h | `read_all` / `readAllMessages` | want_metadata | `Messages` |
//! | h | `has_next` / `hasNext` | | `Bool` |
//! | h | `channels` | | `Strings` |
//!
//! A nonzero handle is resolved before the command name is looked at, so
//! a stale handle reports `InvalidHandle` whatever the command.

use baglens_core::Value;

use crate::{Message, Metadata, Multiplexer, Result, SessionError};

/// An argument as passed across the host boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostArg {
    Uint(u64),
    Bool(bool),
    Str(String),
    StrList(Vec<String>),
}

impl HostArg {
    pub fn as_handle(&self) -> Option<u64> {
        match self {
            HostArg::Uint(n) => Some(*n),
            _ => None,
        }
    }

    /// Hosts without a boolean type pass flags as integers.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostArg::Bool(b) => Some(*b),
            HostArg::Uint(n) => Some(*n != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostArg::Str(s) => Some(s),
            _ => None,
        }
    }

    /// A single string is accepted as a one-element list.
    pub fn as_str_list(&self) -> Option<Vec<String>> {
        match self {
            HostArg::StrList(list) => Some(list.clone()),
            HostArg::Str(s) => Some(vec![s.clone()]),
            _ => None,
        }
    }
}

impl From<u64> for HostArg {
    fn from(n: u64) -> Self {
        HostArg::Uint(n)
    }
}

impl From<bool> for HostArg {
    fn from(b: bool) -> Self {
        HostArg::Bool(b)
    }
}

impl From<&str> for HostArg {
    fn from(s: &str) -> Self {
        HostArg::Str(s.to_string())
    }
}

impl From<String> for HostArg {
    fn from(s: String) -> Self {
        HostArg::Str(s)
    }
}

impl From<Vec<String>> for HostArg {
    fn from(list: Vec<String>) -> Self {
        HostArg::StrList(list)
    }
}

impl From<&[&str]> for HostArg {
    fn from(list: &[&str]) -> Self {
        HostArg::StrList(list.iter().map(|s| s.to_string()).collect())
    }
}

/// The result of a command.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    None,
    Handle(u64),
    Bool(bool),
    Message(Message),
    /// Values and, when requested, their metadata in the same order.
    Messages {
        values: Vec<Value>,
        metas: Option<Vec<Metadata>>,
    },
    Strings(Vec<String>),
}

/// Execute one command.
pub fn dispatch(mux: &mut Multiplexer, args: &[HostArg]) -> Result<Reply> {
    let handle = handle_arg(args, 0, "handle")?;

    if handle == 0 {
        return match str_arg(args, 1, "command")? {
            "construct" => {
                let path = str_arg(args, 2, "path")?;
                Ok(Reply::Handle(mux.construct(path)?))
            }
            "destruct" => {
                let target = handle_arg(args, 2, "handle")?;
                let check_exists = match args.get(3) {
                    Some(arg) => bool_value(arg, "check_exists")?,
                    None => true,
                };
                mux.destruct(target, check_exists)?;
                Ok(Reply::None)
            }
            other => Err(SessionError::UnknownCommand(other.to_string())),
        };
    }

    let session = mux.session_mut(handle)?;
    match str_arg(args, 1, "command")? {
        "reset_view" | "resetView" => {
            let channels = arg(args, 2, "channels")?
                .as_str_list()
                .ok_or(SessionError::BadArgument {
                    name: "channels",
                    expected: "a list of strings",
                })?;
            session.reset_view(channels);
            Ok(Reply::None)
        }
        "read_one" | "readMessage" => {
            let want_metadata = bool_value(arg(args, 2, "want_metadata")?, "want_metadata")?;
            Ok(Reply::Message(session.read_one(want_metadata)?))
        }
        "read_all" | "readAllMessages" => {
            let want_metadata = bool_value(arg(args, 2, "want_metadata")?, "want_metadata")?;
            let messages = session.read_all(want_metadata)?;

            let mut values = Vec::with_capacity(messages.len());
            let mut metas = Vec::with_capacity(messages.len());
            for Message { value, meta } in messages {
                values.push(value);
                metas.extend(meta);
            }
            Ok(Reply::Messages {
                values,
                metas: want_metadata.then_some(metas),
            })
        }
        "has_next" | "hasNext" => Ok(Reply::Bool(session.has_next())),
        "channels" => Ok(Reply::Strings(session.channels())),
        other => Err(SessionError::UnknownCommand(other.to_string())),
    }
}

fn arg<'a>(args: &'a [HostArg], index: usize, name: &'static str) -> Result<&'a HostArg> {
    args.get(index).ok_or(SessionError::MissingArgument(name))
}

fn handle_arg(args: &[HostArg], index: usize, name: &'static str) -> Result<u64> {
    arg(args, index, name)?
        .as_handle()
        .ok_or(SessionError::BadArgument {
            name,
            expected: "an unsigned integer",
        })
}

fn str_arg<'a>(args: &'a [HostArg], index: usize, name: &'static str) -> Result<&'a str> {
    arg(args, index, name)?
        .as_str()
        .ok_or(SessionError::BadArgument {
            name,
            expected: "a string",
        })
}

fn bool_value(arg: &HostArg, name: &'static str) -> Result<bool> {
    arg.as_bool().ok_or(SessionError::BadArgument {
        name,
        expected: "a boolean",
    })
}
