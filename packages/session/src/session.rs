//! A sequential reader over one log.

use std::collections::BTreeSet;

use baglens_core::{decode, materialize, Time, Value};
use baglens_log::{Log, LogError};

use crate::{Result, SessionError};

/// Where a record came from, taken from the log entry rather than the
/// payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub channel: String,
    pub timestamp: Time,
    pub type_name: String,
}

/// One decoded record.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub value: Value,
    pub meta: Option<Metadata>,
}

/// A channel filter and the cursor over the entries it matches.
///
/// `next` is the log index of the next matching entry, or `None` once the
/// view is exhausted.
#[derive(Debug)]
struct View {
    channels: BTreeSet<String>,
    next: Option<usize>,
}

/// An open log plus an optional view over it.
///
/// A fresh session has no view; every read fails with
/// [`SessionError::NoActiveView`] until [`reset_view`](Self::reset_view)
/// installs one.
pub struct Session {
    log: Box<dyn Log>,
    view: Option<View>,
}

impl Session {
    pub fn new(log: Box<dyn Log>) -> Self {
        Self { log, view: None }
    }

    /// Replace the view with one over `channels`, positioned at the first
    /// matching entry.
    ///
    /// An empty set matches nothing.
    pub fn reset_view<I, S>(&mut self, channels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let channels: BTreeSet<String> = channels.into_iter().map(Into::into).collect();
        let next = next_match(self.log.as_ref(), &channels, 0);
        log::debug!(
            "View reset to {} channel(s), first match {:?}",
            channels.len(),
            next
        );
        self.view = Some(View { channels, next });
    }

    pub fn has_next(&self) -> bool {
        matches!(self.view, Some(View { next: Some(_), .. }))
    }

    /// Decode the record at the cursor and advance past it.
    ///
    /// On error the cursor stays where it was, so retrying reproduces the
    /// same error.
    pub fn read_one(&mut self, want_metadata: bool) -> Result<Message> {
        let view = self.view.as_ref().ok_or(SessionError::NoActiveView)?;
        let index = view.next.ok_or(SessionError::NoMoreRecords)?;

        let message = read_entry(self.log.as_ref(), index, want_metadata)?;

        let following = next_match(self.log.as_ref(), &view.channels, index + 1);
        if let Some(view) = self.view.as_mut() {
            view.next = following;
        }
        Ok(message)
    }

    /// Read every remaining record in the view.
    ///
    /// If a record fails, the messages read so far in this call are dropped
    /// and the cursor is left on the failing record.
    pub fn read_all(&mut self, want_metadata: bool) -> Result<Vec<Message>> {
        if self.view.is_none() {
            return Err(SessionError::NoActiveView);
        }

        let mut messages = Vec::new();
        while self.has_next() {
            messages.push(self.read_one(want_metadata)?);
        }
        Ok(messages)
    }

    /// Every channel present in the log, sorted.
    pub fn channels(&self) -> Vec<String> {
        self.log.channels().into_iter().collect()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("entries", &self.log.len())
            .field("view", &self.view)
            .finish()
    }
}

fn next_match(log: &dyn Log, channels: &BTreeSet<String>, from: usize) -> Option<usize> {
    if channels.is_empty() {
        return None;
    }
    (from..log.len()).find(|&index| {
        log.header(index)
            .is_some_and(|header| channels.contains(&header.channel))
    })
}

fn read_entry(log: &dyn Log, index: usize, want_metadata: bool) -> Result<Message> {
    let header = log.header(index).ok_or(LogError::IndexOutOfRange {
        index,
        len: log.len(),
    })?;
    let descriptor = log
        .descriptor(&header.type_name)
        .ok_or_else(|| LogError::UnknownType {
            type_name: header.type_name.clone(),
        })?;

    let payload = log.payload(index)?;
    let instance = materialize(descriptor, payload)?;
    let value = decode(&instance)?;

    let meta = want_metadata.then(|| Metadata {
        channel: header.channel.clone(),
        timestamp: header.time,
        type_name: header.type_name.clone(),
    });
    Ok(Message { value, meta })
}
