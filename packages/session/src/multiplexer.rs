//! The session registry.

use std::collections::BTreeMap;

use baglens_log::{JsonLinesOpener, LogOpener};

use crate::{Result, Session, SessionError};

/// Configuration for a [`Multiplexer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiplexerConfig {
    /// Maximum number of concurrently open sessions.
    pub max_sessions: usize,
}

impl Default for MultiplexerConfig {
    fn default() -> Self {
        Self { max_sessions: 1024 }
    }
}

/// Maps nonzero handles to open sessions.
///
/// Handle 0 is reserved for addressing the multiplexer itself and is never
/// issued. Handles come from a counter; on wraparound the counter skips 0
/// and any handle that is still live.
///
/// # Example
///
/// ```rust
/// use baglens_core::{Time, TypeDescriptor};
/// use baglens_log::{Log, LogError, LogOpener, MemoryLog};
/// use baglens_session::Multiplexer;
///
/// struct Fixture;
///
/// impl LogOpener for Fixture {
///     fn open(&self, _path: &str) -> Result<Box<dyn Log>, LogError> {
///         let mut log = MemoryLog::new();
///         log.define_type(TypeDescriptor::builtin("uint8"))?;
///         log.push("/count", Time::new(1, 0), "uint8", vec![7u8])?;
///         Ok(Box::new(log))
///     }
/// }
///
/// let mut mux = Multiplexer::with_opener(Box::new(Fixture));
/// let handle = mux.construct("fixture").unwrap();
/// mux.session_mut(handle).unwrap().reset_view(["/count"]);
/// assert!(mux.session(handle).unwrap().has_next());
///
/// mux.destruct(handle, true).unwrap();
/// assert!(mux.session(handle).is_err());
/// ```
pub struct Multiplexer {
    config: MultiplexerConfig,
    sessions: BTreeMap<u64, Session>,
    next_handle: u64,
    opener: Box<dyn LogOpener>,
}

impl Multiplexer {
    /// A multiplexer that opens JSON-lines logs.
    pub fn new() -> Self {
        Self::with_opener(Box::new(JsonLinesOpener))
    }

    pub fn with_opener(opener: Box<dyn LogOpener>) -> Self {
        Self::with_config(MultiplexerConfig::default(), opener)
    }

    pub fn with_config(config: MultiplexerConfig, opener: Box<dyn LogOpener>) -> Self {
        Self {
            config,
            sessions: BTreeMap::new(),
            next_handle: 1,
            opener,
        }
    }

    pub fn config(&self) -> &MultiplexerConfig {
        &self.config
    }

    /// Open the log at `path` in a new session and return its handle.
    pub fn construct(&mut self, path: &str) -> Result<u64> {
        if self.sessions.len() >= self.config.max_sessions {
            return Err(SessionError::TooManySessions(self.config.max_sessions));
        }

        let log = self
            .opener
            .open(path)
            .map_err(|source| SessionError::CannotOpenLog {
                path: path.to_string(),
                source,
            })?;

        let handle = self.issue_handle();
        log::debug!("Opened session {} on {} ({} entries)", handle, path, log.len());
        self.sessions.insert(handle, Session::new(log));
        Ok(handle)
    }

    /// Close the session behind `handle`.
    ///
    /// With `check_exists` false an unknown handle is silently ignored.
    pub fn destruct(&mut self, handle: u64, check_exists: bool) -> Result<()> {
        match self.sessions.remove(&handle) {
            Some(_) => {
                log::debug!("Closed session {}", handle);
                Ok(())
            }
            None if check_exists => Err(SessionError::InvalidHandle(handle)),
            None => Ok(()),
        }
    }

    pub fn session(&self, handle: u64) -> Result<&Session> {
        self.sessions
            .get(&handle)
            .ok_or(SessionError::InvalidHandle(handle))
    }

    pub fn session_mut(&mut self, handle: u64) -> Result<&mut Session> {
        self.sessions
            .get_mut(&handle)
            .ok_or(SessionError::InvalidHandle(handle))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Live handles in ascending order.
    pub fn handles(&self) -> impl Iterator<Item = u64> + '_ {
        self.sessions.keys().copied()
    }

    fn issue_handle(&mut self) -> u64 {
        // Terminates because construct caps the session count below u64::MAX.
        loop {
            let candidate = self.next_handle;
            self.next_handle = self.next_handle.wrapping_add(1);
            if candidate != 0 && !self.sessions.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

impl Default for Multiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Multiplexer {
    fn drop(&mut self) {
        if !self.sessions.is_empty() {
            log::debug!(
                "Closing {} session(s) left open: {:?}",
                self.sessions.len(),
                self.sessions.keys().collect::<Vec<_>>()
            );
        }
    }
}

impl std::fmt::Debug for Multiplexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Multiplexer")
            .field("config", &self.config)
            .field("sessions", &self.sessions)
            .field("next_handle", &self.next_handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baglens_core::{Time, TypeDescriptor};
    use baglens_log::{Log, LogError, MemoryLog};

    /// Opens an in-memory log for any path except "missing".
    struct Fixture;

    impl LogOpener for Fixture {
        fn open(&self, path: &str) -> std::result::Result<Box<dyn Log>, LogError> {
            if path == "missing" {
                return Err(LogError::InvalidPath {
                    path: path.to_string(),
                    message: "no such log".to_string(),
                });
            }
            let mut log = MemoryLog::new();
            log.define_type(TypeDescriptor::builtin("bool"))?;
            log.push("/flag", Time::new(1, 0), "bool", vec![1u8])?;
            Ok(Box::new(log))
        }
    }

    fn mux() -> Multiplexer {
        Multiplexer::with_opener(Box::new(Fixture))
    }

    #[test]
    fn handles_increase_from_one() {
        let mut m = mux();
        let a = m.construct("a").unwrap();
        let b = m.construct("b").unwrap();
        let c = m.construct("c").unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(m.handles().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn handles_are_not_reused_after_destruct() {
        let mut m = mux();
        let a = m.construct("a").unwrap();
        m.destruct(a, true).unwrap();
        let b = m.construct("b").unwrap();
        assert!(b > a);
        assert!(matches!(m.session(a), Err(SessionError::InvalidHandle(h)) if h == a));
    }

    #[test]
    fn wraparound_skips_zero_and_live_handles() {
        let mut m = mux();
        let first = m.construct("a").unwrap();
        assert_eq!(first, 1);

        m.next_handle = u64::MAX;
        assert_eq!(m.construct("b").unwrap(), u64::MAX);
        // 0 is reserved and 1 is still live.
        assert_eq!(m.construct("c").unwrap(), 2);
    }

    #[test]
    fn destruct_check_exists() {
        let mut m = mux();
        assert!(m.destruct(42, false).is_ok());
        assert!(matches!(
            m.destruct(42, true),
            Err(SessionError::InvalidHandle(42))
        ));

        let h = m.construct("a").unwrap();
        m.destruct(h, true).unwrap();
        assert!(matches!(
            m.destruct(h, true),
            Err(SessionError::InvalidHandle(_))
        ));
        assert!(m.is_empty());
    }

    #[test]
    fn open_failure_registers_nothing() {
        let mut m = mux();
        let err = m.construct("missing").unwrap_err();
        assert!(matches!(err, SessionError::CannotOpenLog { ref path, .. } if path == "missing"));
        assert!(m.is_empty());
        // The failed open did not burn a handle.
        assert_eq!(m.construct("a").unwrap(), 1);
    }

    #[test]
    fn session_limit() {
        let mut m = Multiplexer::with_config(
            MultiplexerConfig { max_sessions: 2 },
            Box::new(Fixture),
        );
        m.construct("a").unwrap();
        let b = m.construct("b").unwrap();
        assert!(matches!(
            m.construct("c"),
            Err(SessionError::TooManySessions(2))
        ));

        m.destruct(b, true).unwrap();
        assert!(m.construct("c").is_ok());
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn sessions_are_independent() {
        let mut m = mux();
        let a = m.construct("a").unwrap();
        let b = m.construct("b").unwrap();

        m.session_mut(a).unwrap().reset_view(["/flag"]);
        m.session_mut(a).unwrap().read_one(false).unwrap();

        assert!(!m.session(a).unwrap().has_next());
        assert!(!m.session(b).unwrap().has_next());
        m.session_mut(b).unwrap().reset_view(["/flag"]);
        assert!(m.session(b).unwrap().has_next());
    }

    #[test]
    fn default_config() {
        assert_eq!(MultiplexerConfig::default().max_sessions, 1024);
        assert_eq!(mux().config().max_sessions, 1024);
    }
}
